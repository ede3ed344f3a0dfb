//! `grpc.health.v1.Health` handler. Callable without a token.
use crate::api::ConnectJson;
use crate::api::types::{HealthCheckRequest, HealthCheckResponse, ServingStatus};
use crate::app::AppState;
use axum::Json;
use axum::extract::State;

pub async fn check(
    State(state): State<AppState>,
    ConnectJson(_request): ConnectJson<HealthCheckRequest>,
) -> Json<HealthCheckResponse> {
    let status = match state.backend.health_check().await {
        Ok(()) => ServingStatus::Serving,
        Err(err) => {
            tracing::warn!(
                backend = state.backend.backend_name(),
                error = %err,
                "backend health probe failed"
            );
            ServingStatus::NotServing
        }
    };
    Json(HealthCheckResponse { status })
}
