//! `v1.RecordService` handlers.
//!
//! The zone a record belongs to is derived from its name, and that zone must
//! be in the caller's scope.
use crate::api::ConnectJson;
use crate::api::error::{ApiError, api_invalid_argument};
use crate::api::names::zone_of;
use crate::api::types::{
    RecordCreateRequest, RecordDeleteRequest, RecordResponse, RecordUpdateRequest,
    RecordsListRequest, RecordsResponse,
};
use crate::app::AppState;
use crate::auth::VerifiedClaims;
use crate::store::{RecordQuery, RecordType};
use axum::Json;
use axum::extract::State;
use zonegate_authz::{ScopeAction, ensure_resource_allowed};

pub async fn list_records(
    State(state): State<AppState>,
    claims: VerifiedClaims,
    ConnectJson(request): ConnectJson<RecordsListRequest>,
) -> Result<Json<RecordsResponse>, ApiError> {
    ensure_resource_allowed(ScopeAction::List, &request.domain, claims.domains())?;
    let query = RecordQuery {
        name: request.name,
        record_type: request.record_type,
    };
    let records = state
        .backend
        .list_records(&request.domain, &query)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(RecordsResponse { records }))
}

pub async fn create_record(
    State(state): State<AppState>,
    claims: VerifiedClaims,
    ConnectJson(request): ConnectJson<RecordCreateRequest>,
) -> Result<Json<RecordResponse>, ApiError> {
    let zone = authorize_record(ScopeAction::Create, &request.name, request.record_type, &claims)?;
    tracing::info!(%zone, name = %request.name, record_type = %request.record_type, "create record");
    let record = state.backend.create_record(&zone, request.into()).await?;
    Ok(Json(RecordResponse {
        record: record.into(),
    }))
}

pub async fn update_record(
    State(state): State<AppState>,
    claims: VerifiedClaims,
    ConnectJson(request): ConnectJson<RecordUpdateRequest>,
) -> Result<Json<RecordResponse>, ApiError> {
    let zone = authorize_record(ScopeAction::Update, &request.name, request.record_type, &claims)?;
    let record = state.backend.update_record(&zone, request.into()).await?;
    Ok(Json(RecordResponse {
        record: record.into(),
    }))
}

pub async fn delete_record(
    State(state): State<AppState>,
    claims: VerifiedClaims,
    ConnectJson(request): ConnectJson<RecordDeleteRequest>,
) -> Result<Json<RecordResponse>, ApiError> {
    let zone = authorize_record(ScopeAction::Delete, &request.name, request.record_type, &claims)?;
    let record = state
        .backend
        .delete_record(&zone, &request.name, request.record_type)
        .await?;
    Ok(Json(RecordResponse {
        record: record.into(),
    }))
}

fn authorize_record(
    action: ScopeAction,
    name: &str,
    record_type: RecordType,
    claims: &VerifiedClaims,
) -> Result<String, ApiError> {
    let zone = zone_of(name)?;
    ensure_resource_allowed(action, &zone, claims.domains())?;
    if record_type == RecordType::Any {
        return Err(api_invalid_argument(format!(
            "record type ANY is not allowed to {action}"
        )));
    }
    Ok(zone)
}
