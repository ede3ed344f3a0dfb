//! Per-call authorization middleware.
//!
//! # Purpose
//! Gates every RPC before it reaches a handler: pulls the bearer token from
//! the `authorization` header, decodes the JSON request body, asks the shared
//! policy engine for a decision, and either fails the call or forwards it with
//! the verified claims attached.
//!
//! # Key invariants
//! - Credential problems fail the call before the engine runs.
//! - Engine errors are `internal`; denials are `unauthenticated` with the
//!   reason text verbatim.
//! - The call deadline bounds authorization and handling together.
//! - No state is shared between calls except the immutable engine and secret.
use crate::api::error::{
    api_authz_error, api_deadline_exceeded, api_internal, api_invalid_argument,
    api_unauthenticated,
};
use crate::auth::context::VerifiedClaims;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use std::time::Duration;
use zonegate_authz::{
    AUTHORIZATION_HEADER, AuthzError, PolicyDecision, PolicyEngine, PolicyInput, SharedSecret,
    parse_bearer,
};

/// Connect-protocol header carrying the caller's deadline in milliseconds.
pub const CONNECT_TIMEOUT_HEADER: &str = "connect-timeout-ms";

const DECISIONS_METRIC: &str = "zonegate_authz_decisions_total";

#[derive(Clone)]
pub struct CallAuthorizer {
    engine: Arc<dyn PolicyEngine>,
    secret: SharedSecret,
    max_body_bytes: usize,
    default_timeout: Duration,
}

impl CallAuthorizer {
    pub fn new(
        engine: Arc<dyn PolicyEngine>,
        secret: SharedSecret,
        max_body_bytes: usize,
        default_timeout: Duration,
    ) -> Self {
        Self {
            engine,
            secret,
            max_body_bytes,
            default_timeout,
        }
    }

    async fn authorize_and_run(&self, method: String, request: Request, next: Next) -> Response {
        if self.engine.bypasses(&method) {
            record_decision("allow", "bypass");
            return next.run(request).await;
        }

        let token = match bearer_token(request.headers()) {
            Ok(token) => token,
            Err(err) => {
                tracing::debug!(%method, error = %err, "call rejected before policy evaluation");
                record_decision("deny", credential_failure_label(&err));
                return api_authz_error(&err).into_response();
            }
        };

        let (parts, body) = request.into_parts();
        let bytes = match axum::body::to_bytes(body, self.max_body_bytes).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::debug!(%method, error = %err, "unreadable request body");
                return api_invalid_argument("request body is unreadable or too large")
                    .into_response();
            }
        };
        let payload = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            match serde_json::from_slice::<serde_json::Value>(&bytes) {
                Ok(payload) => payload,
                Err(err) => {
                    return api_invalid_argument(format!("request body is not valid JSON: {err}"))
                        .into_response();
                }
            }
        };

        let input = PolicyInput {
            method: &method,
            request: &payload,
            token: &token,
            secret: &self.secret,
        };
        let claims = match self.engine.decide(&input) {
            Ok(PolicyDecision::Allow(claims)) => {
                record_decision("allow", "granted");
                claims
            }
            Ok(PolicyDecision::Deny(reason)) => {
                tracing::info!(%method, reason = %reason, "call denied");
                record_decision("deny", reason.label());
                return api_unauthenticated(reason.to_string()).into_response();
            }
            Err(err) => {
                record_decision("error", "evaluation");
                return api_internal("policy evaluation failed", &err).into_response();
            }
        };

        let mut request = Request::from_parts(parts, Body::from(bytes));
        if let Some(claims) = claims {
            tracing::debug!(%method, issuer = %claims.iss, jti = %claims.jti, "call allowed");
            request.extensions_mut().insert(VerifiedClaims::new(claims));
        }
        next.run(request).await
    }
}

/// Middleware entry point, installed with `axum::middleware::from_fn_with_state`.
pub async fn authorize_call(
    State(authorizer): State<CallAuthorizer>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.uri().path().to_string();
    let budget = call_deadline(request.headers(), authorizer.default_timeout);
    match tokio::time::timeout(budget, authorizer.authorize_and_run(method.clone(), request, next))
        .await
    {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(%method, budget_ms = budget.as_millis() as u64, "call deadline exceeded");
            api_deadline_exceeded(format!("call exceeded its deadline of {budget:?}"))
                .into_response()
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<String, AuthzError> {
    let value = match headers.get(AUTHORIZATION_HEADER) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| AuthzError::MalformedCredential)?,
        ),
        None => None,
    };
    parse_bearer(value).map(str::to_string)
}

fn credential_failure_label(err: &AuthzError) -> &'static str {
    match err {
        AuthzError::MalformedCredential => "malformed_credential",
        _ => "missing_credential",
    }
}

fn call_deadline(headers: &HeaderMap, default: Duration) -> Duration {
    headers
        .get(CONNECT_TIMEOUT_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

fn record_decision(outcome: &'static str, reason: &'static str) {
    metrics::counter!(DECISIONS_METRIC, "outcome" => outcome, "reason" => reason).increment(1);
}
