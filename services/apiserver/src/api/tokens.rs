//! `v1.TokenService` handlers.
//!
//! Issued tokens never exceed the caller's own zones and methods.
use crate::api::ConnectJson;
use crate::api::error::{ApiError, api_authz_error, api_internal, api_invalid_argument};
use crate::api::types::{TokenServiceCreateRequest, TokenServiceCreateResponse};
use crate::app::AppState;
use crate::auth::VerifiedClaims;
use axum::Json;
use axum::extract::State;
use std::time::Duration;
use zonegate_authz::{AuthzError, IssueRequest};

const MAX_FRACTION_DIGITS: usize = 9;

/// Issue a token for the requested zones and methods.
///
/// # Errors
/// - `unauthenticated` when the request exceeds the caller's own scope.
/// - `invalid_argument` for an empty zone list, a malformed method, or a bad
///   `expires` value.
pub async fn create_token(
    State(state): State<AppState>,
    claims: VerifiedClaims,
    ConnectJson(request): ConnectJson<TokenServiceCreateRequest>,
) -> Result<Json<TokenServiceCreateResponse>, ApiError> {
    let validity = request
        .expires
        .as_deref()
        .map(parse_duration)
        .transpose()?;
    let issue = IssueRequest {
        issuer: request.issuer,
        domains: request.domains,
        permissions: request.permissions,
        validity,
    };
    claims.ensure_can_delegate(&issue).map_err(issue_error)?;
    let token = state.issuer.issue(&issue).map_err(issue_error)?;
    tracing::info!(
        requested_by = %claims.iss,
        issuer = %issue.issuer,
        domains = issue.domains.len(),
        "token issued"
    );
    Ok(Json(TokenServiceCreateResponse {
        token: token.into_string(),
    }))
}

fn issue_error(err: AuthzError) -> ApiError {
    match err {
        rejected @ (AuthzError::EmptyResourceScope
        | AuthzError::InvalidMethod(_)
        | AuthzError::InvalidValidity(_)) => api_invalid_argument(rejected.to_string()),
        denied if denied.is_caller_fault() => api_authz_error(&denied),
        other => api_internal("unable to issue token", &other),
    }
}

/// Parse a protobuf JSON duration such as `"3600s"` or `"60.000s"`.
///
/// # Errors
/// `invalid_argument` for malformed, non-positive, or sub-second values. Token
/// lifetimes are whole seconds, so `"1.5s"` is refused rather than truncated.
pub fn parse_duration(value: &str) -> Result<Duration, ApiError> {
    let invalid = || api_invalid_argument(format!("invalid duration: {value:?}"));
    let body = value.trim().strip_suffix('s').ok_or_else(invalid)?;
    if body.starts_with('-') {
        return Err(api_invalid_argument(format!(
            "duration must be positive, got {value:?}"
        )));
    }
    let (secs, fraction) = body.split_once('.').unwrap_or((body, ""));
    if secs.is_empty() || !secs.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if fraction.len() > MAX_FRACTION_DIGITS || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let secs: u64 = secs.parse().map_err(|_| invalid())?;
    if fraction.bytes().any(|b| b != b'0') {
        return Err(api_invalid_argument(format!(
            "duration must be a whole number of seconds, got {value:?}"
        )));
    }
    if secs == 0 {
        return Err(api_invalid_argument(format!(
            "duration must be positive, got {value:?}"
        )));
    }
    Ok(Duration::from_secs(secs))
}
