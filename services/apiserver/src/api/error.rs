//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Builds Connect-protocol error responses: a JSON body `{"code", "message"}`
//! with the HTTP status the protocol assigns to that code.
//!
//! # Key invariants and assumptions
//! - `code` is one of the Connect error code names.
//! - Authorization failures carry their reason verbatim.
//!
//! # Security considerations
//! - Internal errors log details server-side and return a generic message.
use crate::api::types::ErrorResponse;
use crate::store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use zonegate_authz::AuthzError;

/// Structured API error returned by handlers and the call authorizer.
///
/// # Invariants
/// - `status` must match the semantics of `body.code`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Build a 401 Unauthenticated error.
///
/// # What it does
/// Returns an `ApiError` with code `unauthenticated` and the provided message.
///
/// # Errors
/// - Does not fail.
pub fn api_unauthenticated(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::UNAUTHORIZED, "unauthenticated", message)
}

/// Build a 400 Invalid Argument error.
///
/// # What it does
/// Returns an `ApiError` with code `invalid_argument` and the provided message.
///
/// # Errors
/// - Does not fail.
pub fn api_invalid_argument(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "invalid_argument", message)
}

/// Build a 404 Not Found error.
///
/// # What it does
/// Returns an `ApiError` with code `not_found` and the provided message.
///
/// # Errors
/// - Does not fail.
pub fn api_not_found(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "not_found", message)
}

/// Build a 409 Conflict error.
///
/// # What it does
/// Returns an `ApiError` with code `already_exists` and the provided message.
///
/// # Errors
/// - Does not fail.
pub fn api_already_exists(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::CONFLICT, "already_exists", message)
}

/// Build a 504 Deadline Exceeded error.
///
/// # What it does
/// Returns an `ApiError` with code `deadline_exceeded` for calls that ran out of time.
///
/// # Errors
/// - Does not fail.
pub fn api_deadline_exceeded(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::GATEWAY_TIMEOUT, "deadline_exceeded", message)
}

/// Build a 500 Internal Server Error from a source error.
///
/// # What it does
/// Logs `err` server-side and returns a generic internal error response.
///
/// # Errors
/// - Does not fail.
pub fn api_internal(message: &str, err: &dyn std::error::Error) -> ApiError {
    tracing::error!(error = %err, "{message}");
    api_internal_message(message)
}

/// Build a 500 Internal Server Error without a source error.
///
/// # What it does
/// Returns a generic internal error response with the provided message.
///
/// # Errors
/// - Does not fail.
pub fn api_internal_message(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

/// Map a backend failure onto the matching Connect code.
pub fn api_store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound(what) => api_not_found(format!("{what} not found")),
        StoreError::Conflict(what) => api_already_exists(format!("{what} already exists")),
        StoreError::Invalid(message) => api_invalid_argument(message),
        other @ StoreError::Unexpected(_) => api_internal("backend request failed", &other),
    }
}

/// Map an authorization failure. Caller faults become `unauthenticated` with
/// the reason text; anything else is `internal`.
pub fn api_authz_error(err: &AuthzError) -> ApiError {
    if err.is_caller_fault() {
        api_unauthenticated(err.to_string())
    } else {
        api_internal("authorization failed", err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        api_store_error(err)
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        api_authz_error(&err)
    }
}
