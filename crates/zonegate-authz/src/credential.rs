//! Bearer credential extraction from call metadata.
use crate::{AuthzError, AuthzResult};

/// Metadata key carrying the credential. Header names are case-insensitive.
pub const AUTHORIZATION_HEADER: &str = "authorization";

const BEARER_SCHEME: &str = "bearer";

/// Pull the token out of an `authorization` header value.
///
/// The scheme is matched case-insensitively and surrounding whitespace is
/// ignored.
///
/// # Errors
/// - [`AuthzError::MissingCredential`] when no header value is present.
/// - [`AuthzError::MalformedCredential`] when the value is not `Bearer <token>`.
pub fn parse_bearer(value: Option<&str>) -> AuthzResult<&str> {
    let value = value.ok_or(AuthzError::MissingCredential(AUTHORIZATION_HEADER))?;
    let (scheme, token) = value
        .trim()
        .split_once(char::is_whitespace)
        .ok_or(AuthzError::MalformedCredential)?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AuthzError::MalformedCredential);
    }
    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthzError::MalformedCredential);
    }
    Ok(token)
}
