use crate::ScopeAction;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("shared secret must not be empty")]
    EmptySecret,
    #[error("invalid method identifier: {0}")]
    InvalidMethod(String),
    #[error("invalid validity: {0}")]
    InvalidValidity(String),
    #[error("token must name at least one resource")]
    EmptyResourceScope,
    #[error("no header:{0} found")]
    MissingCredential(&'static str),
    #[error("no bearer token found")]
    MalformedCredential,
    #[error("token signature is invalid")]
    SignatureInvalid,
    #[error("token claims are malformed: {0}")]
    MalformedClaims(String),
    #[error("unable to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("policy evaluation failed: {0}")]
    Evaluation(String),
    #[error("no resources allowed")]
    NoResourcesAllowed,
    #[error("resource:{resource} is not allowed to {action}, only [{}]", .allowed.join(" "))]
    ScopeViolation {
        resource: String,
        action: ScopeAction,
        allowed: Vec<String>,
    },
    #[error("not allowed to grant: {0}")]
    PermissionNotHeld(String),
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl AuthzError {
    /// Whether the error describes the caller's credentials or scope rather
    /// than a fault on the server side.
    pub fn is_caller_fault(&self) -> bool {
        matches!(
            self,
            AuthzError::MissingCredential(_)
                | AuthzError::MalformedCredential
                | AuthzError::SignatureInvalid
                | AuthzError::MalformedClaims(_)
                | AuthzError::NoResourcesAllowed
                | AuthzError::ScopeViolation { .. }
                | AuthzError::PermissionNotHeld(_)
        )
    }
}

pub type AuthzResult<T> = Result<T, AuthzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_variants() {
        let errors = vec![
            AuthzError::EmptySecret,
            AuthzError::InvalidMethod("bad".to_string()),
            AuthzError::InvalidValidity("zero".to_string()),
            AuthzError::EmptyResourceScope,
            AuthzError::MissingCredential("authorization"),
            AuthzError::MalformedCredential,
            AuthzError::SignatureInvalid,
            AuthzError::MalformedClaims("exp".to_string()),
            AuthzError::Evaluation("boom".to_string()),
            AuthzError::NoResourcesAllowed,
            AuthzError::PermissionNotHeld("/v1.DomainService/Delete".to_string()),
        ];

        for error in errors {
            let rendered = error.to_string();
            assert!(!rendered.is_empty());
        }
    }

    #[test]
    fn scope_violation_lists_allowed_in_order() {
        let err = AuthzError::ScopeViolation {
            resource: "sample.com.".to_string(),
            action: ScopeAction::List,
            allowed: vec!["example.com.".to_string(), "foo.bar.".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "resource:sample.com. is not allowed to list, only [example.com. foo.bar.]"
        );
        assert!(err.is_caller_fault());
    }

    #[test]
    fn server_faults_are_not_caller_faults() {
        assert!(!AuthzError::Evaluation("misconfigured".to_string()).is_caller_fault());
        assert!(!AuthzError::EmptySecret.is_caller_fault());
        assert!(AuthzError::MissingCredential("authorization").is_caller_fault());
    }
}
