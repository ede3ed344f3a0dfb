//! RPC method identifiers.
//!
//! # Purpose
//! Wraps the `/<Service>/<Method>` strings that name remote procedures and
//! appear in a token's `permissions` claim.
//!
//! # Key invariants
//! - A method identifier starts with `/` and has exactly two non-empty segments.
//! - Matching against permissions is exact string equality; there are no
//!   wildcards or prefixes.
//!
//! # Examples
//! ```rust
//! use zonegate_authz::MethodId;
//!
//! let method = MethodId::parse("/v1.DomainService/List").unwrap();
//! assert_eq!(method.service(), "v1.DomainService");
//! assert_eq!(method.name(), "List");
//! ```
use crate::{AuthzError, AuthzResult};
use serde::{Deserialize, Serialize};

/// Liveness probe method. It is the only method callable without a token.
pub const LIVENESS_METHOD: &str = "/grpc.health.v1.Health/Check";

/// Validated RPC method identifier.
///
/// # Invariants
/// - The inner string is preserved exactly as parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MethodId(String);

impl MethodId {
    /// Parse and validate a method identifier.
    ///
    /// # Errors
    /// - [`AuthzError::InvalidMethod`] if the value is not `/<Service>/<Method>`.
    pub fn parse(value: &str) -> AuthzResult<Self> {
        let rest = value
            .strip_prefix('/')
            .ok_or_else(|| AuthzError::InvalidMethod(value.to_string()))?;
        let (service, method) = rest
            .split_once('/')
            .ok_or_else(|| AuthzError::InvalidMethod(value.to_string()))?;
        if service.is_empty() || method.is_empty() || method.contains('/') {
            return Err(AuthzError::InvalidMethod(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fully qualified service name, e.g. `v1.DomainService`.
    pub fn service(&self) -> &str {
        self.split().0
    }

    /// Bare method name, e.g. `List`.
    pub fn name(&self) -> &str {
        self.split().1
    }

    fn split(&self) -> (&str, &str) {
        // Validated in `parse`, so both halves exist.
        self.0[1..].split_once('/').unwrap_or(("", ""))
    }
}

impl std::fmt::Display for MethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for MethodId {
    type Err = AuthzError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for MethodId {
    type Error = AuthzError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MethodId> for String {
    fn from(value: MethodId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_service_and_method() {
        let method = MethodId::parse("/v1.RecordService/Create").expect("parse");
        assert_eq!(method.as_str(), "/v1.RecordService/Create");
        assert_eq!(method.service(), "v1.RecordService");
        assert_eq!(method.name(), "Create");
        assert_eq!(method.to_string(), "/v1.RecordService/Create");
    }

    #[test]
    fn parse_rejects_malformed_identifiers() {
        for raw in [
            "",
            "/",
            "v1.DomainService/List",
            "/v1.DomainService",
            "/v1.DomainService/",
            "//List",
            "/v1.DomainService/List/extra",
        ] {
            let err = MethodId::parse(raw).expect_err(raw);
            assert!(matches!(err, AuthzError::InvalidMethod(_)));
        }
    }

    #[test]
    fn liveness_method_is_well_formed() {
        let method: MethodId = LIVENESS_METHOD.parse().expect("liveness");
        assert_eq!(method.service(), "grpc.health.v1.Health");
        assert_eq!(method.name(), "Check");
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let ok: MethodId = serde_json::from_str("\"/v1.TokenService/Create\"").expect("decode");
        assert_eq!(ok.name(), "Create");
        assert!(serde_json::from_str::<MethodId>("\"Create\"").is_err());
    }
}
