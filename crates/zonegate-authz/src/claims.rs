//! Claims carried by a zonegate token.
//!
//! # Key invariants
//! - `nbf <= iat < exp` for every token this crate issues.
//! - `domains` is non-empty at issuance; an empty list read back from a token
//!   means the holder can see nothing.
//! - `permissions` holds exact method identifiers; absence denies the method.
//! - A holder can only hand on scope it already has (see
//!   [`ZoneClaims::ensure_can_delegate`]).
use crate::{AuthzError, AuthzResult, IssueRequest, MethodId, ScopeAction, filter_resources_for};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneClaims {
    /// Deployment identity, constant per issuer.
    pub sub: String,
    /// Name of whoever requested the token.
    pub iss: String,
    /// Unique token id.
    pub jti: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Where `now` falls relative to a claims validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    NotYetValid,
    Valid,
    Expired,
}

impl ZoneClaims {
    pub fn allows_method(&self, method: &str) -> bool {
        self.permissions.iter().any(|allowed| allowed == method)
    }

    /// Check that `request` asks for no zone or method beyond what these
    /// claims already grant.
    ///
    /// An empty `request.domains` passes here; issuance rejects it on its own.
    ///
    /// # Errors
    /// - [`AuthzError::InvalidMethod`] when a requested permission is not
    ///   `/<Service>/<Method>`.
    /// - [`AuthzError::NoResourcesAllowed`] when these claims name no zone.
    /// - [`AuthzError::ScopeViolation`] for the first zone outside `domains`.
    /// - [`AuthzError::PermissionNotHeld`] for the first method outside
    ///   `permissions`.
    pub fn ensure_can_delegate(&self, request: &IssueRequest) -> AuthzResult<()> {
        for permission in &request.permissions {
            MethodId::parse(permission)?;
        }
        filter_resources_for(ScopeAction::Create, &request.domains, &self.domains)?;
        if let Some(method) = request
            .permissions
            .iter()
            .find(|method| !self.allows_method(method))
        {
            return Err(AuthzError::PermissionNotHeld(method.clone()));
        }
        Ok(())
    }

    /// Evaluate the half-open window `[nbf, exp)`, widened by `leeway` seconds
    /// on both ends.
    pub fn validity_at(&self, now: i64, leeway: u64) -> Validity {
        let leeway = i64::try_from(leeway).unwrap_or(i64::MAX);
        if now.saturating_add(leeway) < self.nbf {
            Validity::NotYetValid
        } else if now.saturating_sub(leeway) >= self.exp {
            Validity::Expired
        } else {
            Validity::Valid
        }
    }
}
