//! Call-scoped verified claims.
//!
//! The call authorizer inserts [`VerifiedClaims`] into request extensions after
//! the policy engine allows a call. Handlers pull them back out with the
//! extractor; a request that never passed the authorizer is rejected.
use crate::api::error::{ApiError, api_unauthenticated};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::ops::Deref;
use std::sync::Arc;
use zonegate_authz::ZoneClaims;

#[derive(Debug, Clone)]
pub struct VerifiedClaims(pub Arc<ZoneClaims>);

impl VerifiedClaims {
    pub fn new(claims: ZoneClaims) -> Self {
        Self(Arc::new(claims))
    }

    pub fn domains(&self) -> &[String] {
        &self.0.domains
    }
}

impl Deref for VerifiedClaims {
    type Target = ZoneClaims;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for VerifiedClaims
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VerifiedClaims>()
            .cloned()
            .ok_or_else(|| api_unauthenticated("no verified claims for this call"))
    }
}
