//! Policy decision point for RPC calls.
//!
//! # Purpose
//! Decides whether a single call may proceed, given the method being called,
//! its decoded request payload, the presented token, and the verification
//! secret.
//!
//! # How it fits
//! The call authorizer builds a [`PolicyInput`] per request and asks a shared
//! [`PolicyEngine`] for a [`PolicyDecision`]. Handlers only ever see claims
//! that came out of an `Allow` decision.
//!
//! # Key invariants
//! - Checks run in a fixed order: bypass, presence, integrity, validity window,
//!   permission. The first failing check names the denial.
//! - Claims are never read before the signature has been verified.
//! - Engines are immutable after construction and safe to share across tasks.
use crate::claims::Validity;
use crate::token::now_epoch_seconds;
use crate::{AuthzError, AuthzResult, LIVENESS_METHOD, SharedSecret, TokenVerifier, ZoneClaims};
use thiserror::Error;

/// Everything the engine needs to decide one call.
#[derive(Debug, Clone, Copy)]
pub struct PolicyInput<'a> {
    pub method: &'a str,
    /// Decoded JSON request body. `Null` when the call carried no body.
    pub request: &'a serde_json::Value,
    /// Presented token, empty when none was presented.
    pub token: &'a str,
    pub secret: &'a SharedSecret,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    /// The call may proceed. Carries the verified claims unless the method
    /// bypasses authorization.
    Allow(Option<ZoneClaims>),
    Deny(DenyReason),
}

impl PolicyDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PolicyDecision::Allow(_))
    }

    pub fn reason(&self) -> Option<&DenyReason> {
        match self {
            PolicyDecision::Deny(reason) => Some(reason),
            PolicyDecision::Allow(_) => None,
        }
    }

    pub fn claims(&self) -> Option<&ZoneClaims> {
        match self {
            PolicyDecision::Allow(claims) => claims.as_ref(),
            PolicyDecision::Deny(_) => None,
        }
    }
}

/// Why a call was denied. The display text is returned to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenyReason {
    #[error("no credential presented")]
    MissingCredential,
    #[error("token signature is invalid")]
    SignatureInvalid,
    #[error("token claims are malformed: {0}")]
    MalformedClaims(String),
    #[error("token has expired")]
    TokenExpired,
    #[error("token is not yet valid")]
    TokenNotYetValid,
    #[error("not allowed to call: {0}")]
    PermissionDenied(String),
}

impl DenyReason {
    /// Short stable label, used as a metrics dimension.
    pub fn label(&self) -> &'static str {
        match self {
            DenyReason::MissingCredential => "missing_credential",
            DenyReason::SignatureInvalid => "signature_invalid",
            DenyReason::MalformedClaims(_) => "malformed_claims",
            DenyReason::TokenExpired => "token_expired",
            DenyReason::TokenNotYetValid => "token_not_yet_valid",
            DenyReason::PermissionDenied(_) => "permission_denied",
        }
    }
}

/// Decision point shared by every call.
///
/// Implementations are immutable after construction and are used through an
/// `Arc<dyn PolicyEngine>` from concurrent requests.
pub trait PolicyEngine: Send + Sync {
    /// Render a decision for one call.
    ///
    /// # Errors
    /// Returns an error only when the engine itself cannot evaluate the input;
    /// a rejected caller is an `Ok(PolicyDecision::Deny(..))`.
    fn decide(&self, input: &PolicyInput<'_>) -> AuthzResult<PolicyDecision>;

    /// Whether `method` skips credential checks entirely.
    fn bypasses(&self, method: &str) -> bool;
}

/// Static rules an engine is compiled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    pub bypass_methods: Vec<String>,
    /// Clock skew tolerated on both ends of the validity window, in seconds.
    pub leeway_secs: u64,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            bypass_methods: vec![LIVENESS_METHOD.to_string()],
            leeway_secs: 0,
        }
    }
}

/// Ordered-check engine bound to one secret.
pub struct RuleEngine {
    rules: RuleSet,
    verifier: TokenVerifier,
}

impl RuleEngine {
    pub fn new(rules: RuleSet, secret: SharedSecret) -> Self {
        Self {
            rules,
            verifier: TokenVerifier::new(secret),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Decide as if the current time were `now` (seconds since epoch).
    pub fn decide_at(&self, input: &PolicyInput<'_>, now: i64) -> AuthzResult<PolicyDecision> {
        if self.bypasses(input.method) {
            return Ok(PolicyDecision::Allow(None));
        }
        if input.token.is_empty() {
            return Ok(PolicyDecision::Deny(DenyReason::MissingCredential));
        }
        if input.secret != self.verifier.secret() {
            return Err(AuthzError::Evaluation(
                "verification secret does not match the engine".to_string(),
            ));
        }

        let claims = match self.verifier.verify(input.token) {
            Ok(claims) => claims,
            Err(AuthzError::SignatureInvalid) => {
                return Ok(PolicyDecision::Deny(DenyReason::SignatureInvalid));
            }
            Err(AuthzError::MalformedClaims(detail)) => {
                return Ok(PolicyDecision::Deny(DenyReason::MalformedClaims(detail)));
            }
            Err(err) => return Err(AuthzError::Evaluation(err.to_string())),
        };

        match claims.validity_at(now, self.rules.leeway_secs) {
            Validity::NotYetValid => return Ok(PolicyDecision::Deny(DenyReason::TokenNotYetValid)),
            Validity::Expired => return Ok(PolicyDecision::Deny(DenyReason::TokenExpired)),
            Validity::Valid => {}
        }

        if !claims.allows_method(input.method) {
            return Ok(PolicyDecision::Deny(DenyReason::PermissionDenied(
                input.method.to_string(),
            )));
        }
        Ok(PolicyDecision::Allow(Some(claims)))
    }
}

impl PolicyEngine for RuleEngine {
    fn decide(&self, input: &PolicyInput<'_>) -> AuthzResult<PolicyDecision> {
        self.decide_at(input, now_epoch_seconds())
    }

    fn bypasses(&self, method: &str) -> bool {
        self.rules.bypass_methods.iter().any(|bypass| bypass == method)
    }
}
