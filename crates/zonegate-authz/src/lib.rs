//! Token-scoped authorization primitives for the zonegate DNS API.
//!
//! # Purpose
//! Issues signed, self-contained tokens that name a tenant's zones and callable
//! methods, and decides per call whether a presented token admits the call.
//!
//! # How it fits
//! The API server issues tokens through [`TokenIssuer`], gates every call with a
//! shared [`PolicyEngine`], and narrows listings with [`filter_resources`] using
//! the claims an `Allow` decision carried.
//!
//! # Key invariants
//! - Tokens are HS256 only, keyed by one [`SharedSecret`] fixed at startup.
//! - Signatures are verified before any claim is trusted.
//! - Method permissions match by exact string; zone scope matches by exact name.
//!
//! # Examples
//! ```rust
//! use zonegate_authz::{filter_resources, ScopeAction};
//!
//! let allowed = vec!["example.com.".to_string()];
//! assert_eq!(filter_resources(&[], &allowed).unwrap(), allowed);
//! assert_eq!(ScopeAction::Delete.to_string(), "delete");
//! ```
//!
//! # Common pitfalls
//! - Issuer and engine must be built from the same secret, or every call is denied.
//! - Trailing dots are significant: `example.com` and `example.com.` are different zones.

mod claims;
mod credential;
mod errors;
mod method;
mod policy;
mod scope;
mod token;

pub use claims::{Validity, ZoneClaims};
pub use credential::{AUTHORIZATION_HEADER, parse_bearer};
pub use errors::{AuthzError, AuthzResult};
pub use method::{LIVENESS_METHOD, MethodId};
pub use policy::{DenyReason, PolicyDecision, PolicyEngine, PolicyInput, RuleEngine, RuleSet};
pub use scope::{ScopeAction, ensure_resource_allowed, filter_resources, filter_resources_for};
pub use token::{
    DEFAULT_VALIDITY, IssueRequest, SharedSecret, Token, TokenIssuer, TokenVerifier,
    now_epoch_seconds,
};
