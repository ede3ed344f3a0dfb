//! Authorization wiring for the API server.
//!
//! `authorizer` gates calls; `context` hands verified claims to handlers.
pub mod authorizer;
pub mod context;

pub use authorizer::{CONNECT_TIMEOUT_HEADER, CallAuthorizer, authorize_call};
pub use context::VerifiedClaims;
