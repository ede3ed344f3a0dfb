//! Resource-scope filtering.
//!
//! # Purpose
//! Intersects the zone names a caller asks for with the zone names its token
//! allows, producing the effective visible set.
//!
//! # Key invariants
//! - An empty allowed set rejects every request.
//! - An empty requested set widens to the full allowed set.
//! - A rejection names the first offending requested name and lists the
//!   allowed names in token order.
use crate::{AuthzError, AuthzResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Verb a scope check is performed for. Only affects the rejection message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeAction {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl ScopeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeAction::List => "list",
            ScopeAction::Get => "get",
            ScopeAction::Create => "create",
            ScopeAction::Update => "update",
            ScopeAction::Delete => "delete",
        }
    }
}

impl fmt::Display for ScopeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter `requested` zone names against `allowed` for a listing call.
///
/// # Errors
/// - [`AuthzError::NoResourcesAllowed`] when `allowed` is empty.
/// - [`AuthzError::ScopeViolation`] when a requested name is not allowed.
pub fn filter_resources(requested: &[String], allowed: &[String]) -> AuthzResult<Vec<String>> {
    filter_resources_for(ScopeAction::List, requested, allowed)
}

/// Same as [`filter_resources`], naming `action` in the rejection.
pub fn filter_resources_for(
    action: ScopeAction,
    requested: &[String],
    allowed: &[String],
) -> AuthzResult<Vec<String>> {
    if allowed.is_empty() {
        return Err(AuthzError::NoResourcesAllowed);
    }
    if requested.is_empty() {
        return Ok(dedupe(allowed));
    }
    if let Some(offender) = requested.iter().find(|name| !allowed.contains(name)) {
        return Err(AuthzError::ScopeViolation {
            resource: offender.clone(),
            action,
            allowed: allowed.to_vec(),
        });
    }
    Ok(dedupe(requested))
}

/// Check a single resource name against the allowed set.
pub fn ensure_resource_allowed(
    action: ScopeAction,
    resource: &str,
    allowed: &[String],
) -> AuthzResult<()> {
    filter_resources_for(action, &[resource.to_string()], allowed).map(|_| ())
}

// Preserves first-seen order.
fn dedupe(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !out.contains(name) {
            out.push(name.clone());
        }
    }
    out
}
