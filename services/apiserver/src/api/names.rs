//! Domain name validation and zone derivation.
use crate::api::error::{ApiError, api_invalid_argument};

const MAX_LABEL_BYTES: usize = 63;
const MAX_NAME_BYTES: usize = 253;

/// Check that `name` is a syntactically valid domain name. A trailing dot is
/// allowed; empty labels are not.
pub fn validate_domain_name(name: &str) -> Result<(), ApiError> {
    let bare = name.strip_suffix('.').unwrap_or(name);
    if bare.is_empty() || bare.len() > MAX_NAME_BYTES {
        return Err(api_invalid_argument(format!("{name} is not a domain")));
    }
    if bare
        .split('.')
        .any(|label| label.is_empty() || label.len() > MAX_LABEL_BYTES)
    {
        return Err(api_invalid_argument(format!("{name} is not a domain")));
    }
    Ok(())
}

/// Zone that owns a record, i.e. `fqdn` minus its first label:
/// `www.example.com.` belongs to `example.com.`.
pub fn zone_of(fqdn: &str) -> Result<String, ApiError> {
    validate_domain_name(fqdn)?;
    match fqdn.split_once('.') {
        Some((_, zone)) if !zone.is_empty() => Ok(zone.to_string()),
        _ => Err(api_invalid_argument(format!(
            "{fqdn} must contain at least one dot"
        ))),
    }
}
