//! Token issuance and integrity verification.
//!
//! # Purpose
//! Encodes [`ZoneClaims`] as a compact HS256 JWT bound to a shared secret,
//! and verifies that binding before any claim is read back.
//!
//! # Key invariants
//! - Only HS256 is accepted; any other `alg` fails as an invalid signature.
//! - Every issued token carries a fresh `jti` and `iat == nbf`.
//! - [`TokenVerifier::verify`] checks integrity and claim shape only. The
//!   validity window and method permissions are the policy engine's job.
//!
//! # Examples
//! ```rust
//! use zonegate_authz::{IssueRequest, SharedSecret, TokenIssuer, TokenVerifier};
//!
//! let secret = SharedSecret::new("change-me").unwrap();
//! let issuer = TokenIssuer::new("zonegate", secret.clone());
//! let token = issuer
//!     .issue(&IssueRequest::new(
//!         "tenant-a",
//!         vec!["example.com.".to_string()],
//!         vec!["/v1.DomainService/List".to_string()],
//!     ))
//!     .unwrap();
//! let claims = TokenVerifier::new(secret).verify(token.as_str()).unwrap();
//! assert_eq!(claims.iss, "tenant-a");
//! ```
use crate::{AuthzError, AuthzResult, MethodId, ZoneClaims};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default lifetime of an issued token.
pub const DEFAULT_VALIDITY: Duration = Duration::from_secs(365 * 24 * 60 * 60);

const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// HMAC key shared by the issuer and every verifier.
///
/// Cloning is cheap. `Debug` never prints key material.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(Arc<[u8]>);

impl SharedSecret {
    /// # Errors
    /// - [`AuthzError::EmptySecret`] for zero-length key material.
    pub fn new(secret: impl AsRef<[u8]>) -> AuthzResult<Self> {
        let bytes = secret.as_ref();
        if bytes.is_empty() {
            return Err(AuthzError::EmptySecret);
        }
        Ok(Self(Arc::from(bytes)))
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.0)
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.0)
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedSecret").field(&"<redacted>").finish()
    }
}

/// Signed compact token. Opaque to holders.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&"<redacted>").finish()
    }
}

/// What a caller asks to be encoded in a new token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    pub issuer: String,
    pub domains: Vec<String>,
    pub permissions: Vec<String>,
    /// `None` uses the issuer's default validity.
    pub validity: Option<Duration>,
}

impl IssueRequest {
    pub fn new(issuer: impl Into<String>, domains: Vec<String>, permissions: Vec<String>) -> Self {
        Self {
            issuer: issuer.into(),
            domains,
            permissions,
            validity: None,
        }
    }

    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = Some(validity);
        self
    }
}

/// Signs [`ZoneClaims`] for callers of the token service.
///
/// Every token carries the same `sub` (the deployment identity) and a fresh
/// `jti`. Requests are validated before anything is signed.
pub struct TokenIssuer {
    subject: String,
    default_validity: Duration,
    secret: SharedSecret,
}

impl TokenIssuer {
    pub fn new(subject: impl Into<String>, secret: SharedSecret) -> Self {
        Self {
            subject: subject.into(),
            default_validity: DEFAULT_VALIDITY,
            secret,
        }
    }

    /// Lifetime used when a request carries no validity of its own.
    pub fn with_default_validity(mut self, validity: Duration) -> Self {
        self.default_validity = validity;
        self
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Issue a token valid from now.
    ///
    /// # Errors
    /// Same as [`TokenIssuer::issue_at`].
    pub fn issue(&self, request: &IssueRequest) -> AuthzResult<Token> {
        self.issue_at(request, now_epoch_seconds())
    }

    /// Issue a token as if the current time were `now` (seconds since epoch).
    ///
    /// # Errors
    /// - [`AuthzError::EmptyResourceScope`] when no domain is named.
    /// - [`AuthzError::InvalidMethod`] when a permission is not `/<Service>/<Method>`.
    /// - [`AuthzError::InvalidValidity`] for a zero, fractional, or overflowing
    ///   window.
    /// - [`AuthzError::Signing`] when encoding fails.
    pub fn issue_at(&self, request: &IssueRequest, now: i64) -> AuthzResult<Token> {
        if request.domains.is_empty() {
            return Err(AuthzError::EmptyResourceScope);
        }
        for permission in &request.permissions {
            MethodId::parse(permission)?;
        }
        let validity = request.validity.unwrap_or(self.default_validity);
        let exp = expiry(now, validity)?;

        let claims = ZoneClaims {
            sub: self.subject.clone(),
            iss: request.issuer.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now,
            nbf: now,
            exp,
            domains: request.domains.clone(),
            permissions: request.permissions.clone(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(TOKEN_ALGORITHM),
            &claims,
            &self.secret.encoding_key(),
        )
        .map_err(AuthzError::Signing)?;
        tracing::debug!(issuer = %claims.iss, jti = %claims.jti, exp, "issued token");
        Ok(Token(token))
    }
}

fn expiry(now: i64, validity: Duration) -> AuthzResult<i64> {
    let secs = validity.as_secs();
    if secs == 0 {
        return Err(AuthzError::InvalidValidity(format!(
            "validity must be at least one second, got {validity:?}"
        )));
    }
    // Claims carry whole seconds; a partial second would be dropped silently.
    if validity.subsec_nanos() != 0 {
        return Err(AuthzError::InvalidValidity(format!(
            "validity must be a whole number of seconds, got {validity:?}"
        )));
    }
    i64::try_from(secs)
        .ok()
        .and_then(|secs| now.checked_add(secs))
        .ok_or_else(|| AuthzError::InvalidValidity(format!("validity {validity:?} overflows")))
}

/// Checks token integrity against the shared secret.
///
/// Time and permission checks are left to the policy engine, so a verified
/// token may still be expired or lack the method being called.
pub struct TokenVerifier {
    secret: SharedSecret,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: SharedSecret) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        // Time checks belong to the policy engine so it can name the reason.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "nbf", "iat", "sub"]);
        Self { secret, validation }
    }

    pub fn secret(&self) -> &SharedSecret {
        &self.secret
    }

    /// Verify the signature, then decode the claims.
    ///
    /// # Errors
    /// - [`AuthzError::SignatureInvalid`] for a bad tag, foreign algorithm, or
    ///   unparseable token.
    /// - [`AuthzError::MalformedClaims`] when a signed payload has the wrong shape.
    pub fn verify(&self, token: &str) -> AuthzResult<ZoneClaims> {
        jsonwebtoken::decode_header(token).map_err(|_| AuthzError::SignatureInvalid)?;
        let data = jsonwebtoken::decode::<ZoneClaims>(
            token,
            &self.secret.decoding_key(),
            &self.validation,
        )
        .map_err(classify)?;
        Ok(data.claims)
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> AuthzError {
    match err.kind() {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidToken
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::MissingAlgorithm
        | ErrorKind::Base64(_)
        | ErrorKind::Utf8(_) => AuthzError::SignatureInvalid,
        ErrorKind::Json(inner) => AuthzError::MalformedClaims(inner.to_string()),
        ErrorKind::MissingRequiredClaim(claim) => {
            AuthzError::MalformedClaims(format!("missing claim: {claim}"))
        }
        _ => AuthzError::Jwt(err),
    }
}

/// Current time in whole seconds since the Unix epoch.
pub fn now_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs() as i64
}
