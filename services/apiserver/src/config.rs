//! API server configuration.
//!
//! Values come from `ZONEGATE_*` environment variables, optionally overridden
//! by a YAML file passed with `--config` (or `ZONEGATE_CONFIG`) on the binary.
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BIND: &str = "0.0.0.0:50051";
pub const DEFAULT_METRICS_BIND: &str = "0.0.0.0:9090";
pub const DEFAULT_TOKEN_SUBJECT: &str = "zonegate";
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct ApiServerConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    /// HMAC secret shared by the token issuer and the policy engine.
    pub secret: String,
    pub token_subject: String,
    pub token_leeway_secs: u64,
    pub call_timeout: Duration,
    pub max_body_bytes: usize,
    pub seed_zones: Vec<String>,
}

impl std::fmt::Debug for ApiServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("metrics_bind", &self.metrics_bind)
            .field("secret", &"<redacted>")
            .field("token_subject", &self.token_subject)
            .field("token_leeway_secs", &self.token_leeway_secs)
            .field("call_timeout", &self.call_timeout)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("seed_zones", &self.seed_zones)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ApiServerConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    secret: Option<String>,
    token_subject: Option<String>,
    token_leeway_secs: Option<u64>,
    call_timeout_ms: Option<u64>,
    max_body_bytes: Option<usize>,
    seed_zones: Option<Vec<String>>,
}

impl ApiServerConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self::load_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Environment first, then the YAML file at `path`.
    pub fn from_env_and_file(path: &Path) -> Result<Self> {
        let mut config = Self::load_env()?;
        config.apply_yaml_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn load_env() -> Result<Self> {
        let bind_addr = env_or("ZONEGATE_BIND", DEFAULT_BIND)
            .parse()
            .with_context(|| "parse ZONEGATE_BIND")?;
        let metrics_bind = env_or("ZONEGATE_METRICS_BIND", DEFAULT_METRICS_BIND)
            .parse()
            .with_context(|| "parse ZONEGATE_METRICS_BIND")?;
        let secret = std::env::var("ZONEGATE_SECRET").unwrap_or_default();
        let token_subject = env_or("ZONEGATE_TOKEN_SUBJECT", DEFAULT_TOKEN_SUBJECT);
        let token_leeway_secs = env_or("ZONEGATE_TOKEN_LEEWAY_SECS", "0")
            .parse()
            .with_context(|| "parse ZONEGATE_TOKEN_LEEWAY_SECS")?;
        let call_timeout_ms: u64 = env_or(
            "ZONEGATE_CALL_TIMEOUT_MS",
            &DEFAULT_CALL_TIMEOUT_MS.to_string(),
        )
        .parse()
        .with_context(|| "parse ZONEGATE_CALL_TIMEOUT_MS")?;
        let max_body_bytes = env_or(
            "ZONEGATE_MAX_BODY_BYTES",
            &DEFAULT_MAX_BODY_BYTES.to_string(),
        )
        .parse()
        .with_context(|| "parse ZONEGATE_MAX_BODY_BYTES")?;
        let seed_zones = std::env::var("ZONEGATE_SEED_ZONES")
            .map(|value| parse_list(&value))
            .unwrap_or_default();
        Ok(Self {
            bind_addr,
            metrics_bind,
            secret,
            token_subject,
            token_leeway_secs,
            call_timeout: Duration::from_millis(call_timeout_ms),
            max_body_bytes,
            seed_zones,
        })
    }

    fn apply_yaml_file(&mut self, path: &Path) -> Result<()> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read config file: {}", path.display()))?;
        let override_cfg: ApiServerConfigOverride =
            serde_yaml::from_str(&contents).with_context(|| "parse api server config yaml")?;
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        if let Some(value) = override_cfg.secret {
            self.secret = value;
        }
        if let Some(value) = override_cfg.token_subject {
            self.token_subject = value;
        }
        if let Some(value) = override_cfg.token_leeway_secs {
            self.token_leeway_secs = value;
        }
        if let Some(value) = override_cfg.call_timeout_ms {
            self.call_timeout = Duration::from_millis(value);
        }
        if let Some(value) = override_cfg.max_body_bytes {
            self.max_body_bytes = value;
        }
        if let Some(value) = override_cfg.seed_zones {
            self.seed_zones = value;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.secret.is_empty() {
            bail!("ZONEGATE_SECRET must be set to a non-empty value");
        }
        if self.token_subject.is_empty() {
            bail!("token subject must not be empty");
        }
        if self.call_timeout.is_zero() {
            bail!("call timeout must be positive");
        }
        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
