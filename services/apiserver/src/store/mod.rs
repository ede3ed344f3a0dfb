//! Resource backend boundary.
//!
//! # Purpose
//! Defines the zone/record operations the API handlers need from a DNS
//! provider. Handlers only talk to [`ZoneBackend`]; authorization happens
//! before any backend call.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod memory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub url: String,
    pub nameservers: Vec<String>,
}

/// Fields a caller may change on an existing zone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZonePatch {
    pub url: Option<String>,
    pub nameservers: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    #[default]
    Any,
    A,
    Aaaa,
    Caa,
    Cname,
    Dname,
    Ds,
    Hinfo,
    Mx,
    Ns,
    Rp,
    Soa,
    Srv,
    Tlsa,
    Txt,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Any => "ANY",
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Caa => "CAA",
            RecordType::Cname => "CNAME",
            RecordType::Dname => "DNAME",
            RecordType::Ds => "DS",
            RecordType::Hinfo => "HINFO",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Rp => "RP",
            RecordType::Soa => "SOA",
            RecordType::Srv => "SRV",
            RecordType::Tlsa => "TLSA",
            RecordType::Txt => "TXT",
        }
    }

    /// `ANY` matches every type.
    pub fn matches(&self, other: RecordType) -> bool {
        *self == RecordType::Any || *self == other
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(value.to_ascii_uppercase()))
            .map_err(|_| StoreError::Invalid(format!("unknown record type: {value}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub data: String,
    pub ttl: u32,
    #[serde(default)]
    pub disabled: bool,
}

/// Criteria for listing records inside one zone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    pub name: Option<String>,
    pub record_type: RecordType,
}

impl RecordQuery {
    pub fn matches(&self, record: &Record) -> bool {
        if record.disabled {
            return false;
        }
        if let Some(name) = &self.name
            && name != &record.name
        {
            return false;
        }
        self.record_type.matches(record.record_type)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid: {0}")]
    Invalid(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ZoneBackend: Send + Sync {
    async fn list_zones(&self) -> StoreResult<Vec<Zone>>;
    async fn get_zone(&self, name: &str) -> StoreResult<Zone>;
    async fn create_zone(&self, name: &str, patch: ZonePatch) -> StoreResult<Zone>;
    async fn update_zone(&self, name: &str, patch: ZonePatch) -> StoreResult<Zone>;
    async fn delete_zone(&self, name: &str) -> StoreResult<()>;

    async fn list_records(&self, zone: &str, query: &RecordQuery) -> StoreResult<Vec<Record>>;
    async fn create_record(&self, zone: &str, record: Record) -> StoreResult<Record>;
    async fn update_record(&self, zone: &str, record: Record) -> StoreResult<Record>;
    async fn delete_record(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
    ) -> StoreResult<Record>;

    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}
