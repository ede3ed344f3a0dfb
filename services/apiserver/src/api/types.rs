//! Request/response payloads for the Connect JSON API.
//!
//! # Purpose
//! Mirrors the protobuf messages of the `v1` services in their canonical JSON
//! form: camelCase fields, missing fields take their zero value.
use crate::store::{self, RecordType, Zone};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Domain {
    pub id: String,
    pub name: String,
    pub url: String,
    pub nameservers: Vec<String>,
}

impl From<Zone> for Domain {
    fn from(zone: Zone) -> Self {
        Self {
            id: zone.id,
            name: zone.name,
            url: zone.url,
            nameservers: zone.nameservers,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomainsListRequest {
    pub domains: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomainsResponse {
    pub domains: Vec<Domain>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomainGetRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomainCreateRequest {
    pub name: String,
    pub url: Option<String>,
    pub nameservers: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomainUpdateRequest {
    pub name: String,
    pub url: Option<String>,
    pub nameservers: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomainDeleteRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomainResponse {
    pub domain: Domain,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Record {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub data: String,
    pub ttl: u32,
}

impl From<store::Record> for Record {
    fn from(record: store::Record) -> Self {
        Self {
            name: record.name,
            record_type: record.record_type,
            data: record.data,
            ttl: record.ttl,
        }
    }
}

impl From<Record> for store::Record {
    fn from(record: Record) -> Self {
        Self {
            name: record.name,
            record_type: record.record_type,
            data: record.data,
            ttl: record.ttl,
            disabled: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecordsListRequest {
    pub domain: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub record_type: RecordType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecordsResponse {
    pub records: Vec<Record>,
}

/// Shared shape of record create, update and delete calls.
pub type RecordCreateRequest = Record;
pub type RecordUpdateRequest = Record;
pub type RecordDeleteRequest = Record;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecordResponse {
    pub record: Record,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenServiceCreateRequest {
    pub issuer: String,
    pub domains: Vec<String>,
    pub permissions: Vec<String>,
    /// Protobuf JSON duration, e.g. `"3600s"`.
    pub expires: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenServiceCreateResponse {
    pub token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HealthCheckRequest {
    pub service: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServingStatus {
    Serving,
    NotServing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: ServingStatus,
}
