//! In-memory zone backend.
//!
//! # Purpose
//! Implements [`ZoneBackend`] with `HashMap`s guarded by `tokio::sync::RwLock`.
//! Used by the binary when no provider is configured and by tests.
//!
//! # Durability and consistency
//! - **Not durable**: all zones are lost on restart.
//! - Mutations take the write lock; reads share the read lock.
//! - Records live inside their zone entry, so deleting a zone drops its records.
use super::{
    Record, RecordQuery, RecordType, StoreError, StoreResult, Zone, ZoneBackend, ZonePatch,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

const DEFAULT_NAMESERVER: &str = "ns1.zonegate.local.";

#[derive(Debug, Clone)]
struct ZoneEntry {
    zone: Zone,
    records: Vec<Record>,
}

/// Process-local zone backend. Contents are lost on restart.
pub struct InMemoryZones {
    zones: RwLock<HashMap<String, ZoneEntry>>,
    healthy: AtomicBool,
}

impl Default for InMemoryZones {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryZones {
    pub fn new() -> Self {
        Self {
            zones: RwLock::new(HashMap::new()),
            healthy: AtomicBool::new(true),
        }
    }

    /// Build a backend pre-populated with empty zones.
    pub fn with_zones<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let zones = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                let entry = ZoneEntry {
                    zone: new_zone(&name, ZonePatch::default()),
                    records: Vec::new(),
                };
                (name, entry)
            })
            .collect();
        Self {
            zones: RwLock::new(zones),
            healthy: AtomicBool::new(true),
        }
    }

    /// Flip the result of [`ZoneBackend::health_check`].
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::Relaxed);
    }
}

fn zone_url(name: &str) -> String {
    format!("/api/v1/servers/localhost/zones/{name}")
}

fn new_zone(name: &str, patch: ZonePatch) -> Zone {
    let nameservers = if patch.nameservers.is_empty() {
        vec![DEFAULT_NAMESERVER.to_string()]
    } else {
        patch.nameservers
    };
    Zone {
        id: name.to_string(),
        name: name.to_string(),
        url: patch.url.unwrap_or_else(|| zone_url(name)),
        nameservers,
    }
}

#[async_trait]
impl ZoneBackend for InMemoryZones {
    async fn list_zones(&self) -> StoreResult<Vec<Zone>> {
        let zones = self.zones.read().await;
        let mut items: Vec<Zone> = zones.values().map(|entry| entry.zone.clone()).collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn get_zone(&self, name: &str) -> StoreResult<Zone> {
        let zones = self.zones.read().await;
        zones
            .get(name)
            .map(|entry| entry.zone.clone())
            .ok_or_else(|| StoreError::NotFound(format!("zone {name}")))
    }

    async fn create_zone(&self, name: &str, patch: ZonePatch) -> StoreResult<Zone> {
        let mut zones = self.zones.write().await;
        if zones.contains_key(name) {
            return Err(StoreError::Conflict(format!("zone {name}")));
        }
        let zone = new_zone(name, patch);
        zones.insert(
            name.to_string(),
            ZoneEntry {
                zone: zone.clone(),
                records: Vec::new(),
            },
        );
        Ok(zone)
    }

    async fn update_zone(&self, name: &str, patch: ZonePatch) -> StoreResult<Zone> {
        let mut zones = self.zones.write().await;
        let entry = zones
            .get_mut(name)
            .ok_or_else(|| StoreError::NotFound(format!("zone {name}")))?;
        entry.zone.nameservers = patch.nameservers;
        if let Some(url) = patch.url {
            entry.zone.url = url;
        }
        Ok(entry.zone.clone())
    }

    async fn delete_zone(&self, name: &str) -> StoreResult<()> {
        let mut zones = self.zones.write().await;
        zones
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("zone {name}")))
    }

    async fn list_records(&self, zone: &str, query: &RecordQuery) -> StoreResult<Vec<Record>> {
        let zones = self.zones.read().await;
        let entry = zones
            .get(zone)
            .ok_or_else(|| StoreError::NotFound(format!("zone {zone}")))?;
        Ok(entry
            .records
            .iter()
            .filter(|record| query.matches(record))
            .cloned()
            .collect())
    }

    async fn create_record(&self, zone: &str, record: Record) -> StoreResult<Record> {
        if record.record_type == RecordType::Any {
            return Err(StoreError::Invalid("record type ANY cannot be stored".to_string()));
        }
        let mut zones = self.zones.write().await;
        let entry = zones
            .get_mut(zone)
            .ok_or_else(|| StoreError::NotFound(format!("zone {zone}")))?;
        if entry
            .records
            .iter()
            .any(|existing| existing.name == record.name && existing.record_type == record.record_type)
        {
            return Err(StoreError::Conflict(format!(
                "record {} {}",
                record.name, record.record_type
            )));
        }
        entry.records.push(record.clone());
        Ok(record)
    }

    async fn update_record(&self, zone: &str, record: Record) -> StoreResult<Record> {
        let mut zones = self.zones.write().await;
        let entry = zones
            .get_mut(zone)
            .ok_or_else(|| StoreError::NotFound(format!("zone {zone}")))?;
        let existing = entry
            .records
            .iter_mut()
            .find(|existing| existing.name == record.name && existing.record_type == record.record_type)
            .ok_or_else(|| {
                StoreError::NotFound(format!("record {} {}", record.name, record.record_type))
            })?;
        *existing = record.clone();
        Ok(record)
    }

    async fn delete_record(
        &self,
        zone: &str,
        name: &str,
        record_type: RecordType,
    ) -> StoreResult<Record> {
        let mut zones = self.zones.write().await;
        let entry = zones
            .get_mut(zone)
            .ok_or_else(|| StoreError::NotFound(format!("zone {zone}")))?;
        let index = entry
            .records
            .iter()
            .position(|existing| existing.name == name && existing.record_type == record_type)
            .ok_or_else(|| StoreError::NotFound(format!("record {name} {record_type}")))?;
        Ok(entry.records.remove(index))
    }

    async fn health_check(&self) -> StoreResult<()> {
        if self.healthy.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(StoreError::Unexpected(anyhow::anyhow!("backend marked unhealthy")))
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
