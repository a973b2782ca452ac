//! 메모리 저장소 (테스트용)

use super::{Catalog, CountingLogStore};
use crate::error::{PharmError, Result};
use pharm_inventory_common::{CanonicalDrugRecord, CountingLogEntry, DedupKey, NewCountingLogEntry};
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    catalog: Mutex<Vec<CanonicalDrugRecord>>,
    logs: Mutex<Vec<CountingLogEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: Vec<CanonicalDrugRecord>) -> Self {
        Self {
            catalog: Mutex::new(catalog),
            logs: Mutex::new(Vec::new()),
        }
    }

    /// 저장된 카운팅 로그 복사본
    pub fn entries(&self) -> Result<Vec<CountingLogEntry>> {
        Ok(self.logs.lock().map_err(|_| PharmError::LockPoisoned)?.clone())
    }
}

impl Catalog for MemoryStore {
    fn list_all(&self) -> Result<Vec<CanonicalDrugRecord>> {
        Ok(self.catalog.lock().map_err(|_| PharmError::LockPoisoned)?.clone())
    }
}

impl CountingLogStore for MemoryStore {
    fn find(&self, key: &DedupKey) -> Result<Option<CountingLogEntry>> {
        let logs = self.logs.lock().map_err(|_| PharmError::LockPoisoned)?;
        Ok(logs.iter().find(|e| &e.dedup_key() == key).cloned())
    }

    fn insert(&self, entry: &NewCountingLogEntry) -> Result<i64> {
        let mut logs = self.logs.lock().map_err(|_| PharmError::LockPoisoned)?;
        let id = logs.last().map(|e| e.id + 1).unwrap_or(1);
        logs.push(entry.clone().with_id(id));
        Ok(id)
    }
}
