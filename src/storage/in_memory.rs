//! In-memory implementation of RecordStore for testing and development

use crate::core::error::StorageError;
use crate::core::integrity::{LookupFilter, RecordLookup};
use crate::core::record::Record;
use crate::core::service::RecordStore;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

type Tables = HashMap<String, HashMap<Uuid, Record>>;

/// In-memory record store
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
/// Records are kept per entity type; clones share the same tables.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRecordStore {
    /// Create a new in-memory record store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StorageError> {
        self.tables.read().map_err(|e| StorageError::LockPoisoned {
            kind: "read",
            message: e.to_string(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StorageError> {
        self.tables.write().map_err(|e| StorageError::LockPoisoned {
            kind: "write",
            message: e.to_string(),
        })
    }

    /// Number of stored records of a type, soft-deleted ones included
    pub fn count(&self, entity_type: &str) -> Result<usize, StorageError> {
        Ok(self.read()?.get(entity_type).map_or(0, HashMap::len))
    }
}

#[async_trait]
impl RecordLookup for InMemoryRecordStore {
    async fn find_active_by_fields(
        &self,
        entity_type: &str,
        filter: &LookupFilter,
    ) -> Result<Option<Record>, StorageError> {
        let tables = self.read()?;

        Ok(tables.get(entity_type).and_then(|table| {
            table
                .values()
                .find(|record| !record.is_deleted() && filter.matches(record))
                .cloned()
        }))
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, entity_type: &str, record: Record) -> Result<Record, StorageError> {
        let mut tables = self.write()?;

        tables
            .entry(entity_type.to_string())
            .or_default()
            .insert(record.id, record.clone());

        Ok(record)
    }

    async fn get(&self, entity_type: &str, id: &Uuid) -> Result<Option<Record>, StorageError> {
        let tables = self.read()?;

        Ok(tables.get(entity_type).and_then(|t| t.get(id)).cloned())
    }

    async fn list(&self, entity_type: &str) -> Result<Vec<Record>, StorageError> {
        let tables = self.read()?;

        let mut records: Vec<Record> = tables
            .get(entity_type)
            .map(|t| t.values().filter(|r| !r.is_deleted()).cloned().collect())
            .unwrap_or_default();
        records.sort_by_key(|r| r.created_at);

        Ok(records)
    }

    async fn update(
        &self,
        entity_type: &str,
        record: Record,
    ) -> Result<Option<Record>, StorageError> {
        let mut tables = self.write()?;

        let Some(slot) = tables
            .get_mut(entity_type)
            .and_then(|t| t.get_mut(&record.id))
        else {
            return Ok(None);
        };
        *slot = record.clone();

        Ok(Some(record))
    }

    async fn soft_delete(&self, entity_type: &str, id: &Uuid) -> Result<bool, StorageError> {
        let mut tables = self.write()?;

        match tables.get_mut(entity_type).and_then(|t| t.get_mut(id)) {
            Some(record) => {
                record.soft_delete(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
