//! Storage service trait for records

use crate::core::error::StorageError;
use crate::core::integrity::RecordLookup;
use crate::core::record::Record;
use async_trait::async_trait;
use uuid::Uuid;

/// Service trait for persisting records of any entity type.
///
/// Implementations also provide the [`RecordLookup`] the uniqueness check
/// reads through. The framework is agnostic to the underlying storage
/// mechanism.
#[async_trait]
pub trait RecordStore: RecordLookup {
    /// Insert a new record
    async fn insert(&self, entity_type: &str, record: Record) -> Result<Record, StorageError>;

    /// Get a record by ID, soft-deleted ones included
    async fn get(&self, entity_type: &str, id: &Uuid) -> Result<Option<Record>, StorageError>;

    /// List records that are not soft-deleted
    async fn list(&self, entity_type: &str) -> Result<Vec<Record>, StorageError>;

    /// Replace an existing record. Returns `None` if there is no record
    /// with that id.
    async fn update(&self, entity_type: &str, record: Record)
    -> Result<Option<Record>, StorageError>;

    /// Mark a record deleted without removing it. Returns whether a record
    /// was found.
    async fn soft_delete(&self, entity_type: &str, id: &Uuid) -> Result<bool, StorageError>;
}
