//! Shared test harness for record store testing
//!
//! Provides record builders covering every `FieldValue` variant, a lookup
//! fake whose queries always fail, and the `record_store_tests!` contract
//! suite.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

pub mod record_store_tests;

use async_trait::async_trait;
use pms::core::error::StorageError;
use pms::core::integrity::{LookupFilter, RecordLookup};
use pms::core::record::Record;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

/// A record whose values span the scalar variants:
/// string (`name`, `email`), integer (`age`), float (`score`), boolean
/// (`active`) and null (`nickname`).
pub fn create_test_record(name: &str, email: &str, age: i64, score: f64, active: bool) -> Record {
    Record::from_json(json!({
        "name": name,
        "email": email,
        "age": age,
        "score": score,
        "active": active,
        "nickname": Value::Null,
    }))
}

pub fn country(name: &str, code: &str) -> Record {
    Record::from_json(json!({"name": name, "code": code}))
}

pub fn object(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// FailingLookup
// ---------------------------------------------------------------------------

/// Lookup whose every query fails, counting the attempts
#[derive(Debug, Default)]
pub struct FailingLookup {
    calls: AtomicUsize,
}

impl FailingLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordLookup for FailingLookup {
    async fn find_active_by_fields(
        &self,
        _entity_type: &str,
        _filter: &LookupFilter,
    ) -> Result<Option<Record>, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::QueryError {
            backend: "postgres".to_string(),
            message: "connection refused".to_string(),
        })
    }
}

/// Lookup that reports one fixed record for every query, ignoring the
/// exclusion carried by the filter
#[derive(Debug)]
pub struct StubbornLookup(pub Record);

#[async_trait]
impl RecordLookup for StubbornLookup {
    async fn find_active_by_fields(
        &self,
        _entity_type: &str,
        _filter: &LookupFilter,
    ) -> Result<Option<Record>, StorageError> {
        Ok(Some(self.0.clone()))
    }
}
