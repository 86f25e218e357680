//! Integration tests for InMemoryRecordStore using the storage test harness.
//!
//! This file invokes `record_store_tests!` to validate that
//! InMemoryRecordStore fully conforms to the RecordStore contract.

#[macro_use]
mod storage_harness;

use pms::storage::InMemoryRecordStore;
use storage_harness::*;

record_store_tests!(InMemoryRecordStore::new());
