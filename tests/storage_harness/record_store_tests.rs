//! Macro-generated test suite for `RecordStore` contract validation.
//!
//! The `record_store_tests!` macro generates a test module that validates
//! any `RecordStore` implementation against the full contract: CRUD, soft
//! delete, active-record lookup across `FieldValue` variants, and
//! concurrent access.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use pms::storage::InMemoryRecordStore;
//!
//! record_store_tests!(InMemoryRecordStore::new());
//! ```

/// Generate a full `RecordStore` conformance test suite.
///
/// `$factory` is re-evaluated for each test to ensure isolation. For the
/// concurrent access test, the returned store must also implement
/// `Clone + 'static`.
#[macro_export]
macro_rules! record_store_tests {
    ($factory:expr) => {
        mod record_store_contract_tests {
            use super::*;
            use pms::core::field::FieldValue;
            use pms::core::integrity::{FieldCriterion, LookupFilter, RecordLookup};
            use pms::core::service::RecordStore;
            use serde_json::json;
            use uuid::Uuid;

            const TYPE: &str = "test_data";

            fn by(field: &str, value: FieldValue) -> LookupFilter {
                LookupFilter::new(vec![FieldCriterion::new(field, value)])
            }

            // ==================================================================
            // CRUD
            // ==================================================================

            #[tokio::test]
            async fn test_insert_and_get() {
                let store = $factory;
                let record = create_test_record("Alice", "alice@test.com", 30, 4.5, true);
                let id = record.id;

                let created = store.insert(TYPE, record.clone()).await.unwrap();
                assert_eq!(created, record);

                let retrieved = store.get(TYPE, &id).await.unwrap().unwrap();
                assert_eq!(retrieved.values["email"], json!("alice@test.com"));
                assert_eq!(retrieved.values["age"], json!(30));
            }

            #[tokio::test]
            async fn test_get_nonexistent() {
                let store = $factory;
                assert!(store.get(TYPE, &Uuid::new_v4()).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_types_are_isolated() {
                let store = $factory;
                let record = store
                    .insert(TYPE, create_test_record("Alice", "a@test.com", 1, 1.0, true))
                    .await
                    .unwrap();
                assert!(store.get("other", &record.id).await.unwrap().is_none());
                assert!(store.list("other").await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_list_multiple() {
                let store = $factory;
                for i in 0..5 {
                    let name = format!("user{}", i);
                    store
                        .insert(TYPE, create_test_record(&name, "x@test.com", i, 0.0, true))
                        .await
                        .unwrap();
                }
                assert_eq!(store.list(TYPE).await.unwrap().len(), 5);
            }

            #[tokio::test]
            async fn test_update_existing() {
                let store = $factory;
                let mut record = store
                    .insert(TYPE, create_test_record("Alice", "a@test.com", 30, 1.0, true))
                    .await
                    .unwrap();
                record.values.insert("name".into(), json!("Alicia"));

                let updated = store.update(TYPE, record.clone()).await.unwrap();
                assert_eq!(updated, Some(record.clone()));
                let retrieved = store.get(TYPE, &record.id).await.unwrap().unwrap();
                assert_eq!(retrieved.values["name"], json!("Alicia"));
            }

            #[tokio::test]
            async fn test_update_nonexistent() {
                let store = $factory;
                let record = create_test_record("Ghost", "g@test.com", 0, 0.0, false);
                assert_eq!(store.update(TYPE, record).await.unwrap(), None);
            }

            // ==================================================================
            // Soft delete
            // ==================================================================

            #[tokio::test]
            async fn test_soft_delete_keeps_record_out_of_list() {
                let store = $factory;
                let record = store
                    .insert(TYPE, create_test_record("Alice", "a@test.com", 30, 1.0, true))
                    .await
                    .unwrap();

                assert!(store.soft_delete(TYPE, &record.id).await.unwrap());
                assert!(store.list(TYPE).await.unwrap().is_empty());

                let kept = store.get(TYPE, &record.id).await.unwrap().unwrap();
                assert!(kept.deleted_at.is_some());
                assert!(!kept.is_active);
            }

            #[tokio::test]
            async fn test_soft_delete_nonexistent() {
                let store = $factory;
                assert!(!store.soft_delete(TYPE, &Uuid::new_v4()).await.unwrap());
            }

            // ==================================================================
            // Active lookup
            // ==================================================================

            #[tokio::test]
            async fn test_lookup_string_field_ignores_case() {
                let store = $factory;
                store
                    .insert(TYPE, create_test_record("Alice", "Alice@Test.com", 30, 1.0, true))
                    .await
                    .unwrap();

                let found = store
                    .find_active_by_fields(TYPE, &by("email", FieldValue::from("alice@test.com")))
                    .await
                    .unwrap();
                assert!(found.is_some());
            }

            #[tokio::test]
            async fn test_lookup_integer_float_boolean_fields() {
                let store = $factory;
                store
                    .insert(TYPE, create_test_record("Alice", "a@test.com", 30, 4.5, true))
                    .await
                    .unwrap();

                for filter in [
                    by("age", FieldValue::Integer(30)),
                    by("score", FieldValue::Float(4.5)),
                    by("active", FieldValue::Boolean(true)),
                ] {
                    assert!(store.find_active_by_fields(TYPE, &filter).await.unwrap().is_some());
                }

                let miss = by("age", FieldValue::Integer(31));
                assert!(store.find_active_by_fields(TYPE, &miss).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_lookup_requires_every_criterion() {
                let store = $factory;
                store
                    .insert(TYPE, create_test_record("Alice", "a@test.com", 30, 1.0, true))
                    .await
                    .unwrap();

                let filter = LookupFilter::new(vec![
                    FieldCriterion::new("name", FieldValue::from("alice")),
                    FieldCriterion::new("age", FieldValue::Integer(99)),
                ]);
                assert!(store.find_active_by_fields(TYPE, &filter).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_lookup_unknown_field() {
                let store = $factory;
                store
                    .insert(TYPE, create_test_record("Alice", "a@test.com", 30, 1.0, true))
                    .await
                    .unwrap();
                let filter = by("nonexistent", FieldValue::from("x"));
                assert!(store.find_active_by_fields(TYPE, &filter).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_lookup_skips_soft_deleted_and_excluded() {
                let store = $factory;
                let record = store
                    .insert(TYPE, create_test_record("Alice", "a@test.com", 30, 1.0, true))
                    .await
                    .unwrap();

                let filter = by("name", FieldValue::from("Alice"));
                let excluded = filter.clone().excluding(Some(record.id));
                assert!(store.find_active_by_fields(TYPE, &excluded).await.unwrap().is_none());

                store.soft_delete(TYPE, &record.id).await.unwrap();
                assert!(store.find_active_by_fields(TYPE, &filter).await.unwrap().is_none());
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_access() {
                let store = $factory;
                let mut handles = Vec::new();
                for i in 0..10 {
                    let store = store.clone();
                    handles.push(tokio::spawn(async move {
                        let name = format!("user{}", i);
                        store
                            .insert(TYPE, create_test_record(&name, "c@test.com", i, 0.0, true))
                            .await
                            .unwrap()
                    }));
                }
                for handle in handles {
                    handle.await.unwrap();
                }
                assert_eq!(store.list(TYPE).await.unwrap().len(), 10);
            }
        }
    };
}
