//! # PMS-RS
//!
//! Backend core for a project and ticket management system.
//!
//! ## Features
//!
//! - **Field Filtering**: Allow-lists, deny-lists and audit stripping over
//!   nested representations, driven by dotted paths (`story.project.name`)
//! - **Validated Writes**: Per-field coercion, transforms and validators,
//!   then unique-together checks against live records
//! - **Case-Insensitive Uniqueness**: `"India"` and `"INDIA"` collide
//! - **Audit Stamping**: created/updated timestamps and actors managed on save
//! - **Soft Delete Support**: deleted records never block a new one
//! - **Configuration-Based**: unique-together groups declared in YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pms::prelude::*;
//!
//! let mut registry = pms::entities::registry()?;
//! registry.apply_config(&SchemaConfig::default_config())?;
//! let store = InMemoryRecordStore::new();
//!
//! let country = registry.get("country")?;
//! let serializer = ModelSerializer::new(country, FieldFilter::new()).with_actor("admin");
//! let record = serializer
//!     .validate_and_save(json!({"name": "India", "code": "in"}), &store)
//!     .await?;
//!
//! let params = FilterParams {
//!     fields: Some("id,name".into()),
//!     ..Default::default()
//! };
//! let view = ModelSerializer::new(registry.get("country")?, params.into_filter());
//! println!("{}", view.to_representation(&record));
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Field Model ===
    pub use crate::core::{
        field::FieldValue,
        field_set::{FieldInfo, FieldKind, FieldSet, FieldSpec, ScalarKind},
        record::Record,
    };

    // === Filtering ===
    pub use crate::core::{
        filter::{AUDIT_FIELDS, FieldFilter, FilterTree},
        query::FilterParams,
    };

    // === Validation ===
    pub use crate::core::{
        integrity::{IntegrityValidator, LookupFilter, RecordLookup, UniqueGroup},
        serializer::{ModelSerializer, ValidatedData, ValidationReport},
        validation::{
            EntityValidationConfig, NON_FIELD_ERRORS, ValidationOutcome, ValidationState,
            transforms, validators,
        },
    };

    // === Schemas ===
    pub use crate::core::schema::{EntitySchema, SchemaRegistry};

    // === Errors ===
    pub use crate::core::error::{
        ConfigError, EntityError, IntegrityError, PmsError, StorageError,
    };

    // === Storage ===
    pub use crate::core::service::RecordStore;
    pub use crate::storage::InMemoryRecordStore;

    // === Config ===
    pub use crate::config::{EntityConfig, FilterDefaults, SchemaConfig};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};
    pub use uuid::Uuid;
}
