//! Core module containing the field model, filtering, validation and storage traits

pub mod error;
pub mod field;
pub mod field_set;
pub mod filter;
pub mod integrity;
pub mod query;
pub mod record;
pub mod schema;
pub mod serializer;
pub mod service;
pub mod validation;

pub use error::{ConfigError, EntityError, IntegrityError, PmsError, StorageError};
pub use field::FieldValue;
pub use field_set::{FieldInfo, FieldKind, FieldSet, FieldSpec, ScalarKind};
pub use filter::{AUDIT_FIELDS, FieldFilter, FilterTree};
pub use integrity::{FieldCriterion, IntegrityValidator, LookupFilter, RecordLookup, UniqueGroup};
pub use query::FilterParams;
pub use record::Record;
pub use schema::{EntitySchema, SchemaRegistry};
pub use serializer::{ModelSerializer, ValidatedData, ValidationReport};
pub use service::RecordStore;
pub use validation::{EntityValidationConfig, NON_FIELD_ERRORS, ValidationOutcome, ValidationState};
