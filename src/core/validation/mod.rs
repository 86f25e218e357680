//! Validation system
//!
//! Per-field rules (transforms and validators) declared per entity type,
//! the field-keyed [`ValidationOutcome`] they produce, and the
//! [`ValidationState`] machine a write request moves through.

pub mod config;
pub mod outcome;
pub mod state;
pub mod transforms;
pub mod validators;

pub use config::EntityValidationConfig;
pub use outcome::{NON_FIELD_ERRORS, ValidationOutcome};
pub use state::ValidationState;
