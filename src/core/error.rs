//! Typed error handling
//!
//! Three kinds of failure are kept apart so monitoring can tell them apart:
//!
//! - [`PmsError::Validation`]: the caller sent bad data. Carries the
//!   field-keyed messages of a [`ValidationOutcome`].
//! - [`PmsError::Integrity`]: the system is misconfigured, e.g. a unique
//!   group names a field the representation does not expose.
//! - [`PmsError::Storage`]: the backing store failed.
//!
//! ```rust,ignore
//! match serializer.validate(payload, &store).await {
//!     Err(PmsError::Validation(outcome)) => respond_400(outcome),
//!     Err(PmsError::Integrity(fault)) => page_someone(fault),
//!     ...
//! }
//! ```

use crate::core::validation::ValidationOutcome;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// The main error type
#[derive(Debug, Error)]
pub enum PmsError {
    /// Per-field or uniqueness validation failed
    #[error("Data validation failed: {0}")]
    Validation(ValidationOutcome),

    /// Internal misconfiguration detected while validating
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// Storage backend errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Entity lookups
    #[error(transparent)]
    Entity(#[from] EntityError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Field-keyed messages for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl PmsError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            PmsError::Validation(_) => StatusCode::BAD_REQUEST,
            PmsError::Integrity(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PmsError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PmsError::Entity(e) => e.status_code(),
            PmsError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            PmsError::Validation(_) => "VALIDATION_ERROR",
            PmsError::Integrity(_) => "DATA_INTEGRITY_ERROR",
            PmsError::Storage(_) => "STORAGE_ERROR",
            PmsError::Entity(e) => e.error_code(),
            PmsError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// True for errors caused by caller input rather than by the system
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Convert to an error response.
    ///
    /// Server-side faults keep their detail out of the response body.
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            PmsError::Validation(outcome) => ErrorResponse {
                code: self.error_code().to_string(),
                message: "Data validation failed.".to_string(),
                details: serde_json::to_value(outcome).ok(),
            },
            PmsError::Entity(_) => ErrorResponse {
                code: self.error_code().to_string(),
                message: self.to_string(),
                details: None,
            },
            _ => ErrorResponse {
                code: self.error_code().to_string(),
                message: "Internal server error.".to_string(),
                details: None,
            },
        }
    }

    /// The validation messages, if this is a validation failure
    pub fn validation_errors(&self) -> Option<&ValidationOutcome> {
        match self {
            PmsError::Validation(outcome) => Some(outcome),
            _ => None,
        }
    }
}

impl From<ValidationOutcome> for PmsError {
    fn from(outcome: ValidationOutcome) -> Self {
        PmsError::Validation(outcome)
    }
}

impl IntoResponse for PmsError {
    fn into_response(self) -> Response {
        if !self.is_client_error() {
            tracing::error!(code = self.error_code(), error = %self, "Request failed");
        }
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Integrity Errors
// =============================================================================

/// A data-integrity fault: the declared constraints and the data exposed
/// to them disagree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    /// A unique group names fields absent from the validated values
    #[error(
        "Unique validation failed for {entity_type}. Unique fields: [{}], \
         serializer fields: [{}]. Expected {expected} fields, got {found}.",
        .unique_fields.join(", "),
        .found_fields.join(", ")
    )]
    IncompleteUniqueGroup {
        entity_type: String,
        unique_fields: Vec<String>,
        found_fields: Vec<String>,
        expected: usize,
        found: usize,
    },
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Query execution error
    #[error("{backend} query error: {message}")]
    QueryError { backend: String, message: String },

    /// A lock guarding the store was poisoned
    #[error("Failed to acquire {kind} lock: {message}")]
    LockPoisoned { kind: &'static str, message: String },

    /// Backend not available
    #[error("Storage backend '{backend}' is unavailable")]
    Unavailable { backend: String },
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to entity lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// Entity was not found
    #[error("{entity_type} with id '{id}' not found")]
    NotFound { entity_type: String, id: Uuid },

    /// Entity type is not registered
    #[error("Unknown entity type: {entity_type}")]
    UnknownType { entity_type: String },
}

impl EntityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::UnknownType { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::UnknownType { .. } => "UNKNOWN_ENTITY_TYPE",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    /// Configuration names an entity type no schema declares
    #[error("Unknown entity type in config: {entity_type}")]
    UnknownEntity { entity_type: String },

    /// Invalid value in configuration
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fault() -> IntegrityError {
        IntegrityError::IncompleteUniqueGroup {
            entity_type: "state".to_string(),
            unique_fields: vec!["name".to_string(), "country".to_string()],
            found_fields: vec!["name".to_string()],
            expected: 2,
            found: 1,
        }
    }

    #[test]
    fn test_validation_is_client_error() {
        let mut outcome = ValidationOutcome::new();
        outcome.add("name", "This field is required.");
        let err = PmsError::from(outcome);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.is_client_error());

        let response = err.to_response();
        assert_eq!(
            response.details,
            Some(serde_json::json!({"name": ["This field is required."]}))
        );
    }

    #[test]
    fn test_integrity_fault_is_server_error() {
        let err = PmsError::from(fault());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "DATA_INTEGRITY_ERROR");
        assert!(err.validation_errors().is_none());
        assert_eq!(err.to_response().message, "Internal server error.");
    }

    #[test]
    fn test_integrity_message_names_fields() {
        let message = fault().to_string();
        assert!(message.contains("[name, country]"));
        assert!(message.contains("Expected 2 fields, got 1."));
    }

    #[test]
    fn test_entity_not_found() {
        let id = Uuid::new_v4();
        let err = PmsError::from(EntityError::NotFound {
            entity_type: "ticket".to_string(),
            id,
        });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "ENTITY_NOT_FOUND");
        assert_eq!(err.to_response().message, format!("ticket with id '{}' not found", id));
    }

    #[test]
    fn test_into_response_status() {
        let err = PmsError::from(StorageError::Unavailable {
            backend: "memory".to_string(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
