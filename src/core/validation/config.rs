//! Per-entity validation rules

use super::outcome::{NON_FIELD_ERRORS, ValidationOutcome};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

type FieldValidator = Arc<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;
type FieldTransform = Arc<dyn Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync>;
type ObjectValidator = Arc<dyn Fn(&Map<String, Value>) -> Result<(), (String, String)> + Send + Sync>;

/// Transforms and validators attached to one entity type.
///
/// For every submitted field, transforms run first (in registration
/// order), then validators. Object validators see the whole transformed
/// payload and run only when every field passed, so cross-field rules can
/// rely on well-formed values.
///
/// ```rust,ignore
/// let config = EntityValidationConfig::new("country")
///     .transform("code", transforms::trim())
///     .transform("code", transforms::uppercase())
///     .validate("code", validators::string_length(2, 10));
/// ```
#[derive(Clone, Default)]
pub struct EntityValidationConfig {
    entity_type: String,
    transforms: IndexMap<String, Vec<FieldTransform>>,
    validators: IndexMap<String, Vec<FieldValidator>>,
    object_validators: Vec<ObjectValidator>,
}

impl fmt::Debug for EntityValidationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityValidationConfig")
            .field("entity_type", &self.entity_type)
            .field("transforms", &self.transforms.keys().collect::<Vec<_>>())
            .field("validators", &self.validators.keys().collect::<Vec<_>>())
            .field("object_validators", &self.object_validators.len())
            .finish()
    }
}

impl EntityValidationConfig {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            ..Default::default()
        }
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Register a value transform for a field
    pub fn transform<F>(mut self, field: &str, transform: F) -> Self
    where
        F: Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.transforms
            .entry(field.to_string())
            .or_default()
            .push(Arc::new(transform));
        self
    }

    /// Register a validator for a field
    pub fn validate<F>(mut self, field: &str, validator: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators
            .entry(field.to_string())
            .or_default()
            .push(Arc::new(validator));
        self
    }

    /// Register a cross-field validator.
    ///
    /// On rejection it returns the key to report under (a field name or
    /// [`NON_FIELD_ERRORS`]) and the message.
    pub fn validate_object<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> Result<(), (String, String)> + Send + Sync + 'static,
    {
        self.object_validators.push(Arc::new(validator));
        self
    }

    /// Transform and validate the submitted fields of `data` in place.
    ///
    /// Only keys present in `data` are touched; absent fields are the
    /// caller's concern (required checks run before this).
    pub fn validate_and_transform(&self, data: &mut Map<String, Value>) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::new();

        for (field, transforms) in &self.transforms {
            let Some(slot) = data.get_mut(field) else {
                continue;
            };
            for transform in transforms {
                let value = std::mem::take(slot);
                match transform(field, value.clone()) {
                    Ok(transformed) => *slot = transformed,
                    Err(e) => {
                        *slot = value;
                        outcome.add(field.as_str(), e.to_string());
                        break;
                    }
                }
            }
        }

        for (field, validators) in &self.validators {
            let Some(value) = data.get(field) else {
                continue;
            };
            for validator in validators {
                if let Err(message) = validator(field, value) {
                    outcome.add(field.as_str(), message);
                }
            }
        }

        if outcome.is_valid() {
            for validator in &self.object_validators {
                if let Err((key, message)) = validator(data) {
                    let key = if key.is_empty() {
                        NON_FIELD_ERRORS.to_string()
                    } else {
                        key
                    };
                    outcome.add(key, message);
                }
            }
        }

        outcome
    }
}
