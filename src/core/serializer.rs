//! Model serializer: filtered representations and the validated write path
//!
//! A [`ModelSerializer`] is built per request from an entity schema and the
//! caller's filter directives. The filter shapes both what the
//! representation emits and which fields it accepts on input.
//!
//! ```rust,ignore
//! let serializer = ModelSerializer::new(schema.clone(), FieldFilter::new())
//!     .with_actor("alice");
//! let report = serializer.validate(payload, &store).await?;
//! let record = serializer.save(report.into_result()?, &store).await?;
//! let body = serializer.to_representation(&record);
//! ```

use crate::core::error::{EntityError, PmsError};
use crate::core::field_set::{FieldInfo, FieldSet, FieldSpec, ScalarKind};
use crate::core::filter::{AUDIT_FIELDS, FieldFilter};
use crate::core::integrity::{IntegrityValidator, RecordLookup};
use crate::core::record::Record;
use crate::core::schema::EntitySchema;
use crate::core::service::RecordStore;
use crate::core::validation::{NON_FIELD_ERRORS, ValidationOutcome, ValidationState};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Per-request representation of one entity type
#[derive(Debug, Clone)]
pub struct ModelSerializer {
    schema: Arc<EntitySchema>,
    fields: FieldSet,
    instance: Option<Record>,
    partial: bool,
    actor: Option<String>,
}

impl ModelSerializer {
    /// Build a serializer over the schema's default field set
    pub fn new(schema: Arc<EntitySchema>, filter: FieldFilter) -> Self {
        let fields = schema.fields.clone();
        Self::with_fields(schema, fields, filter)
    }

    /// Build a serializer over an explicit field set, such as a nested
    /// read view of the entity
    pub fn with_fields(schema: Arc<EntitySchema>, fields: FieldSet, filter: FieldFilter) -> Self {
        let fields = filter.apply(fields);
        Self {
            schema,
            fields,
            instance: None,
            partial: false,
            actor: None,
        }
    }

    /// Bind the record being updated
    pub fn for_instance(mut self, instance: Record) -> Self {
        self.instance = Some(instance);
        self
    }

    /// Partial updates do not require absent fields
    pub fn partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }

    /// The user the write is performed for
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn instance(&self) -> Option<&Record> {
        self.instance.as_ref()
    }

    /// Names of all fields in the filtered set
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.field_names()
    }

    /// Information about one field of the filtered set
    pub fn field_info(&self, name: &str) -> Option<FieldInfo> {
        self.fields.field_info(name)
    }

    /// Render a stored record
    pub fn to_representation(&self, record: &Record) -> Value {
        self.fields.render(&record.to_json())
    }

    /// Render several stored records
    pub fn to_representation_many(&self, records: &[Record]) -> Vec<Value> {
        records.iter().map(|r| self.to_representation(r)).collect()
    }

    /// Render an already-joined object graph (a record with its related
    /// records embedded)
    pub fn represent(&self, graph: &Value) -> Value {
        self.fields.render(graph)
    }

    /// Run per-field validation and, only if it passes, the unique-together
    /// check.
    ///
    /// Validation failures are reported in the returned
    /// [`ValidationReport`]. An `Err` means the system is misconfigured.
    pub async fn validate<L>(&self, payload: Value, lookup: &L) -> Result<ValidationReport, PmsError>
    where
        L: RecordLookup + ?Sized,
    {
        let entity_type = self.schema.entity_type.as_str();
        let mut state = ValidationState::Pending;
        state.advance(ValidationState::FieldValidation);

        let (data, errors) = self.validate_fields(payload);
        if !errors.is_valid() {
            state.advance(ValidationState::FieldFailed);
            tracing::debug!(entity_type, errors = %errors, "Field validation failed");
            return Ok(ValidationReport { state, data, errors });
        }

        state.advance(ValidationState::UniqueValidation);

        // Stored values only fill in fields this representation accepts
        let mut candidate: Map<String, Value> = match &self.instance {
            Some(instance) => self
                .fields
                .writable()
                .filter_map(|spec| {
                    instance
                        .values
                        .get(&spec.name)
                        .map(|v| (spec.name.clone(), v.clone()))
                })
                .collect(),
            None => Map::new(),
        };
        candidate.extend(data.iter().map(|(k, v)| (k.clone(), v.clone())));

        let errors = IntegrityValidator::new(lookup)
            .check_unique_groups(
                entity_type,
                &self.schema.unique_together,
                &candidate,
                self.instance.as_ref().map(|i| i.id),
            )
            .await?;

        if errors.is_valid() {
            state.advance(ValidationState::Valid);
        } else {
            state.advance(ValidationState::UniqueFailed);
            tracing::debug!(entity_type, errors = %errors, "Unique validation failed");
        }

        Ok(ValidationReport { state, data, errors })
    }

    /// Persist validated data: insert a new record, or update the bound
    /// instance.
    pub async fn save<S>(&self, validated: ValidatedData, store: &S) -> Result<Record, PmsError>
    where
        S: RecordStore + ?Sized,
    {
        let entity_type = self.schema.entity_type.as_str();
        let now = Utc::now();
        let actor = self.actor.as_deref();
        let mut data = validated.into_inner();

        match &self.instance {
            None => {
                let mut record = Record::new(data);
                record.mark_created(actor, now);
                let record = store.insert(entity_type, record).await?;
                tracing::info!(entity_type, id = %record.id, "Created record");
                Ok(record)
            }
            Some(instance) => {
                for field in AUDIT_FIELDS {
                    data.remove(field);
                }
                let mut record = instance.clone();
                record.values.extend(data);
                record.mark_updated(actor, now);

                let id = record.id;
                let record = store
                    .update(entity_type, record)
                    .await?
                    .ok_or_else(|| EntityError::NotFound {
                        entity_type: entity_type.to_string(),
                        id,
                    })?;
                tracing::info!(entity_type, id = %record.id, "Updated record");
                Ok(record)
            }
        }
    }

    /// Validate and persist in one step
    pub async fn validate_and_save<S>(&self, payload: Value, store: &S) -> Result<Record, PmsError>
    where
        S: RecordStore + ?Sized,
    {
        let validated = self.validate(payload, store).await?.into_result()?;
        self.save(validated, store).await
    }

    fn validate_fields(&self, payload: Value) -> (Map<String, Value>, ValidationOutcome) {
        let mut errors = ValidationOutcome::new();
        let mut data = Map::new();

        let Value::Object(payload) = payload else {
            errors.add(NON_FIELD_ERRORS, "Invalid data. Expected a dictionary.");
            return (data, errors);
        };

        for spec in self.fields.writable() {
            let Some(scalar) = spec.scalar_kind() else {
                continue;
            };
            match payload.get(&spec.name) {
                None if spec.required && !self.partial => {
                    errors.add(spec.name.as_str(), "This field is required.");
                }
                None => {}
                Some(value) => match coerce(spec, scalar, value) {
                    Ok(value) => {
                        data.insert(spec.name.clone(), value);
                    }
                    Err(message) => errors.add(spec.name.as_str(), message),
                },
            }
        }

        if errors.is_valid() {
            errors.merge(self.schema.validation.validate_and_transform(&mut data));
        }

        (data, errors)
    }
}

/// Convert a submitted value to its stored form, or explain why not
fn coerce(spec: &FieldSpec, kind: ScalarKind, value: &Value) -> Result<Value, String> {
    if value.is_null() {
        return if spec.nullable {
            Ok(Value::Null)
        } else {
            Err("This field may not be null.".to_string())
        };
    }

    match kind {
        ScalarKind::String | ScalarKind::Text => {
            let Some(s) = value.as_str() else {
                return Err("Not a valid string.".to_string());
            };
            let s = s.trim();
            if s.is_empty() && spec.required {
                return Err("This field may not be blank.".to_string());
            }
            let len = s.chars().count();
            if let Some(max) = spec.max_length.filter(|max| len > *max) {
                return Err(format!("Ensure this field has no more than {} characters.", max));
            }
            if let Some(min) = spec.min_length.filter(|min| len < *min) {
                return Err(format!("Ensure this field has at least {} characters.", min));
            }
            Ok(Value::String(s.to_string()))
        }
        ScalarKind::Uuid => value
            .as_str()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(|id| Value::String(id.to_string()))
            .ok_or_else(|| "Must be a valid UUID.".to_string()),
        ScalarKind::Integer => match value {
            Value::Number(n) if n.is_i64() => Ok(value.clone()),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| "A valid integer is required.".to_string()),
            _ => Err("A valid integer is required.".to_string()),
        },
        ScalarKind::Float => match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::from)
                .ok_or_else(|| "A valid number is required.".to_string()),
            _ => Err("A valid number is required.".to_string()),
        },
        ScalarKind::Boolean => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _ => Err("Must be a valid boolean.".to_string()),
            },
            Value::Number(n) => match n.as_i64() {
                Some(1) => Ok(Value::Bool(true)),
                Some(0) => Ok(Value::Bool(false)),
                _ => Err("Must be a valid boolean.".to_string()),
            },
            _ => Err("Must be a valid boolean.".to_string()),
        },
        ScalarKind::Date => value
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .ok_or_else(|| {
                "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.".to_string()
            }),
        ScalarKind::DateTime => value
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
            .map(|dt| Value::String(dt.with_timezone(&Utc).to_rfc3339()))
            .ok_or_else(|| {
                "Datetime has wrong format. Use one of these formats instead: \
                 YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z]."
                    .to_string()
            }),
    }
}

/// What validating one payload produced
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    state: ValidationState,
    data: Map<String, Value>,
    errors: ValidationOutcome,
}

impl ValidationReport {
    /// The terminal state validation stopped in
    pub fn state(&self) -> ValidationState {
        self.state
    }

    pub fn is_valid(&self) -> bool {
        self.state == ValidationState::Valid
    }

    pub fn errors(&self) -> &ValidationOutcome {
        &self.errors
    }

    /// The coerced and transformed values
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Validated data ready to save, or the validation errors
    pub fn into_result(self) -> Result<ValidatedData, PmsError> {
        if self.is_valid() {
            Ok(ValidatedData(self.data))
        } else {
            Err(PmsError::Validation(self.errors))
        }
    }
}

/// Data that passed every validation stage. Only obtainable from a valid
/// [`ValidationReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedData(Map<String, Value>);

impl ValidatedData {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(kind: ScalarKind) -> FieldSpec {
        FieldSpec::new("f", crate::core::field_set::FieldKind::Scalar(kind))
    }

    #[test]
    fn test_coerce_strings_trim_and_check_length() {
        let s = spec(ScalarKind::String).max_length(3);
        assert_eq!(coerce(&s, ScalarKind::String, &json!(" ab ")), Ok(json!("ab")));
        assert_eq!(
            coerce(&s, ScalarKind::String, &json!("abcd")),
            Err("Ensure this field has no more than 3 characters.".to_string())
        );
        assert_eq!(
            coerce(&s, ScalarKind::String, &json!("   ")),
            Err("This field may not be blank.".to_string())
        );
        assert!(coerce(&s, ScalarKind::String, &json!(5)).is_err());
        assert_eq!(coerce(&s.clone().optional(), ScalarKind::String, &json!("")), Ok(json!("")));
    }

    #[test]
    fn test_coerce_null_respects_nullable() {
        let s = spec(ScalarKind::Date);
        assert_eq!(
            coerce(&s, ScalarKind::Date, &Value::Null),
            Err("This field may not be null.".to_string())
        );
        assert_eq!(coerce(&s.nullable(), ScalarKind::Date, &Value::Null), Ok(Value::Null));
    }

    #[test]
    fn test_coerce_uuid_normalises() {
        let id = Uuid::new_v4();
        let s = spec(ScalarKind::Uuid);
        assert_eq!(
            coerce(&s, ScalarKind::Uuid, &json!(id.to_string().to_uppercase())),
            Ok(json!(id.to_string()))
        );
        assert!(coerce(&s, ScalarKind::Uuid, &json!("nope")).is_err());
    }

    #[test]
    fn test_coerce_numbers_and_booleans() {
        let i = spec(ScalarKind::Integer);
        assert_eq!(coerce(&i, ScalarKind::Integer, &json!("42")), Ok(json!(42)));
        assert!(coerce(&i, ScalarKind::Integer, &json!(4.5)).is_err());

        let f = spec(ScalarKind::Float);
        assert_eq!(coerce(&f, ScalarKind::Float, &json!("1.5")), Ok(json!(1.5)));
        for non_finite in ["NaN", "inf", "-infinity"] {
            assert_eq!(
                coerce(&f, ScalarKind::Float, &json!(non_finite)),
                Err("A valid number is required.".to_string())
            );
        }

        let b = spec(ScalarKind::Boolean);
        assert_eq!(coerce(&b, ScalarKind::Boolean, &json!("TRUE")), Ok(json!(true)));
        assert_eq!(coerce(&b, ScalarKind::Boolean, &json!(0)), Ok(json!(false)));
        assert!(coerce(&b, ScalarKind::Boolean, &json!("maybe")).is_err());
    }

    #[test]
    fn test_coerce_dates() {
        let d = spec(ScalarKind::Date);
        assert_eq!(coerce(&d, ScalarKind::Date, &json!("2025-01-31")), Ok(json!("2025-01-31")));
        assert!(coerce(&d, ScalarKind::Date, &json!("31/01/2025")).is_err());

        let dt = spec(ScalarKind::DateTime);
        assert_eq!(
            coerce(&dt, ScalarKind::DateTime, &json!("2025-01-31T10:00:00+02:00")),
            Ok(json!("2025-01-31T08:00:00+00:00"))
        );
        assert!(coerce(&dt, ScalarKind::DateTime, &json!("yesterday")).is_err());
    }
}
