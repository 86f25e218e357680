//! Stored records with audit metadata

use crate::core::field::FieldValue;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A persisted record of some entity type.
///
/// Domain values live in `values`; the base model columns are kept as
/// typed fields and merged back in by [`Record::to_json`].
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: Uuid,
    pub values: Map<String, Value>,
    pub is_active: bool,
    pub is_deletable: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Create a new active record with a fresh id and no audit stamps
    pub fn new(values: Map<String, Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            values,
            is_active: true,
            is_deletable: true,
            created_at: None,
            updated_at: None,
            created_by: None,
            updated_by: None,
            deleted_at: None,
        }
    }

    /// Convenience constructor from a JSON object; non-objects give an
    /// empty record
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(values) => Self::new(values),
            _ => Self::new(Map::new()),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Get the value of a specific field by name.
    ///
    /// Base model columns resolve from the typed fields; everything else
    /// from `values`.
    pub fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::Uuid(self.id)),
            "is_active" => Some(FieldValue::Boolean(self.is_active)),
            "is_deleted" => Some(FieldValue::Boolean(self.is_deleted())),
            "is_deletable" => Some(FieldValue::Boolean(self.is_deletable)),
            "created_at" => Some(self.created_at.map_or(FieldValue::Null, FieldValue::DateTime)),
            "updated_at" => Some(self.updated_at.map_or(FieldValue::Null, FieldValue::DateTime)),
            "created_by" => Some(self.created_by.clone().map_or(FieldValue::Null, FieldValue::String)),
            "updated_by" => Some(self.updated_by.clone().map_or(FieldValue::Null, FieldValue::String)),
            _ => self.values.get(field).and_then(FieldValue::from_json),
        }
    }

    /// Stamp creation metadata
    pub fn mark_created(&mut self, actor: Option<&str>, at: DateTime<Utc>) {
        self.created_at = Some(at);
        self.updated_at = Some(at);
        self.created_by = actor.map(str::to_string);
        self.updated_by = actor.map(str::to_string);
        self.is_active = true;
    }

    /// Stamp update metadata; a missing actor leaves `updated_by` untouched
    pub fn mark_updated(&mut self, actor: Option<&str>, at: DateTime<Utc>) {
        self.updated_at = Some(at);
        if let Some(actor) = actor {
            self.updated_by = Some(actor.to_string());
        }
    }

    /// Check if the record has been soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Soft delete: the record stays in storage but is no longer active
    pub fn soft_delete(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
        self.is_active = false;
    }

    /// Undo a soft delete
    pub fn restore(&mut self) {
        self.deleted_at = None;
        self.is_active = true;
    }

    /// Full JSON form of the record, base model columns included.
    ///
    /// This is the input a field set renders from.
    pub fn to_json(&self) -> Value {
        let mut object = self.values.clone();
        object.insert("id".into(), Value::String(self.id.to_string()));
        object.insert("is_active".into(), Value::Bool(self.is_active));
        object.insert("is_deleted".into(), Value::Bool(self.is_deleted()));
        object.insert("is_deletable".into(), Value::Bool(self.is_deletable));
        object.insert("created_at".into(), datetime_json(self.created_at));
        object.insert("updated_at".into(), datetime_json(self.updated_at));
        object.insert("created_by".into(), optional_json(&self.created_by));
        object.insert("updated_by".into(), optional_json(&self.updated_by));
        Value::Object(object)
    }
}

fn datetime_json(value: Option<DateTime<Utc>>) -> Value {
    value.map_or(Value::Null, |dt| Value::String(dt.to_rfc3339()))
}

fn optional_json(value: &Option<String>) -> Value {
    value.clone().map_or(Value::Null, Value::String)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_is_deleted() {
        let mut record = Record::from_json(json!({"name": "India"}));
        assert!(!record.is_deleted());
        assert!(record.is_active);

        record.soft_delete(Utc::now());
        assert!(record.is_deleted());
        assert!(!record.is_active);

        record.restore();
        assert!(!record.is_deleted());
    }

    #[test]
    fn test_field_value_resolves_base_columns() {
        let record = Record::from_json(json!({"name": "India", "tags": [1]}));
        assert_eq!(record.field_value("id"), Some(FieldValue::Uuid(record.id)));
        assert_eq!(record.field_value("name"), Some(FieldValue::from("India")));
        assert_eq!(record.field_value("created_by"), Some(FieldValue::Null));
        assert_eq!(record.field_value("tags"), None);
        assert_eq!(record.field_value("missing"), None);
    }

    #[test]
    fn test_mark_created_and_updated() {
        let mut record = Record::from_json(json!({}));
        let created = Utc::now();
        record.mark_created(Some("alice"), created);
        assert_eq!(record.created_by.as_deref(), Some("alice"));
        assert_eq!(record.updated_by.as_deref(), Some("alice"));

        record.mark_updated(Some("bob"), created);
        assert_eq!(record.created_by.as_deref(), Some("alice"));
        assert_eq!(record.updated_by.as_deref(), Some("bob"));

        record.mark_updated(None, created);
        assert_eq!(record.updated_by.as_deref(), Some("bob"));
    }

    #[test]
    fn test_to_json_includes_base_columns() {
        let record = Record::from_json(json!({"name": "India"}));
        let value = record.to_json();
        assert_eq!(value["name"], json!("India"));
        assert_eq!(value["id"], json!(record.id.to_string()));
        assert_eq!(value["is_deleted"], json!(false));
        assert_eq!(value["created_at"], Value::Null);
    }
}
