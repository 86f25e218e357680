//! Scalar field values and lookup equality

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// A polymorphic scalar value, used when comparing candidate data
/// against stored records.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    Null,
}

impl FieldValue {
    /// Convert a JSON scalar into a field value.
    ///
    /// Arrays and objects have no scalar form and yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(FieldValue::Null),
            Value::Bool(b) => Some(FieldValue::Boolean(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(FieldValue::Integer(i)),
                None => n.as_f64().map(FieldValue::Float),
            },
            Value::String(s) => Some(FieldValue::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Convert back into JSON, the way a representation emits it
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::Integer(i) => Value::from(*i),
            FieldValue::Float(f) => Value::from(*f),
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Uuid(u) => Value::String(u.to_string()),
            FieldValue::DateTime(dt) => Value::String(dt.to_rfc3339()),
            FieldValue::Null => Value::Null,
        }
    }

    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a UUID if possible
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            FieldValue::Uuid(u) => Some(*u),
            FieldValue::String(s) => Uuid::parse_str(s).ok(),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Text values are compared case-insensitively in uniqueness lookups
    pub fn is_text(&self) -> bool {
        matches!(self, FieldValue::String(_))
    }

    /// Lookup equality.
    ///
    /// With `case_insensitive` set, two strings match when they are equal
    /// ignoring case. A UUID matches its own string form. Integers and
    /// floats compare numerically.
    pub fn matches(&self, other: &FieldValue, case_insensitive: bool) -> bool {
        match (self, other) {
            (FieldValue::String(a), FieldValue::String(b)) => {
                if case_insensitive {
                    a.to_lowercase() == b.to_lowercase()
                } else {
                    a == b
                }
            }
            (FieldValue::Uuid(a), FieldValue::String(s))
            | (FieldValue::String(s), FieldValue::Uuid(a)) => {
                Uuid::parse_str(s).is_ok_and(|b| *a == b)
            }
            (FieldValue::Integer(a), FieldValue::Float(b))
            | (FieldValue::Float(b), FieldValue::Integer(a)) => (*a as f64) == *b,
            _ => self == other,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Uuid(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_string() {
        let value = FieldValue::String("test".to_string());
        assert_eq!(value.as_string(), Some("test"));
        assert_eq!(value.as_integer(), None);
        assert!(!value.is_null());
        assert!(value.is_text());
    }

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(FieldValue::from_json(&json!(null)), Some(FieldValue::Null));
        assert_eq!(FieldValue::from_json(&json!(7)), Some(FieldValue::Integer(7)));
        assert_eq!(FieldValue::from_json(&json!(1.5)), Some(FieldValue::Float(1.5)));
        assert_eq!(FieldValue::from_json(&json!(true)), Some(FieldValue::Boolean(true)));
        assert_eq!(FieldValue::from_json(&json!("x")), Some(FieldValue::from("x")));
    }

    #[test]
    fn test_from_json_rejects_containers() {
        assert_eq!(FieldValue::from_json(&json!([1, 2])), None);
        assert_eq!(FieldValue::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_matches_case_insensitive_text() {
        let a = FieldValue::from("India");
        let b = FieldValue::from("INDIA");
        assert!(a.matches(&b, true));
        assert!(!a.matches(&b, false));
    }

    #[test]
    fn test_matches_uuid_against_string_form() {
        let id = Uuid::new_v4();
        let as_uuid = FieldValue::Uuid(id);
        let as_text = FieldValue::String(id.to_string().to_uppercase());
        assert!(as_uuid.matches(&as_text, true));
        assert!(as_text.matches(&as_uuid, false));
    }

    #[test]
    fn test_matches_numbers_and_null() {
        assert!(FieldValue::Integer(3).matches(&FieldValue::Float(3.0), false));
        assert!(!FieldValue::Integer(3).matches(&FieldValue::Integer(4), false));
        assert!(FieldValue::Null.matches(&FieldValue::Null, false));
        assert!(!FieldValue::Null.matches(&FieldValue::from(""), true));
    }

    #[test]
    fn test_to_json_formats_timestamps_and_ids() {
        let id = Uuid::new_v4();
        assert_eq!(FieldValue::Uuid(id).to_json(), json!(id.to_string()));
        let at = DateTime::parse_from_rfc3339("2024-02-29T10:30:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc);
        assert_eq!(FieldValue::DateTime(at).to_json(), json!("2024-02-29T10:30:00+00:00"));
    }
}
