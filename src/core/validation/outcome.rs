//! Field-keyed validation messages

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Key used for errors that belong to no single field
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Result of validating one write request.
///
/// Empty means success. Otherwise maps a field name, or a comma-joined
/// group of field names for uniqueness conflicts, to its messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationOutcome {
    errors: IndexMap<String, Vec<String>>,
}

impl ValidationOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Append a message under `key`
    pub fn add(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(key.into()).or_default().push(message.into());
    }

    /// Record a message under `key` unless the key already has messages
    pub fn add_once(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(key.into())
            .or_insert_with(|| vec![message.into()]);
    }

    /// Fold another outcome into this one
    pub fn merge(&mut self, other: ValidationOutcome) {
        for (key, messages) in other.errors {
            self.errors.entry(key).or_default().extend(messages);
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.errors.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.errors.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> IndexMap<String, Vec<String>> {
        self.errors
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(key, messages)| format!("{}: {}", key, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}
