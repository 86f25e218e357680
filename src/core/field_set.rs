//! Field specifications and ordered field sets
//!
//! A [`FieldSet`] is the tree of named attributes a record representation
//! emits or accepts. Nested entries own their own field set, either for a
//! single related record or for a one-to-many list.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// Scalar type of a leaf field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Uuid,
    String,
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
}

impl ScalarKind {
    /// Name reported by [`FieldInfo`]
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarKind::Uuid => "UUIDField",
            ScalarKind::String => "CharField",
            ScalarKind::Text => "TextField",
            ScalarKind::Integer => "IntegerField",
            ScalarKind::Float => "FloatField",
            ScalarKind::Boolean => "BooleanField",
            ScalarKind::Date => "DateField",
            ScalarKind::DateTime => "DateTimeField",
        }
    }
}

/// What a field holds
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Scalar(ScalarKind),
    /// A single nested representation
    Nested(FieldSet),
    /// A one-to-many list of nested representations
    NestedList(FieldSet),
}

/// A named, typed attribute of a record representation
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub read_only: bool,
    pub required: bool,
    pub nullable: bool,
    pub help_text: Option<String>,
    pub label: Option<String>,
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
    /// Dotted path into the record the value is read from, when it differs
    /// from the field name (e.g. `city.name`)
    pub source: Option<String>,
}

impl FieldSpec {
    /// Create a writable, required field of the given kind
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            read_only: false,
            required: true,
            nullable: false,
            help_text: None,
            label: None,
            max_length: None,
            min_length: None,
            source: None,
        }
    }

    pub fn uuid(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar(ScalarKind::Uuid))
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar(ScalarKind::String))
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar(ScalarKind::Text))
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar(ScalarKind::Integer))
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar(ScalarKind::Float))
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar(ScalarKind::Boolean))
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar(ScalarKind::Date))
    }

    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Scalar(ScalarKind::DateTime))
    }

    /// A nested single-record representation. Nested fields are read-only.
    pub fn nested(name: impl Into<String>, fields: FieldSet) -> Self {
        Self::new(name, FieldKind::Nested(fields)).read_only()
    }

    /// A nested one-to-many representation. Nested fields are read-only.
    pub fn nested_list(name: impl Into<String>, fields: FieldSet) -> Self {
        Self::new(name, FieldKind::NestedList(fields)).read_only()
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self.required = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self.required = false;
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn source(mut self, path: impl Into<String>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// The nested field set, for both single and list nesting
    pub fn nested_fields(&self) -> Option<&FieldSet> {
        match &self.kind {
            FieldKind::Nested(fields) | FieldKind::NestedList(fields) => Some(fields),
            FieldKind::Scalar(_) => None,
        }
    }

    pub fn nested_fields_mut(&mut self) -> Option<&mut FieldSet> {
        match &mut self.kind {
            FieldKind::Nested(fields) | FieldKind::NestedList(fields) => Some(fields),
            FieldKind::Scalar(_) => None,
        }
    }

    /// Scalar type, if this is a leaf field
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self.kind {
            FieldKind::Scalar(kind) => Some(kind),
            _ => None,
        }
    }

    /// Describe this field for documentation or form generation
    pub fn info(&self) -> FieldInfo {
        let field_type = match &self.kind {
            FieldKind::Scalar(kind) => kind.type_name(),
            FieldKind::Nested(_) => "NestedSerializer",
            FieldKind::NestedList(_) => "ListSerializer",
        };

        FieldInfo {
            field_type: field_type.to_string(),
            required: self.required,
            read_only: self.read_only,
            help_text: self.help_text.clone().unwrap_or_default(),
            label: self.label.clone().unwrap_or_else(|| self.name.clone()),
            max_length: self.max_length,
            min_length: self.min_length,
        }
    }

    fn render(&self, record: &Map<String, Value>) -> Value {
        let path = self.source.as_deref().unwrap_or(&self.name);
        let value = lookup_path(record, path);

        match (&self.kind, value) {
            (_, None) | (_, Some(Value::Null)) => Value::Null,
            (FieldKind::Scalar(_), Some(value)) => value.clone(),
            (FieldKind::Nested(fields), Some(value)) => fields.render(value),
            (FieldKind::NestedList(fields), Some(Value::Array(items))) => {
                Value::Array(items.iter().map(|item| fields.render(item)).collect())
            }
            (FieldKind::NestedList(_), Some(_)) => Value::Array(Vec::new()),
        }
    }
}

/// Serializable description of a field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldInfo {
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    pub read_only: bool,
    pub help_text: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
}

/// Ordered collection of named fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    fields: IndexMap<String, FieldSpec>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The base fields every persisted entity exposes
    pub fn base_model() -> Self {
        Self::new()
            .with(
                FieldSpec::uuid("id")
                    .read_only()
                    .help_text("Unique record identifier"),
            )
            .with(
                FieldSpec::boolean("is_active")
                    .read_only()
                    .help_text("Indicates if the record is active"),
            )
            .with(
                FieldSpec::boolean("is_deleted")
                    .read_only()
                    .help_text("Indicates if the record is soft deleted"),
            )
            .with(
                FieldSpec::boolean("is_deletable")
                    .read_only()
                    .help_text("Indicates if the record can be deleted"),
            )
            .with(FieldSpec::datetime("created_at").read_only())
            .with(FieldSpec::datetime("updated_at").read_only())
            .with(FieldSpec::string("created_by").read_only())
            .with(FieldSpec::string("updated_by").read_only())
    }

    /// Builder-style insert
    pub fn with(mut self, spec: FieldSpec) -> Self {
        self.insert(spec);
        self
    }

    /// Insert or replace a field, keeping the position of a replaced one
    pub fn insert(&mut self, spec: FieldSpec) {
        self.fields.insert(spec.name.clone(), spec);
    }

    /// Keep only the named fields, in the order given
    pub fn select(&self, names: &[&str]) -> Self {
        let fields = names
            .iter()
            .filter_map(|name| self.fields.get(*name))
            .map(|spec| (spec.name.clone(), spec.clone()))
            .collect();
        Self { fields }
    }

    /// Remove a field, preserving the order of the others
    pub fn remove(&mut self, name: &str) -> Option<FieldSpec> {
        self.fields.shift_remove(name)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.fields.retain(|name, _| keep(name));
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldSpec> {
        self.fields.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FieldSpec> {
        self.fields.values_mut()
    }

    /// Names of all fields currently in the set
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Information about a specific field, `None` if it is not in the set
    pub fn field_info(&self, name: &str) -> Option<FieldInfo> {
        self.fields.get(name).map(FieldSpec::info)
    }

    /// Fields accepted on input
    pub fn writable(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values().filter(|spec| !spec.read_only)
    }

    /// Render a record through this field set.
    ///
    /// Only fields present in the set are emitted. A non-object record
    /// renders as `null`.
    pub fn render(&self, record: &Value) -> Value {
        let Some(object) = record.as_object() else {
            return Value::Null;
        };

        let rendered = self
            .fields
            .values()
            .map(|spec| (spec.name.clone(), spec.render(object)))
            .collect::<Map<String, Value>>();

        Value::Object(rendered)
    }
}

impl FromIterator<FieldSpec> for FieldSet {
    fn from_iter<I: IntoIterator<Item = FieldSpec>>(iter: I) -> Self {
        let mut set = FieldSet::new();
        for spec in iter {
            set.insert(spec);
        }
        set
    }
}

fn lookup_path<'a>(record: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = record.get(first)?;

    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }

    Some(current)
}
