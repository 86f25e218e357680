//! Dynamic field filtering
//!
//! Callers narrow a representation with three directives:
//!
//! - an allow-list of dotted paths (`["id", "user.profile.name"]`) that keeps
//!   only the named fields, recursing into nested representations
//! - a deny-list of dotted paths that removes the named fields
//! - a flag that strips the audit metadata fields at every nesting level
//!
//! The directives are always applied in that order. Paths that do not match
//! any field are ignored.
//!
//! ```rust,ignore
//! let filter = FieldFilter::new()
//!     .allow(["id", "user.name"])
//!     .remove_audit(true);
//! let fields = filter.apply(schema.fields.clone());
//! ```

use crate::core::field_set::FieldSet;
use indexmap::IndexMap;
use serde_json::Value;

/// Audit metadata attached to every persisted entity
pub const AUDIT_FIELDS: [&str; 4] = ["created_at", "updated_at", "created_by", "updated_by"];

/// A compiled set of dotted field paths.
///
/// `["id", "user.profile.name"]` compiles to
/// `{id: {}, user: {profile: {name: {}}}}`. An empty subtree means the path
/// ends at that field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterTree {
    children: IndexMap<String, FilterTree>,
}

impl FilterTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a list of dotted paths.
    ///
    /// Empty or whitespace-only segments are dropped, so `"user..name"`
    /// compiles like `"user.name"` and `"  "` contributes nothing.
    pub fn compile<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::new();
        for path in paths {
            tree.insert_path(path.as_ref());
        }
        tree
    }

    /// Compile from a JSON list, skipping entries that are not non-empty
    /// strings. Anything other than an array compiles to an empty tree.
    pub fn from_json(value: &Value) -> Self {
        let Some(items) = value.as_array() else {
            return Self::new();
        };

        Self::compile(
            items
                .iter()
                .filter_map(Value::as_str)
                .filter(|path| !path.is_empty()),
        )
    }

    fn insert_path(&mut self, path: &str) {
        let mut current = self;
        for segment in path.split('.') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            current = current.children.entry(segment.to_string()).or_default();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&FilterTree> {
        self.children.get(name)
    }

    /// Top-level names, in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterTree)> {
        self.children.iter().map(|(name, tree)| (name.as_str(), tree))
    }
}

/// Filter directives for one representation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFilter {
    allowed: FilterTree,
    removed: FilterTree,
    remove_audit: bool,
}

impl FieldFilter {
    /// A filter that leaves every field in place
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the allow-list from dotted paths
    pub fn allow<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed = FilterTree::compile(paths);
        self
    }

    /// Set the deny-list from dotted paths
    pub fn remove<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.removed = FilterTree::compile(paths);
        self
    }

    pub fn with_allowed(mut self, tree: FilterTree) -> Self {
        self.allowed = tree;
        self
    }

    pub fn with_removed(mut self, tree: FilterTree) -> Self {
        self.removed = tree;
        self
    }

    pub fn remove_audit(mut self, remove: bool) -> Self {
        self.remove_audit = remove;
        self
    }

    pub fn allowed(&self) -> &FilterTree {
        &self.allowed
    }

    pub fn removed(&self) -> &FilterTree {
        &self.removed
    }

    pub fn strips_audit(&self) -> bool {
        self.remove_audit
    }

    /// True when applying this filter cannot change a field set
    pub fn is_noop(&self) -> bool {
        self.allowed.is_empty() && self.removed.is_empty() && !self.remove_audit
    }

    /// Apply allow-list, then deny-list, then the audit strip
    pub fn apply(&self, mut fields: FieldSet) -> FieldSet {
        let before = fields.len();

        apply_allowed(&mut fields, &self.allowed);
        apply_removed(&mut fields, &self.removed);
        if self.remove_audit {
            strip_audit(&mut fields);
        }

        tracing::debug!(
            before,
            after = fields.len(),
            remove_audit = self.remove_audit,
            "Applied field filter"
        );

        fields
    }
}

/// Keep only the fields named in `tree`, recursing into nested
/// representations for entries with a non-empty subtree.
///
/// An empty tree leaves the set untouched.
pub fn apply_allowed(fields: &mut FieldSet, tree: &FilterTree) {
    if tree.is_empty() {
        return;
    }

    fields.retain(|name| tree.contains(name));

    for (name, subtree) in tree.iter() {
        if subtree.is_empty() {
            continue;
        }
        if let Some(nested) = fields.get_mut(name).and_then(|spec| spec.nested_fields_mut()) {
            apply_allowed(nested, subtree);
        }
    }
}

/// Remove the fields named in `tree`.
///
/// A name with an empty subtree removes the whole field. A name with a
/// non-empty subtree keeps the field and prunes inside its nested
/// representation instead. A scalar field addressed with a subtree is left
/// alone.
pub fn apply_removed(fields: &mut FieldSet, tree: &FilterTree) {
    for (name, subtree) in tree.iter() {
        if subtree.is_empty() {
            fields.remove(name);
        } else if let Some(nested) = fields.get_mut(name).and_then(|spec| spec.nested_fields_mut())
        {
            apply_removed(nested, subtree);
        }
    }
}

/// Remove [`AUDIT_FIELDS`] from the set and from every nested set below it
pub fn strip_audit(fields: &mut FieldSet) {
    for name in AUDIT_FIELDS {
        fields.remove(name);
    }

    for spec in fields.iter_mut() {
        if let Some(nested) = spec.nested_fields_mut() {
            strip_audit(nested);
        }
    }
}
