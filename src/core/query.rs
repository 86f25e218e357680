//! Filter directives taken from query parameters

use crate::config::FilterDefaults;
use crate::core::filter::{FieldFilter, FilterTree};
use serde::Deserialize;

/// Query parameters that shape a representation
///
/// # Example
/// ```rust,ignore
/// // In handler:
/// pub async fn get_ticket(
///     Query(params): Query<FilterParams>,
/// ) -> Json<Value> {
///     let serializer = ModelSerializer::new(schema, params.into_filter());
///     ...
/// }
///
/// // Usage:
/// GET /tickets/42?fields=id,title,story.title
/// GET /tickets/42?exclude=comments&remove_audit=true
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Comma-separated allow-list of dotted field paths
    pub fields: Option<String>,

    /// Comma-separated deny-list of dotted field paths
    pub exclude: Option<String>,

    /// Strip audit fields at every level. Falls back to the configured
    /// default when absent.
    pub remove_audit: Option<bool>,
}

impl FilterParams {
    /// Compiled allow-list
    pub fn allowed(&self) -> FilterTree {
        FilterTree::compile(split_paths(self.fields.as_deref()))
    }

    /// Compiled deny-list
    pub fn removed(&self) -> FilterTree {
        FilterTree::compile(split_paths(self.exclude.as_deref()))
    }

    /// Build the field filter these parameters describe
    pub fn into_filter(self) -> FieldFilter {
        self.into_filter_with(&FilterDefaults::default())
    }

    /// Build the field filter, using `defaults` for anything not given
    pub fn into_filter_with(self, defaults: &FilterDefaults) -> FieldFilter {
        defaults
            .base_filter()
            .with_allowed(self.allowed())
            .with_removed(self.removed())
            .remove_audit(self.remove_audit.unwrap_or(defaults.remove_audit))
    }
}

fn split_paths(raw: Option<&str>) -> Vec<&str> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    })
    .unwrap_or_default()
}
