//! Configuration loading and management
//!
//! Entity types and their unique-together groups can be declared in YAML:
//!
//! ```yaml
//! entities:
//!   - singular: country
//!     plural: countries
//!     unique_together:
//!       - [name]
//!       - [code]
//! filtering:
//!   remove_audit: true
//! ```

use crate::core::error::ConfigError;
use crate::core::filter::FieldFilter;
use crate::core::integrity::UniqueGroup;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for an entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Singular form (e.g., "country", "ticket")
    pub singular: String,

    /// Plural form (e.g., "countries", "tickets")
    pub plural: String,

    /// Unique-together groups; when absent the schema's own declaration
    /// is kept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_together: Option<Vec<UniqueGroup>>,
}

/// Defaults applied to every representation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterDefaults {
    /// Strip audit fields unless the caller asks otherwise
    #[serde(default)]
    pub remove_audit: bool,
}

impl FilterDefaults {
    /// The filter a representation starts from
    pub fn base_filter(&self) -> FieldFilter {
        FieldFilter::new().remove_audit(self.remove_audit)
    }
}

/// Complete schema configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// List of entity configurations
    #[serde(default)]
    pub entities: Vec<EntityConfig>,

    /// Representation defaults
    #[serde(default)]
    pub filtering: FilterDefaults,
}

impl SchemaConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid config file '{}'", path.display()))?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }

    /// Find an entity declaration
    pub fn entity(&self, singular: &str) -> Option<&EntityConfig> {
        self.entities.iter().find(|e| e.singular == singular)
    }

    /// Unique groups declared for an entity type, empty if none
    pub fn unique_groups_for(&self, singular: &str) -> Vec<UniqueGroup> {
        self.entity(singular)
            .and_then(|e| e.unique_together.clone())
            .unwrap_or_default()
    }

    /// The configuration of the project management domain
    pub fn default_config() -> Self {
        let entity = |singular: &str, plural: &str, groups: Vec<Vec<&str>>| EntityConfig {
            singular: singular.to_string(),
            plural: plural.to_string(),
            unique_together: Some(groups.into_iter().map(UniqueGroup::new).collect()),
        };

        Self {
            entities: vec![
                entity("country", "countries", vec![vec!["name"], vec!["code"]]),
                entity("state", "states", vec![vec!["name", "country"]]),
                entity("city", "cities", vec![vec!["name", "state"]]),
                entity("address", "addresses", vec![]),
                entity("user", "users", vec![vec!["username"]]),
                entity("user_profile", "user_profiles", vec![vec!["user"]]),
                entity("project", "projects", vec![]),
                entity("project_member", "project_members", vec![vec!["project", "user"]]),
                entity("story", "stories", vec![]),
                entity("ticket", "tickets", vec![vec!["story", "assigned_member"]]),
                entity("ticket_comment", "ticket_comments", vec![]),
                entity("ticket_attachment", "ticket_attachments", vec![]),
                entity("ticket_history", "ticket_histories", vec![]),
            ],
            filtering: FilterDefaults::default(),
        }
    }
}
