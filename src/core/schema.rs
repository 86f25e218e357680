//! Entity schemas and the registry that holds them

use crate::config::SchemaConfig;
use crate::core::error::{ConfigError, EntityError};
use crate::core::field_set::FieldSet;
use crate::core::integrity::UniqueGroup;
use crate::core::validation::EntityValidationConfig;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything the serializer layer knows about one entity type.
///
/// Declared once at initialisation and read-only afterwards.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    /// Singular type name (e.g. "country")
    pub entity_type: String,

    /// Plural form (e.g. "countries")
    pub plural: String,

    /// The default field set of the read representation
    pub fields: FieldSet,

    /// Field groups that must be unique among active records
    pub unique_together: Vec<UniqueGroup>,

    /// Transforms and validators for submitted values
    pub validation: EntityValidationConfig,
}

impl EntitySchema {
    pub fn new(entity_type: impl Into<String>, plural: impl Into<String>, fields: FieldSet) -> Self {
        let entity_type = entity_type.into();
        Self {
            validation: EntityValidationConfig::new(entity_type.clone()),
            entity_type,
            plural: plural.into(),
            fields,
            unique_together: Vec::new(),
        }
    }

    pub fn unique_together(mut self, group: UniqueGroup) -> Self {
        self.unique_together.push(group);
        self
    }

    pub fn with_validation(mut self, validation: EntityValidationConfig) -> Self {
        self.validation = validation;
        self
    }

    /// Names of fields a group may reference: everything declared at the
    /// top level of the field set
    pub fn declares_field(&self, name: &str) -> bool {
        self.fields.contains(name)
    }
}

/// Registry of all entity schemas in the application
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<EntitySchema>>,
}

impl SchemaRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// Register a schema under its entity type name, replacing any earlier one
    pub fn register(&mut self, schema: EntitySchema) {
        tracing::debug!(entity_type = %schema.entity_type, "Registered entity schema");
        self.schemas
            .insert(schema.entity_type.clone(), Arc::new(schema));
    }

    pub fn get(&self, entity_type: &str) -> Result<Arc<EntitySchema>, EntityError> {
        self.schemas
            .get(entity_type)
            .cloned()
            .ok_or_else(|| EntityError::UnknownType {
                entity_type: entity_type.to_string(),
            })
    }

    /// Look a schema up by its plural name
    pub fn get_by_plural(&self, plural: &str) -> Option<Arc<EntitySchema>> {
        self.schemas.values().find(|s| s.plural == plural).cloned()
    }

    /// Get all registered entity types, sorted
    pub fn entity_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Apply a configuration's entity declarations.
    ///
    /// For each configured entity the plural name is set and, when the
    /// entry declares `unique_together`, its groups replace the schema's.
    /// Nothing is changed unless the whole configuration is valid.
    pub fn apply_config(&mut self, config: &SchemaConfig) -> Result<(), ConfigError> {
        let mut updated = Vec::with_capacity(config.entities.len());

        for entity in &config.entities {
            let schema = self
                .schemas
                .get(&entity.singular)
                .ok_or_else(|| ConfigError::UnknownEntity {
                    entity_type: entity.singular.clone(),
                })?;

            let mut schema = EntitySchema::clone(schema);
            schema.plural = entity.plural.clone();

            if let Some(groups) = &entity.unique_together {
                for group in groups {
                    check_group(&schema, group)?;
                }
                schema.unique_together = groups.clone();
            }

            updated.push(schema);
        }

        for schema in updated {
            self.register(schema);
        }

        Ok(())
    }
}

fn check_group(schema: &EntitySchema, group: &UniqueGroup) -> Result<(), ConfigError> {
    let field = format!("{}.unique_together", schema.entity_type);

    if group.is_empty() {
        return Err(ConfigError::InvalidValue {
            field,
            message: "unique group must name at least one field".to_string(),
        });
    }

    if let Some(unknown) = group.fields().iter().find(|f| !schema.declares_field(f)) {
        return Err(ConfigError::InvalidValue {
            field,
            message: format!("'{}' is not a field of {}", unknown, schema.entity_type),
        });
    }

    Ok(())
}
