//! Domain schemas of the project management system
//!
//! Each module declares the default (writable) field set of its entities,
//! their unique-together groups and validation rules, plus read views that
//! embed related records.

pub mod misc;
pub mod projects;
pub mod tickets;
pub mod users;

use crate::core::schema::SchemaRegistry;
use anyhow::Result;

/// Registry holding every domain entity
pub fn registry() -> Result<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    misc::register(&mut registry)?;
    users::register(&mut registry)?;
    projects::register(&mut registry)?;
    tickets::register(&mut registry)?;

    tracing::debug!(entities = registry.len(), "Registered domain schemas");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchemaConfig;

    #[test]
    fn test_registry_matches_default_config() {
        let mut registry = registry().unwrap();
        let config = SchemaConfig::default_config();

        assert_eq!(registry.len(), config.entities.len());
        for entity in &config.entities {
            let schema = registry.get(&entity.singular).unwrap();
            assert_eq!(schema.plural, entity.plural);
            assert_eq!(
                schema.unique_together,
                config.unique_groups_for(&entity.singular)
            );
        }

        for name in ["user", "ticket_attachment", "ticket_history"] {
            assert!(registry.get(name).is_ok(), "{name} should be registered");
        }

        registry.apply_config(&config).unwrap();
    }
}
