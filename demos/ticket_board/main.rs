//! Ticket Board Example
//!
//! Walks through the write and read paths of the framework:
//! - Validated creates with audit stamping
//! - A case-insensitive unique-together conflict
//! - Filtered representations (allow-list, deny-list, audit stripping)
//!
//! Set `PMS_SCHEMA_CONFIG` to a YAML file to override the built-in
//! unique-together groups, and `RUST_LOG=pms=debug` to watch the pipeline.

use anyhow::Result;
use chrono::{Duration, Utc};
use pms::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match std::env::var("PMS_SCHEMA_CONFIG") {
        Ok(path) => SchemaConfig::from_yaml_file(path)?,
        Err(_) => SchemaConfig::default_config(),
    };

    let mut registry = pms::entities::registry()?;
    registry.apply_config(&config)?;
    let store = InMemoryRecordStore::new();

    println!("📦 Entities: {:?}", registry.entity_types());

    // Geography
    let country = ModelSerializer::new(registry.get("country")?, FieldFilter::new())
        .with_actor("admin")
        .validate_and_save(json!({"name": "India", "code": "in"}), &store)
        .await?;
    println!("\n🌍 Created country {} ({})", country.values["name"], country.values["code"]);

    // A second "india" collides with the first, whatever the casing
    let duplicate = ModelSerializer::new(registry.get("country")?, FieldFilter::new())
        .validate(json!({"name": "INDIA", "code": "IND"}), &store)
        .await?;
    println!("❌ Duplicate rejected ({:?}): {}", duplicate.state(), duplicate.errors());

    // Project, member, story and ticket
    let project = save(
        &registry,
        &store,
        "project",
        json!({"name": "Apollo", "description": "Moonshot", "status": "active"}),
    )
    .await?;

    let member = save(
        &registry,
        &store,
        "project_member",
        json!({"project": project.id, "user": Uuid::new_v4(), "role": "Manager"}),
    )
    .await?;

    let story = save(
        &registry,
        &store,
        "story",
        json!({"project": project.id, "title": "Launch", "status": "todo"}),
    )
    .await?;

    let due = (Utc::now() + Duration::days(7)).date_naive();
    let ticket = save(
        &registry,
        &store,
        "ticket",
        json!({
            "story": story.id,
            "title": "Fuel check",
            "description": "Verify tanks",
            "assigned_member": member.id,
            "status": "open",
            "priority": "high",
            "type": "task",
            "due_date": due.format("%Y-%m-%d").to_string(),
        }),
    )
    .await?;

    // Read paths over the joined graph
    let graph = json!({
        "id": ticket.id,
        "title": ticket.values["title"],
        "status": ticket.values["status"],
        "created_at": ticket.created_at,
        "story": story.to_json(),
        "comments": [],
    });

    let params = FilterParams {
        fields: Some("id,title,story.title,story.status".into()),
        remove_audit: Some(true),
        ..Default::default()
    };
    let view = ModelSerializer::with_fields(
        registry.get("ticket")?,
        pms::entities::tickets::ticket_detail_fields(),
        params.into_filter_with(&config.filtering),
    );
    println!("\n🎫 Ticket (allow-list, no audit):");
    println!("{}", serde_json::to_string_pretty(&view.represent(&graph))?);

    let params = FilterParams {
        exclude: Some("description,story.project,comments".into()),
        ..Default::default()
    };
    let view = ModelSerializer::with_fields(
        registry.get("ticket")?,
        pms::entities::tickets::ticket_detail_fields(),
        params.into_filter(),
    );
    println!("\n🎫 Ticket (deny-list):");
    println!("{}", serde_json::to_string_pretty(&view.represent(&graph))?);

    Ok(())
}

async fn save(
    registry: &SchemaRegistry,
    store: &InMemoryRecordStore,
    entity_type: &str,
    payload: Value,
) -> Result<Record> {
    let record = ModelSerializer::new(registry.get(entity_type)?, FieldFilter::new())
        .with_actor("admin")
        .validate_and_save(payload, store)
        .await?;
    println!("✅ Created {} {}", entity_type, record.id);
    Ok(record)
}
