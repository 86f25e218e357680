//! Projects, their members and stories

use crate::core::field_set::{FieldSet, FieldSpec};
use crate::core::integrity::UniqueGroup;
use crate::core::schema::{EntitySchema, SchemaRegistry};
use crate::core::validation::{EntityValidationConfig, validators};
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use serde_json::{Map, Value};

pub const MEMBER_ROLES: [&str; 3] = ["Manager", "BackEndDeveloper", "FrontEndDeveloper"];

pub const STORY_STATUSES: [&str; 5] = ["todo", "in_progress", "review", "done", "blocked"];

pub fn register(registry: &mut SchemaRegistry) -> Result<()> {
    registry.register(project());
    registry.register(project_member());
    registry.register(story());
    Ok(())
}

pub fn project() -> EntitySchema {
    let fields = FieldSet::base_model()
        .with(FieldSpec::string("name").max_length(100))
        .with(FieldSpec::text("description").optional())
        .with(FieldSpec::date("start_date").optional().nullable())
        .with(FieldSpec::date("end_date").optional().nullable())
        .with(FieldSpec::string("status").max_length(50).optional());

    let validation =
        EntityValidationConfig::new("project").validate_object(end_date_not_before_start);

    EntitySchema::new("project", "projects", fields).with_validation(validation)
}

/// A missing start date counts as today
fn end_date_not_before_start(data: &Map<String, Value>) -> Result<(), (String, String)> {
    let date = |field: &str| {
        data.get(field)
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    };

    let start = date("start_date").unwrap_or_else(|| Utc::now().date_naive());
    match date("end_date") {
        Some(end) if start > end => Err((
            "end_date".to_string(),
            "End date cannot be before start date".to_string(),
        )),
        _ => Ok(()),
    }
}

pub fn project_member() -> EntitySchema {
    let fields = FieldSet::base_model()
        .with(FieldSpec::uuid("project"))
        .with(FieldSpec::uuid("user"))
        .with(FieldSpec::string("role").max_length(50));

    let validation = EntityValidationConfig::new("project_member").validate(
        "role",
        validators::in_list(MEMBER_ROLES.iter().map(|r| r.to_string()).collect()),
    );

    EntitySchema::new("project_member", "project_members", fields)
        .unique_together(UniqueGroup::new(["project", "user"]))
        .with_validation(validation)
}

pub fn story() -> EntitySchema {
    let fields = FieldSet::base_model()
        .with(FieldSpec::uuid("project"))
        .with(FieldSpec::string("title").max_length(100))
        .with(FieldSpec::text("description").optional())
        .with(FieldSpec::string("status").max_length(50));

    let validation = EntityValidationConfig::new("story").validate(
        "status",
        validators::in_list(STORY_STATUSES.iter().map(|s| s.to_string()).collect()),
    );

    EntitySchema::new("story", "stories", fields).with_validation(validation)
}

/// Project with its stories and members embedded
pub fn project_detail_fields() -> FieldSet {
    project()
        .fields
        .with(FieldSpec::nested_list("stories", story().fields))
        .with(FieldSpec::nested_list(
            "project_members",
            project_member().fields,
        ))
}

/// Story with its project embedded
pub fn story_detail_fields() -> FieldSet {
    story()
        .fields
        .with(FieldSpec::nested("project", project().fields))
}
