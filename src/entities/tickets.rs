//! Tickets, their comments with attachments, and change history

use crate::core::field_set::{FieldSet, FieldSpec};
use crate::core::integrity::UniqueGroup;
use crate::core::schema::{EntitySchema, SchemaRegistry};
use crate::core::validation::{EntityValidationConfig, NON_FIELD_ERRORS, validators};
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use serde_json::Value;

pub fn register(registry: &mut SchemaRegistry) -> Result<()> {
    registry.register(ticket());
    registry.register(ticket_comment());
    registry.register(ticket_attachment());
    registry.register(ticket_history());
    Ok(())
}

pub fn ticket() -> EntitySchema {
    let fields = FieldSet::base_model()
        .with(FieldSpec::uuid("story"))
        .with(FieldSpec::string("title").max_length(100))
        .with(FieldSpec::text("description"))
        .with(FieldSpec::uuid("assigned_member"))
        .with(FieldSpec::string("status").max_length(50))
        .with(FieldSpec::string("priority").max_length(50))
        .with(FieldSpec::string("type").max_length(50))
        .with(FieldSpec::date("due_date"));

    let validation = EntityValidationConfig::new("ticket").validate_object(|data| {
        let due = data
            .get("due_date")
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
        match due {
            Some(due) if due < Utc::now().date_naive() => Err((
                NON_FIELD_ERRORS.to_string(),
                "Due date should be >= today's date".to_string(),
            )),
            _ => Ok(()),
        }
    });

    EntitySchema::new("ticket", "tickets", fields)
        .unique_together(UniqueGroup::new(["story", "assigned_member"]))
        .with_validation(validation)
}

pub fn ticket_comment() -> EntitySchema {
    let fields = FieldSet::base_model()
        .with(FieldSpec::uuid("ticket"))
        .with(FieldSpec::text("message"));

    let validation = EntityValidationConfig::new("ticket_comment")
        .validate("message", validators::required())
        .validate("message", validators::not_blank());

    EntitySchema::new("ticket_comment", "ticket_comments", fields).with_validation(validation)
}

/// File uploaded with a comment, stored as a path under `ticket_attachments/`
pub fn ticket_attachment() -> EntitySchema {
    let fields = FieldSet::base_model()
        .with(FieldSpec::uuid("comment"))
        .with(FieldSpec::string("file").max_length(100));

    let validation = EntityValidationConfig::new("ticket_attachment")
        .validate("file", validators::required())
        .validate("file", validators::not_blank());

    EntitySchema::new("ticket_attachment", "ticket_attachments", fields)
        .with_validation(validation)
}

/// One recorded change of a ticket field
pub fn ticket_history() -> EntitySchema {
    let fields = FieldSet::base_model()
        .with(FieldSpec::uuid("ticket"))
        .with(FieldSpec::string("field_changed").max_length(50))
        .with(FieldSpec::string("old_value").max_length(100))
        .with(FieldSpec::string("new_value").max_length(100));

    EntitySchema::new("ticket_history", "ticket_histories", fields)
}

/// Comment with its attachments embedded
pub fn ticket_comment_detail_fields() -> FieldSet {
    ticket_comment()
        .fields
        .with(FieldSpec::nested_list("attachments", ticket_attachment().fields))
}

/// Ticket with its story, comments and history embedded
pub fn ticket_detail_fields() -> FieldSet {
    ticket()
        .fields
        .with(FieldSpec::nested(
            "story",
            super::projects::story_detail_fields(),
        ))
        .with(FieldSpec::nested_list("comments", ticket_comment_detail_fields()))
        .with(FieldSpec::nested_list("histories", ticket_history().fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn due(date: NaiveDate) -> serde_json::Map<String, Value> {
        json!({"due_date": date.format("%Y-%m-%d").to_string()})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_due_date_not_in_past() {
        let today = Utc::now().date_naive();
        let schema = ticket();

        let mut data = due(today - Duration::days(1));
        let outcome = schema.validation.validate_and_transform(&mut data);
        assert_eq!(
            outcome.get(NON_FIELD_ERRORS),
            Some(&["Due date should be >= today's date".to_string()][..])
        );

        let mut data = due(today + Duration::days(1));
        assert!(schema.validation.validate_and_transform(&mut data).is_valid());
    }

    #[test]
    fn test_comment_message_not_blank() {
        let mut data = json!({"message": "  "}).as_object().cloned().unwrap();
        let outcome = ticket_comment().validation.validate_and_transform(&mut data);
        assert!(outcome.contains("message"));
    }

    #[test]
    fn test_history_values_are_bounded() {
        let fields = ticket_history().fields;
        let names = fields.field_names();
        assert_eq!(
            &names[names.len() - 4..],
            &["ticket", "field_changed", "old_value", "new_value"]
        );
        let info = fields.get("field_changed").unwrap().info();
        assert_eq!(info.max_length, Some(50));
        let info = fields.get("new_value").unwrap().info();
        assert_eq!(info.max_length, Some(100));
    }

    #[test]
    fn test_attachment_file_required() {
        let mut data = json!({"file": " "}).as_object().cloned().unwrap();
        let outcome = ticket_attachment().validation.validate_and_transform(&mut data);
        assert!(outcome.contains("file"));

        let mut data = json!({"file": "ticket_attachments/trace.log"})
            .as_object()
            .cloned()
            .unwrap();
        assert!(ticket_attachment().validation.validate_and_transform(&mut data).is_valid());
    }

    #[test]
    fn test_comment_detail_nests_attachments() {
        let graph = json!({
            "id": "c1",
            "ticket": "t1",
            "message": "see log",
            "attachments": [{"id": "a1", "comment": "c1", "file": "ticket_attachments/trace.log"}]
        });
        let rendered = ticket_comment_detail_fields().render(&graph);
        assert_eq!(
            rendered["attachments"][0]["file"],
            json!("ticket_attachments/trace.log")
        );

        let detail = ticket_detail_fields();
        let comments = detail.get("comments").and_then(|c| c.nested_fields()).unwrap();
        assert!(comments.get("attachments").is_some());
        assert!(detail.get("histories").is_some());
    }

    #[test]
    fn test_detail_embeds_story_replacing_the_id_field() {
        let fields = ticket_detail_fields();
        let names = fields.field_names();
        assert_eq!(names.iter().filter(|n| **n == "story").count(), 1);
        assert!(fields.get("story").and_then(|s| s.nested_fields()).is_some());
        assert!(names.contains(&"comments"));
    }
}
