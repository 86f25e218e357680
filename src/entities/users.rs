//! Accounts and user profiles

use crate::core::field_set::{FieldSet, FieldSpec};
use crate::core::integrity::UniqueGroup;
use crate::core::schema::{EntitySchema, SchemaRegistry};
use crate::core::validation::{EntityValidationConfig, transforms, validators};
use anyhow::Result;
use regex::Regex;

pub fn register(registry: &mut SchemaRegistry) -> Result<()> {
    registry.register(user());
    registry.register(user_profile()?);
    Ok(())
}

/// Login account; profiles reference it through `user`
pub fn user() -> EntitySchema {
    let fields = FieldSet::base_model()
        .with(FieldSpec::string("username").max_length(150))
        .with(FieldSpec::string("email").max_length(254).optional());

    let validation = EntityValidationConfig::new("user")
        .transform("email", transforms::lowercase())
        .validate("email", validators::email());

    EntitySchema::new("user", "users", fields)
        .unique_together(UniqueGroup::new(["username"]))
        .with_validation(validation)
}

pub fn user_profile() -> Result<EntitySchema> {
    let fields = FieldSet::base_model()
        .with(FieldSpec::uuid("user").help_text("Account the profile belongs to"))
        .with(FieldSpec::string("first_name").max_length(50))
        .with(FieldSpec::string("last_name").max_length(50).optional())
        .with(FieldSpec::date("dob").optional().nullable().label("Date of birth"))
        .with(FieldSpec::string("contact_number").max_length(15).optional())
        .with(FieldSpec::uuid("address").optional().nullable());

    let validation = EntityValidationConfig::new("user_profile")
        .validate(
            "contact_number",
            validators::pattern(
                Regex::new(r"^\+?\d{10,14}$")?,
                "Enter a valid contact number.",
            ),
        )
        .validate("dob", validators::date_format("%Y-%m-%d"));

    Ok(EntitySchema::new("user_profile", "user_profiles", fields)
        .unique_together(UniqueGroup::new(["user"]))
        .with_validation(validation))
}

/// Profile read view over a graph with the account embedded under `user`
pub fn user_profile_view_fields() -> FieldSet {
    FieldSet::base_model()
        .with(FieldSpec::uuid("user").read_only().source("user.id"))
        .with(
            FieldSpec::string("username")
                .read_only()
                .source("user.username"),
        )
        .with(FieldSpec::string("email").read_only().source("user.email"))
        .with(FieldSpec::string("first_name").read_only())
        .with(FieldSpec::string("last_name").read_only())
        .with(FieldSpec::date("dob").read_only())
        .with(FieldSpec::string("contact_number").read_only())
        .with(FieldSpec::nested(
            "address",
            super::misc::address_detail_fields(),
        ))
}
