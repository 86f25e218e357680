//! Geography: countries, states, cities and postal addresses

use crate::core::field_set::{FieldSet, FieldSpec};
use crate::core::integrity::UniqueGroup;
use crate::core::schema::{EntitySchema, SchemaRegistry};
use crate::core::validation::{EntityValidationConfig, transforms, validators};
use anyhow::Result;
use regex::Regex;

pub fn register(registry: &mut SchemaRegistry) -> Result<()> {
    registry.register(country());
    registry.register(state());
    registry.register(city());
    registry.register(address()?);
    Ok(())
}

pub fn country() -> EntitySchema {
    let fields = FieldSet::base_model()
        .with(FieldSpec::string("name").max_length(50))
        .with(FieldSpec::string("code").max_length(10));

    let validation = EntityValidationConfig::new("country")
        .transform("code", transforms::uppercase());

    EntitySchema::new("country", "countries", fields)
        .unique_together(UniqueGroup::new(["name"]))
        .unique_together(UniqueGroup::new(["code"]))
        .with_validation(validation)
}

pub fn state() -> EntitySchema {
    let fields = FieldSet::base_model()
        .with(FieldSpec::string("name").max_length(50))
        .with(FieldSpec::string("code").max_length(10).optional())
        .with(FieldSpec::uuid("country"));

    let validation = EntityValidationConfig::new("state")
        .transform("code", transforms::uppercase());

    EntitySchema::new("state", "states", fields)
        .unique_together(UniqueGroup::new(["name", "country"]))
        .with_validation(validation)
}

pub fn city() -> EntitySchema {
    let fields = FieldSet::base_model()
        .with(FieldSpec::string("name").max_length(50))
        .with(FieldSpec::string("code").max_length(10).optional())
        .with(FieldSpec::uuid("state"));

    let validation = EntityValidationConfig::new("city")
        .transform("code", transforms::uppercase());

    EntitySchema::new("city", "cities", fields)
        .unique_together(UniqueGroup::new(["name", "state"]))
        .with_validation(validation)
}

pub fn address() -> Result<EntitySchema> {
    let fields = FieldSet::base_model()
        .with(FieldSpec::text("primary_address"))
        .with(FieldSpec::text("secondary_address").optional().nullable())
        .with(FieldSpec::string("pincode").max_length(6))
        .with(FieldSpec::uuid("city"));

    let validation = EntityValidationConfig::new("address").validate(
        "pincode",
        validators::pattern(Regex::new(r"^\d{6}$")?, "Pincode must be 6 digits"),
    );

    Ok(EntitySchema::new("address", "addresses", fields).with_validation(validation))
}

/// Country as embedded in other representations
pub fn country_summary_fields() -> FieldSet {
    FieldSet::base_model()
        .with(FieldSpec::string("name").read_only())
        .with(FieldSpec::string("code").read_only())
}

/// State with its country embedded
pub fn state_detail_fields() -> FieldSet {
    FieldSet::base_model()
        .with(FieldSpec::string("name").read_only())
        .with(FieldSpec::string("code").read_only())
        .with(FieldSpec::nested("country", country_summary_fields()))
}

/// City with its state (and that state's country) embedded
pub fn city_detail_fields() -> FieldSet {
    FieldSet::base_model()
        .with(FieldSpec::string("name").read_only())
        .with(FieldSpec::string("code").read_only())
        .with(FieldSpec::nested("state", state_detail_fields()))
}

/// Address with its city embedded
pub fn address_detail_fields() -> FieldSet {
    FieldSet::base_model()
        .with(FieldSpec::text("primary_address").read_only())
        .with(FieldSpec::text("secondary_address").read_only())
        .with(FieldSpec::string("pincode").read_only())
        .with(FieldSpec::nested("city", city_detail_fields()))
}

/// Flat address listing with the place names pulled up from the joined graph
pub fn address_list_fields() -> FieldSet {
    FieldSet::base_model()
        .with(FieldSpec::text("primary_address").read_only())
        .with(FieldSpec::text("secondary_address").read_only())
        .with(FieldSpec::string("pincode").read_only())
        .with(FieldSpec::uuid("city").read_only().source("city.id"))
        .with(FieldSpec::string("city_name").read_only().source("city.name"))
        .with(
            FieldSpec::string("state_name")
                .read_only()
                .source("city.state.name"),
        )
        .with(
            FieldSpec::string("country_name")
                .read_only()
                .source("city.state.country.name"),
        )
}
