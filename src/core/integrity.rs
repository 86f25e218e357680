//! Unique-together validation
//!
//! An entity type declares groups of fields whose combined values must be
//! unique among its active records. The [`IntegrityValidator`] checks
//! candidate values against stored records through the narrow
//! [`RecordLookup`] interface, so it works with any storage backend.
//!
//! The check is read-then-decide with no isolation against concurrent
//! writers. It exists to return a friendly error early; a real uniqueness
//! constraint in the store is still needed underneath.

use crate::core::error::{IntegrityError, StorageError};
use crate::core::field::FieldValue;
use crate::core::record::Record;
use crate::core::validation::ValidationOutcome;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// An ordered set of field names that together must be unique
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniqueGroup(Vec<String>);

impl UniqueGroup {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(Into::into).collect())
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key a conflict is reported under: the field names joined by `", "`
    pub fn error_key(&self) -> String {
        self.0.join(", ")
    }

    /// Message reported for a conflict on this group
    pub fn conflict_message(&self) -> &'static str {
        if self.0.len() == 1 {
            "This value already exists."
        } else {
            "Combination of these values already exists."
        }
    }
}

/// One equality condition of a lookup
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCriterion {
    pub field: String,
    pub value: FieldValue,
    /// Text values compare ignoring case
    pub case_insensitive: bool,
}

impl FieldCriterion {
    pub fn new(field: impl Into<String>, value: FieldValue) -> Self {
        let case_insensitive = value.is_text();
        Self {
            field: field.into(),
            value,
            case_insensitive,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        record
            .field_value(&self.field)
            .is_some_and(|stored| stored.matches(&self.value, self.case_insensitive))
    }
}

/// Conjunction of field criteria, optionally excluding one record id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupFilter {
    criteria: Vec<FieldCriterion>,
    excluding: Option<Uuid>,
}

impl LookupFilter {
    pub fn new(criteria: Vec<FieldCriterion>) -> Self {
        Self {
            criteria,
            excluding: None,
        }
    }

    /// Skip the record with this id (the record being updated)
    pub fn excluding(mut self, id: Option<Uuid>) -> Self {
        self.excluding = id;
        self
    }

    pub fn criteria(&self) -> &[FieldCriterion] {
        &self.criteria
    }

    pub fn excluded_id(&self) -> Option<Uuid> {
        self.excluding
    }

    /// Whether `record` satisfies every criterion and is not excluded.
    /// Soft-deletion is the store's concern.
    pub fn matches(&self, record: &Record) -> bool {
        self.excluding != Some(record.id) && self.criteria.iter().all(|c| c.matches(record))
    }
}

/// Repository interface the uniqueness check reads through
#[async_trait]
pub trait RecordLookup: Send + Sync {
    /// Find an active (not soft-deleted) record of `entity_type` matching
    /// `filter`. Stores should honour the filter's excluded id; the
    /// validator re-checks it either way.
    async fn find_active_by_fields(
        &self,
        entity_type: &str,
        filter: &LookupFilter,
    ) -> Result<Option<Record>, StorageError>;
}

/// Checks candidate values against an entity type's unique groups
pub struct IntegrityValidator<'a, L: RecordLookup + ?Sized> {
    lookup: &'a L,
}

impl<'a, L: RecordLookup + ?Sized> IntegrityValidator<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    /// Check every group and accumulate all conflicts.
    ///
    /// Every group must be fully resolvable from `candidate` before any
    /// query runs; otherwise this fails with an [`IntegrityError`]. A store
    /// error while checking one group is logged and that group counts as
    /// conflict-free.
    pub async fn check_unique_groups(
        &self,
        entity_type: &str,
        groups: &[UniqueGroup],
        candidate: &Map<String, Value>,
        exclude: Option<Uuid>,
    ) -> Result<ValidationOutcome, IntegrityError> {
        let lookups = groups
            .iter()
            .map(|group| build_lookup(entity_type, group, candidate).map(|l| (group, l)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut outcome = ValidationOutcome::new();

        for (group, filter) in lookups {
            let filter = filter.excluding(exclude);
            match self.lookup.find_active_by_fields(entity_type, &filter).await {
                Ok(Some(existing)) if Some(existing.id) != exclude => {
                    tracing::debug!(
                        entity_type,
                        group = %group.error_key(),
                        existing_id = %existing.id,
                        "Unique-together conflict"
                    );
                    outcome.add_once(group.error_key(), group.conflict_message());
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(
                        entity_type,
                        group = %group.error_key(),
                        error = %e,
                        "Error in unique together validation, assuming no conflict"
                    );
                }
            }
        }

        Ok(outcome)
    }
}

/// Build the lookup for one group, failing when a group field is missing
/// from the candidate values
fn build_lookup(
    entity_type: &str,
    group: &UniqueGroup,
    candidate: &Map<String, Value>,
) -> Result<LookupFilter, IntegrityError> {
    let criteria: Vec<FieldCriterion> = group
        .fields()
        .iter()
        .filter_map(|field| {
            let value = candidate.get(field)?;
            let value = FieldValue::from_json(value)?;
            Some(FieldCriterion::new(field.as_str(), value))
        })
        .collect();

    if criteria.len() != group.len() {
        let error = IntegrityError::IncompleteUniqueGroup {
            entity_type: entity_type.to_string(),
            unique_fields: group.fields().to_vec(),
            found_fields: criteria.iter().map(|c| c.field.clone()).collect(),
            expected: group.len(),
            found: criteria.len(),
        };
        tracing::warn!(entity_type, error = %error, "Data integrity fault");
        return Err(error);
    }

    Ok(LookupFilter::new(criteria))
}
