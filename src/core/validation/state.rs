//! Lifecycle of a single write request's validation

/// `Pending → FieldValidation → (FieldFailed | UniqueValidation) →
/// (UniqueFailed | Valid)`.
///
/// Terminal states are `FieldFailed`, `UniqueFailed` and `Valid`. A failed
/// validation is never retried; the caller has to send new input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationState {
    Pending,
    FieldValidation,
    FieldFailed,
    UniqueValidation,
    UniqueFailed,
    Valid,
}

impl ValidationState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ValidationState::FieldFailed | ValidationState::UniqueFailed | ValidationState::Valid
        )
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_advance_to(&self, next: ValidationState) -> bool {
        use ValidationState::*;
        matches!(
            (self, next),
            (Pending, FieldValidation)
                | (FieldValidation, FieldFailed)
                | (FieldValidation, UniqueValidation)
                | (UniqueValidation, UniqueFailed)
                | (UniqueValidation, Valid)
        )
    }

    /// Move to `next`, logging the transition.
    ///
    /// Illegal transitions are a programming error and panic in debug builds.
    pub fn advance(&mut self, next: ValidationState) {
        debug_assert!(
            self.can_advance_to(next),
            "illegal validation transition {:?} -> {:?}",
            self,
            next
        );
        tracing::trace!(from = ?self, to = ?next, "Validation state transition");
        *self = next;
    }
}
