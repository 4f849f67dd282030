//! Form elements driven by the hosting form engine.
//!
//! The host renders every element, validates the whole submission, and only when no element
//! reports a [`FieldError`] applies the submission element by element.

pub mod encounter_detail;

pub use encounter_detail::{EncounterDetailElement, EncounterPart};

use crate::constants::{MSG_CANNOT_BE_IN_FUTURE, MSG_INVALID_DATE, MSG_INVALID_TIME, MSG_REQUIRED};
use crate::context::{FormEntryContext, FormEntrySession, Submission};
use crate::services::{FormEntryServices, MessageSource};
use crate::FormResult;
use formentry_types::FieldName;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    Required,
    CannotBeInFuture,
    InvalidDate,
    InvalidTime,
}

impl ValidationErrorKind {
    pub fn message_key(self) -> &'static str {
        match self {
            ValidationErrorKind::Required => MSG_REQUIRED,
            ValidationErrorKind::CannotBeInFuture => MSG_CANNOT_BE_IN_FUTURE,
            ValidationErrorKind::InvalidDate => MSG_INVALID_DATE,
            ValidationErrorKind::InvalidTime => MSG_INVALID_TIME,
        }
    }
}

/// A rejected submitted value, addressed to an error indicator field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: FieldName,
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &FieldName, kind: ValidationErrorKind, messages: &dyn MessageSource) -> Self {
        Self {
            field: field.clone(),
            kind,
            message: messages.message(kind.message_key()),
        }
    }
}

/// A part of a form that the host renders, validates and applies as a unit.
pub trait FormElement {
    /// Produces the element's markup for the context's mode.
    ///
    /// Rendering may register client-side property accessors on `context`, which is why it
    /// takes the context mutably. Validation errors recorded on the context with
    /// [`FormEntryContext::record_errors`] are shown by the element's error indicators.
    fn render(&self, context: &mut FormEntryContext) -> String;

    /// Checks the submitted values without changing anything.
    ///
    /// # Returns
    ///
    /// One [`FieldError`] per rejected group, addressed to that group's error indicator.
    /// An empty vector means the submission is acceptable for this element.
    fn validate(&self, submission: &Submission, services: &FormEntryServices<'_>)
        -> Vec<FieldError>;

    /// Writes accepted values onto the session. Only called once the whole form validated.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormError::InvalidSubmission`] if a value that validation would have
    /// rejected is applied anyway.
    fn apply_submission(
        &self,
        session: &mut FormEntrySession,
        submission: &Submission,
        services: &FormEntryServices<'_>,
    ) -> FormResult<()>;
}
