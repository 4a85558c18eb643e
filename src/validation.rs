//! Input validation for competition documents.
//!
//! Checks structural integrity of the document before a roster is built.
//! Detects:
//! - Missing events or persons
//! - Events without rounds
//! - Duplicate activity IDs
//! - Unparsable activity codes
//!
//! Any detected issue is fatal for the current roster: the caller must
//! re-acquire the document after fixing it upstream.

use std::collections::HashSet;

use crate::models::Competition;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The document defines no events.
    NoEvents,
    /// The document has no (accepted) persons.
    NoCompetitors,
    /// An event has no rounds.
    NoRounds,
    /// Two activities share the same ID.
    DuplicateActivityId,
    /// An event activity carries a malformed activity code.
    InvalidActivityCode,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a competition document.
///
/// Checks:
/// 1. At least one event
/// 2. At least one person
/// 3. Every event has at least one round
/// 4. No duplicate activity IDs (round-level and child activities)
/// 5. Every non-`other` activity code parses
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_document(competition: &Competition) -> ValidationResult {
    let mut errors = Vec::new();

    if competition.events.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoEvents,
            "No events found; define all rounds and the schedule first",
        ));
    }

    if competition.persons.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoCompetitors,
            "No competitors found; registration may not be open yet",
        ));
    }

    for event in &competition.events {
        if event.rounds.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::NoRounds,
                format!("No rounds found for {}", event.id),
            ));
        }
    }

    let mut activity_ids = HashSet::new();
    for activity in competition.schedule.all_activities() {
        if !activity_ids.insert(activity.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateActivityId,
                format!("Duplicate activity ID: {}", activity.id),
            ));
        }
        if !activity.is_other() && activity.code().is_err() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidActivityCode,
                format!(
                    "Activity {} has invalid code '{}'",
                    activity.id, activity.activity_code
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
