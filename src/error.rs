//! Error types.
//!
//! Every failing operation returns before writing any label or assignment,
//! so a caller receiving an error can retry with corrected input.

use thiserror::Error;

use crate::validation::ValidationError;

/// Result alias for grouping operations.
pub type Result<T> = std::result::Result<T, GroupingError>;

#[derive(Error, Debug)]
pub enum GroupingError {
    /// The competition document is unusable; the roster was discarded.
    #[error("invalid competition document: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// Malformed CSV text, label or activity code.
    #[error("format error: {0}")]
    Format(String),

    /// Internal bookkeeping contradicts the input (duplicate ids, mismatched
    /// group/stage configuration).
    #[error("consistency error: {0}")]
    Consistency(String),

    /// The advanced strategy was selected without a staff roster.
    #[error("no scramblers and runners: provide a staff CSV or enable auto-pick")]
    MissingStaff,

    #[error("unknown event: {0}")]
    UnknownEvent(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<csv::Error> for GroupingError {
    fn from(error: csv::Error) -> Self {
        Self::Format(format!("malformed CSV: {error}"))
    }
}

impl GroupingError {
    /// Whether the in-memory roster must be discarded and the document re-acquired.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Consistency(_))
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
