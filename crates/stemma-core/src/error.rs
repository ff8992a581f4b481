//! Error types for stemma-core

use thiserror::Error;

/// Result type alias for stemma-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which of the two pattern strings was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Search,
    Replace,
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternKind::Search => f.write_str("search"),
            PatternKind::Replace => f.write_str("replace"),
        }
    }
}

/// Errors that can occur in stemma-core
///
/// The first group are user-input errors. They are raised before an edit
/// scope is opened, so the score is untouched when one is returned.
#[derive(Debug, Error)]
pub enum Error {
    /// Search or replace pattern is blank
    #[error("The {0} pattern is empty")]
    EmptyPattern(PatternKind),

    /// No addressable starting position
    #[error("No selection: {0}")]
    NoSelection(String),

    /// The selection spans staves where a single staff is required
    #[error("Selection spans staves {first}..={last}, but a single staff is required")]
    StaffMismatch {
        /// First selected staff
        first: usize,
        /// Last selected staff
        last: usize,
    },

    /// A staff has no playable position
    #[error("Staff {0} has no content")]
    NoContent(usize),

    /// `begin_edit` was called while another edit scope is open
    #[error("An edit is already in progress")]
    EditInProgress,

    /// `end_edit` or `rollback_edit` without an open edit scope
    #[error("No edit is in progress")]
    NoEditOpen,

    /// The operation was cancelled between two scan steps
    #[error("Operation cancelled")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Score file (de)serialization error
    #[error("Score file error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for errors caused by the user's input rather than the score or the system.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            Error::EmptyPattern(_) | Error::NoSelection(_) | Error::StaffMismatch { .. } | Error::NoContent(_)
        )
    }
}
