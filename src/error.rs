use thiserror::Error;

use crate::storage::DatabaseError;

/// Errors surfaced to the user by navigation commands.
///
/// None of these are fatal; the host shows the message and keeps going.
#[derive(Debug, Error)]
pub enum NavError {
    /// An id or reference did not match any child of the current page
    #[error("{0}")]
    NotFound(String),

    /// next/prev-article stepped past either end of the list
    #[error("Already the {0} article")]
    Boundary(&'static str),

    /// The command does not apply to the current stack
    #[error("{0}")]
    InvalidState(String),

    /// Reading or writing the newsboat database failed
    #[error(transparent)]
    Store(#[from] DatabaseError),

    /// Unrecognized verb
    #[error("Not yet mapped: {0}")]
    Unmapped(String),

    /// The host view could not be updated
    #[error("View update failed: {0}")]
    View(#[from] std::io::Error),
}

impl NavError {
    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        NavError::NotFound(what.into())
    }

    pub(crate) fn invalid(what: impl Into<String>) -> Self {
        NavError::InvalidState(what.into())
    }
}
