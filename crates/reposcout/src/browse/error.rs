//! Browse controller errors.

use thiserror::Error;

use crate::github::QueryError;

#[derive(Debug, Error)]
pub enum BrowseError {
    /// The requested page cannot be reached from the current state.
    #[error("Cannot navigate to page {page}: {reason}")]
    PreconditionViolation { page: usize, reason: String },

    /// A fetch is in flight. Wait for it to complete.
    #[error("A fetch is already in progress")]
    Busy,

    #[error("No search has been submitted yet")]
    NoActiveSearch,

    #[error("Page size must be positive")]
    InvalidPageSize,

    /// The fetch reached the search backend and failed there.
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl BrowseError {
    /// Whether this error came from the search backend rather than from the
    /// controller refusing an intent.
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }
}
