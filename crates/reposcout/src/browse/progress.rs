//! Progress events emitted by the browse controller.

use crate::github::SearchQuery;

/// What the controller is doing, for spinners and log lines.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum BrowseEvent {
    /// A fetch was issued.
    FetchStarted {
        generation: u64,
        /// Zero-based page being fetched.
        page: usize,
        query: SearchQuery,
    },

    /// A fetch completed and its page is now displayed.
    FetchCompleted {
        generation: u64,
        page: usize,
        /// Rows on the page.
        count: usize,
        total_count: u64,
        has_next_page: bool,
    },

    /// A fetch failed. Previous results stay on screen.
    FetchFailed {
        generation: u64,
        page: usize,
        error: String,
    },

    /// A response arrived after a newer request was issued and was dropped.
    StaleDiscarded { generation: u64, latest: u64 },
}

/// Callback for browse progress updates.
pub type EventCallback = Box<dyn Fn(BrowseEvent) + Send + Sync>;

/// Emit an event if a callback is provided.
#[inline]
pub fn emit(on_event: Option<&EventCallback>, event: BrowseEvent) {
    if let Some(cb) = on_event {
        cb(event);
    }
}
