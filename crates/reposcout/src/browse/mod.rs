//! Result browsing: cursor history, page/sort controller, progress events.

mod controller;
mod cursor;
mod error;
mod progress;

pub use controller::{BrowseController, BrowseState, BrowseView, Completion, PendingFetch};
pub use cursor::CursorHistory;
pub use error::BrowseError;
pub use progress::{BrowseEvent, EventCallback, emit};

/// Rows per page until the user picks another size.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page sizes offered by the interactive table.
pub const PAGE_SIZE_OPTIONS: [u32; 3] = [10, 25, 100];
