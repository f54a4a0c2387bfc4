//! reposcout - browse GitHub repository search results.
//!
//! This library searches repositories through the GitHub GraphQL API and
//! keeps the state of a paginated, sortable results table: cursor history,
//! current page, page size, sort column and selection.
//!
//! # Features
//!
//! - `github` (default) - Enables [`github::SearchClient::new`] backed by
//!   reqwest. Without it, clients are built with an explicit
//!   [`http::HttpTransport`].
//! - `test-util` - Exports [`http::MockTransport`] for integration tests.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use reposcout::{BrowseController, ClientConfig, SearchClient, SortColumn};
//!
//! let client = SearchClient::new(ClientConfig::new(token))?;
//! let mut browser = BrowseController::new(Arc::new(client));
//!
//! browser.submit_search("react").await?;
//! browser.request_sort(SortColumn::Stargazers);
//! browser.next_page().await?;
//!
//! for repo in browser.view().repos {
//!     println!("{} ({} stars)", repo.name, repo.stargazers);
//! }
//! ```

pub mod browse;
pub mod github;
pub mod http;
pub mod retry;
pub mod sort;

pub use browse::{
    BrowseController, BrowseError, BrowseEvent, BrowseState, BrowseView, Completion,
    CursorHistory, DEFAULT_PAGE_SIZE, EventCallback, PAGE_SIZE_OPTIONS, PendingFetch,
};
pub use github::{
    ClientConfig, Cursor, License, PageInfo, QueryError, RepoItem, RepoSearch, ResultPage,
    SearchClient, SearchQuery,
};
pub use retry::RetryConfig;
pub use sort::{SortColumn, SortDirection, SortKey, SortState};
