//! Page/sort controller.
//!
//! Turns user intents (search, page change, page-size change, sort, select)
//! into cursor lookups and search calls, and owns everything the results
//! table displays.
//!
//! Fetching is split in two phases. A `begin_*` call validates the intent,
//! updates the navigation state and returns a [`PendingFetch`]; the caller
//! runs the query and hands the outcome to [`BrowseController::complete`].
//! Every `begin_*` bumps a generation counter, and a completion whose
//! generation is not the latest is dropped, so a slow response can never
//! overwrite a newer one. A failed fetch rolls the navigation state back to
//! the rows still on display. The `submit_search`, `change_page` and
//! `change_page_size` helpers do both phases in one call.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::github::{PageInfo, QueryError, RepoItem, RepoSearch, ResultPage, SearchQuery, short_error_message};
use crate::sort::{SortColumn, SortState};

use super::cursor::CursorHistory;
use super::progress::{BrowseEvent, EventCallback, emit};
use super::{BrowseError, DEFAULT_PAGE_SIZE};

/// What the controller is waiting for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrowseState {
    #[default]
    Idle,
    /// First page of a new search.
    Searching,
    /// Another page, or the first page after a page-size change.
    PageLoading,
}

/// A fetch issued by a `begin_*` call and not yet completed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending fetch does nothing until it is run and completed"]
pub struct PendingFetch {
    generation: u64,
    page: usize,
    query: SearchQuery,
    rollback: Rollback,
}

/// Navigation state describing the rows on display before a `begin_*` call.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Rollback {
    page: usize,
    page_size: u32,
    term: Option<String>,
    cursors: CursorHistory,
}

impl PendingFetch {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// The parameters to send to the search backend.
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }
}

/// Outcome of [`BrowseController::complete`].
#[derive(Debug)]
pub enum Completion {
    /// The page is now displayed.
    Applied,
    /// The fetch failed; previous results are still displayed.
    Failed(QueryError),
    /// A newer fetch was issued since; nothing changed.
    Stale,
}

/// Snapshot of everything the presentation layer needs to draw.
#[derive(Debug, Clone)]
pub struct BrowseView<'a> {
    pub term: Option<&'a str>,
    /// Current page rows, in sort order.
    pub repos: Vec<&'a RepoItem>,
    pub total_count: u64,
    pub page_info: PageInfo,
    pub page: usize,
    pub page_size: u32,
    pub sort: SortState,
    pub state: BrowseState,
    pub loading: bool,
    pub error: bool,
    pub error_message: Option<&'a str>,
    pub selected: Option<&'a RepoItem>,
    pub has_results: bool,
    pub is_empty_result: bool,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

pub struct BrowseController {
    client: Arc<dyn RepoSearch>,
    cursors: CursorHistory,
    sort: SortState,
    page: usize,
    page_size: u32,
    term: Option<String>,
    results: Option<ResultPage>,
    last_error: Option<String>,
    selected: Option<RepoItem>,
    state: BrowseState,
    generation: u64,
    on_event: Option<EventCallback>,
}

impl BrowseController {
    pub fn new(client: Arc<dyn RepoSearch>) -> Self {
        Self {
            client,
            cursors: CursorHistory::new(),
            sort: SortState::default(),
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            term: None,
            results: None,
            last_error: None,
            selected: None,
            state: BrowseState::Idle,
            generation: 0,
            on_event: None,
        }
    }

    /// Report fetch progress through `callback`.
    #[must_use]
    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.on_event = Some(callback);
        self
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn state(&self) -> BrowseState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state != BrowseState::Idle
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn cursors(&self) -> &CursorHistory {
        &self.cursors
    }

    pub fn results(&self) -> Option<&ResultPage> {
        self.results.as_ref()
    }

    pub fn has_error(&self) -> bool {
        self.last_error.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn selected(&self) -> Option<&RepoItem> {
        self.selected.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ─── Intents: phase one ─────────────────────────────────────────────────

    /// Start a new search for `text` from page 0.
    pub fn begin_search(&mut self, text: impl Into<String>) -> Result<PendingFetch, BrowseError> {
        if self.is_loading() {
            return Err(BrowseError::Busy);
        }

        let rollback = self.rollback();
        let text = text.into();
        self.page = 0;
        self.cursors.reset();
        self.selected = None;
        self.term = Some(text.clone());

        let query = SearchQuery::new(text, self.page_size);
        Ok(self.issue(BrowseState::Searching, 0, query, rollback))
    }

    /// Navigate to `page` of the current search.
    pub fn begin_page(&mut self, page: usize) -> Result<PendingFetch, BrowseError> {
        let Some(term) = self.term.clone() else {
            return Err(BrowseError::NoActiveSearch);
        };
        if self.is_loading() {
            return Err(BrowseError::Busy);
        }
        if page > self.page {
            let has_next = self.results.as_ref().is_some_and(|r| r.page_info.has_next_page);
            if !has_next {
                return Err(BrowseError::PreconditionViolation {
                    page,
                    reason: "the current page is the last one".to_string(),
                });
            }
        }
        let cursor = self.cursors.cursor_for(page)?.cloned();

        let rollback = self.rollback();
        self.page = page;
        let query = SearchQuery::new(term, self.page_size).with_cursor(cursor);
        Ok(self.issue(BrowseState::PageLoading, page, query, rollback))
    }

    /// Switch to `size` rows per page and refetch from page 0.
    ///
    /// Allowed while a fetch is in flight: the in-flight fetch becomes stale.
    pub fn begin_page_size(&mut self, size: u32) -> Result<PendingFetch, BrowseError> {
        if size == 0 {
            return Err(BrowseError::InvalidPageSize);
        }
        let Some(term) = self.term.clone() else {
            return Err(BrowseError::NoActiveSearch);
        };

        let rollback = self.rollback();
        self.reset_paging(size);
        let query = SearchQuery::new(term, size);
        Ok(self.issue(BrowseState::PageLoading, 0, query, rollback))
    }

    /// Refetch the current page, typically after a failure.
    pub fn begin_reload(&mut self) -> Result<PendingFetch, BrowseError> {
        let Some(term) = self.term.clone() else {
            return Err(BrowseError::NoActiveSearch);
        };
        if self.is_loading() {
            return Err(BrowseError::Busy);
        }
        let cursor = self.cursors.cursor_for(self.page)?.cloned();
        let query = SearchQuery::new(term, self.page_size).with_cursor(cursor);
        let state = if self.page == 0 && self.results.is_none() {
            BrowseState::Searching
        } else {
            BrowseState::PageLoading
        };
        let rollback = self.rollback();
        Ok(self.issue(state, self.page, query, rollback))
    }

    /// Change the page size without fetching. Used before the first search.
    ///
    /// Once a search is active, prefer [`begin_page_size`](Self::begin_page_size).
    pub fn set_page_size(&mut self, size: u32) -> Result<(), BrowseError> {
        if size == 0 {
            return Err(BrowseError::InvalidPageSize);
        }
        if self.is_loading() {
            return Err(BrowseError::Busy);
        }
        self.reset_paging(size);
        Ok(())
    }

    fn reset_paging(&mut self, size: u32) {
        self.page_size = size;
        self.page = 0;
        self.cursors.reset();
        self.selected = None;
    }

    fn rollback(&self) -> Rollback {
        Rollback {
            page: self.page,
            page_size: self.page_size,
            term: self.term.clone(),
            cursors: self.cursors.clone(),
        }
    }

    fn issue(
        &mut self,
        state: BrowseState,
        page: usize,
        query: SearchQuery,
        rollback: Rollback,
    ) -> PendingFetch {
        self.generation += 1;
        self.state = state;

        debug!(
            generation = self.generation,
            page,
            per_page = query.per_page,
            has_cursor = query.cursor.is_some(),
            "Issuing search"
        );
        emit(
            self.on_event.as_ref(),
            BrowseEvent::FetchStarted {
                generation: self.generation,
                page,
                query: query.clone(),
            },
        );

        PendingFetch {
            generation: self.generation,
            page,
            query,
            rollback,
        }
    }

    // ─── Phase two ──────────────────────────────────────────────────────────

    /// Apply the outcome of a fetch started by a `begin_*` call.
    pub fn complete(&mut self, pending: PendingFetch, result: Result<ResultPage, QueryError>) -> Completion {
        if pending.generation != self.generation {
            warn!(
                generation = pending.generation,
                latest = self.generation,
                page = pending.page,
                "Discarding stale search response"
            );
            emit(
                self.on_event.as_ref(),
                BrowseEvent::StaleDiscarded {
                    generation: pending.generation,
                    latest: self.generation,
                },
            );
            return Completion::Stale;
        }

        self.state = BrowseState::Idle;

        match result {
            Ok(page) => {
                self.cursors.record_cursor(pending.page, page.page_info.end_cursor.as_ref());
                debug!(
                    generation = pending.generation,
                    page = pending.page,
                    count = page.repos.len(),
                    total = page.total_count,
                    has_next = page.page_info.has_next_page,
                    cursors = self.cursors.len(),
                    "Search completed"
                );
                emit(
                    self.on_event.as_ref(),
                    BrowseEvent::FetchCompleted {
                        generation: pending.generation,
                        page: pending.page,
                        count: page.repos.len(),
                        total_count: page.total_count,
                        has_next_page: page.page_info.has_next_page,
                    },
                );
                self.results = Some(page);
                self.last_error = None;
                Completion::Applied
            }
            Err(err) => {
                let message = short_error_message(&err);
                error!(
                    generation = pending.generation,
                    page = pending.page,
                    error = %err,
                    "Failed to fetch repositories"
                );
                emit(
                    self.on_event.as_ref(),
                    BrowseEvent::FetchFailed {
                        generation: pending.generation,
                        page: pending.page,
                        error: message.clone(),
                    },
                );
                // With nothing on display the intent is kept so a reload retries it.
                if self.results.is_some() {
                    let Rollback {
                        page,
                        page_size,
                        term,
                        cursors,
                    } = pending.rollback;
                    self.page = page;
                    self.page_size = page_size;
                    self.term = term;
                    self.cursors = cursors;
                }
                self.last_error = Some(message);
                Completion::Failed(err)
            }
        }
    }

    // ─── Intents: one-shot ──────────────────────────────────────────────────

    pub async fn submit_search(&mut self, text: impl Into<String>) -> Result<(), BrowseError> {
        let pending = self.begin_search(text)?;
        self.run(pending).await
    }

    pub async fn change_page(&mut self, page: usize) -> Result<(), BrowseError> {
        let pending = self.begin_page(page)?;
        self.run(pending).await
    }

    pub async fn next_page(&mut self) -> Result<(), BrowseError> {
        self.change_page(self.page + 1).await
    }

    pub async fn previous_page(&mut self) -> Result<(), BrowseError> {
        let Some(page) = self.page.checked_sub(1) else {
            return Err(BrowseError::PreconditionViolation {
                page: 0,
                reason: "already on the first page".to_string(),
            });
        };
        self.change_page(page).await
    }

    pub async fn change_page_size(&mut self, size: u32) -> Result<(), BrowseError> {
        let pending = self.begin_page_size(size)?;
        self.run(pending).await
    }

    pub async fn reload(&mut self) -> Result<(), BrowseError> {
        let pending = self.begin_reload()?;
        self.run(pending).await
    }

    async fn run(&mut self, pending: PendingFetch) -> Result<(), BrowseError> {
        let client = Arc::clone(&self.client);
        let result = client.search(pending.query()).await;
        match self.complete(pending, result) {
            Completion::Failed(err) => Err(err.into()),
            Completion::Applied | Completion::Stale => Ok(()),
        }
    }

    // ─── Local intents ──────────────────────────────────────────────────────

    /// Apply a click on a column header. Never refetches.
    pub fn request_sort(&mut self, column: SortColumn) -> SortState {
        self.sort.request(column);
        debug!(sort = %self.sort, "Sort changed");
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
    }

    /// Current page rows in display order.
    pub fn sorted_repos(&self) -> Vec<&RepoItem> {
        match &self.results {
            Some(page) => self.sort.apply(&page.repos),
            None => Vec::new(),
        }
    }

    /// Select the row with `id` on the current page.
    pub fn select_item(&mut self, id: &str) -> Option<&RepoItem> {
        let item = self
            .results
            .as_ref()
            .and_then(|page| page.repos.iter().find(|r| r.id == id))
            .cloned()?;
        self.selected = Some(item);
        self.selected.as_ref()
    }

    /// Select the `index`-th row in display order.
    pub fn select_index(&mut self, index: usize) -> Option<&RepoItem> {
        let item = self.sorted_repos().get(index).map(|r| (*r).clone())?;
        self.selected = Some(item);
        self.selected.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn view(&self) -> BrowseView<'_> {
        let loading = self.is_loading();
        let (total_count, page_info) = match &self.results {
            Some(page) => (page.total_count, page.page_info.clone()),
            None => (0, PageInfo::default()),
        };
        let shown_through = (self.page as u64 + 1).saturating_mul(u64::from(self.page_size));

        BrowseView {
            term: self.term(),
            repos: self.sorted_repos(),
            total_count,
            can_go_back: !loading && self.page > 0,
            can_go_forward: !loading
                && page_info.has_next_page
                && shown_through < total_count
                && self.cursors.can_resolve(self.page + 1),
            page_info,
            page: self.page,
            page_size: self.page_size,
            sort: self.sort,
            state: self.state,
            loading,
            error: self.has_error(),
            error_message: self.last_error(),
            selected: self.selected(),
            has_results: self.results.is_some(),
            is_empty_result: self.results.as_ref().is_some_and(ResultPage::is_empty),
        }
    }
}

impl std::fmt::Debug for BrowseController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowseController")
            .field("state", &self.state)
            .field("term", &self.term)
            .field("page", &self.page)
            .field("page_size", &self.page_size)
            .field("cursors", &self.cursors.len())
            .field("sort", &self.sort)
            .field("generation", &self.generation)
            .field("error", &self.last_error)
            .finish_non_exhaustive()
    }
}
