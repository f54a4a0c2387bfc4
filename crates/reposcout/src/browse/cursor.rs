//! Cursor history for forward/backward navigation over a cursor-paginated
//! result set.
//!
//! `history[i]` is the end cursor returned for page `i`, which is the `after`
//! argument needed to fetch page `i + 1`. Page 0 never needs a cursor.

use crate::github::Cursor;

use super::BrowseError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorHistory {
    cursors: Vec<Cursor>,
}

impl CursorHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `after` cursor required to fetch `page`.
    ///
    /// Page 0 resolves to `None`. Any other page needs the end cursor of the
    /// page before it to have been recorded already.
    pub fn cursor_for(&self, page: usize) -> Result<Option<&Cursor>, BrowseError> {
        if page == 0 {
            return Ok(None);
        }
        self.cursors
            .get(page - 1)
            .map(Some)
            .ok_or(BrowseError::PreconditionViolation {
                page,
                reason: format!(
                    "no cursor recorded for page {} ({} known)",
                    page - 1,
                    self.cursors.len()
                ),
            })
    }

    /// Whether [`cursor_for`](Self::cursor_for) would succeed for `page`.
    pub fn can_resolve(&self, page: usize) -> bool {
        page <= self.cursors.len()
    }

    /// Record the end cursor returned for `page`.
    ///
    /// Page 0 starts a fresh history. Later pages only extend the history on
    /// the first visit to a new highest page; revisits leave it as is. A
    /// missing cursor is never recorded.
    pub fn record_cursor(&mut self, page: usize, end_cursor: Option<&Cursor>) {
        let Some(cursor) = end_cursor else {
            return;
        };
        if page == 0 {
            self.cursors.clear();
            self.cursors.push(cursor.clone());
        } else if page == self.cursors.len() {
            self.cursors.push(cursor.clone());
        }
    }

    pub fn reset(&mut self) {
        self.cursors.clear();
    }

    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }
}
