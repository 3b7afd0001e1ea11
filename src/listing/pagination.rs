//! Cursor history for bidirectional paging over a forward-only API
//!
//! The backend only knows how to resume *after* a cursor. To go back, the
//! stack remembers the cursor that produced every page on the way here, so
//! the previous page can be replayed by fetching from the cursor below the
//! top.

use crate::types::Cursor;

/// Ordered history of page-start cursors.
///
/// Index 0 is always `None` (the first page) and the length is the 1-based
/// number of the page currently displayed. `version` increases on every
/// mutation so callers can tell two snapshots apart even when they hold the
/// same cursors.
#[derive(Debug, Clone)]
pub struct PageStack {
    cursors: Vec<Option<Cursor>>,
    version: u64,
}

impl Default for PageStack {
    fn default() -> Self {
        Self::new()
    }
}

impl PageStack {
    pub fn new() -> Self {
        Self {
            cursors: vec![None],
            version: 0,
        }
    }

    /// Back to the first page
    pub fn reset(&mut self) {
        self.cursors.truncate(1);
        self.cursors[0] = None;
        self.version += 1;
    }

    /// Record the cursor that fetches the next page and make it current
    pub fn advance(&mut self, next: Cursor) {
        self.cursors.push(Some(next));
        self.version += 1;
    }

    /// Drop the current page. Returns `false` (and changes nothing) on page 1.
    pub fn retreat(&mut self) -> bool {
        if !self.can_retreat() {
            return false;
        }
        self.cursors.pop();
        self.version += 1;
        true
    }

    pub fn can_retreat(&self) -> bool {
        self.cursors.len() > 1
    }

    /// Cursor for fetching the current page (`None` on page 1)
    pub fn current(&self) -> Option<&Cursor> {
        self.cursors.last().and_then(|c| c.as_ref())
    }

    /// 1-based page number
    pub fn page_number(&self) -> usize {
        self.cursors.len()
    }

    pub fn cursors(&self) -> &[Option<Cursor>] {
        &self.cursors
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}
