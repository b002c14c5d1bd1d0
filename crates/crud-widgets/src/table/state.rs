//! State management for DataTable.
//!
//! The state is owned by the page, not the widget: the table is a pure view
//! over externally-held pagination and search, re-fetched by the caller when
//! either changes.

use super::Selection;

/// The fixed page-size option set.
pub const PAGE_SIZES: [usize; 4] = [10, 25, 50, 100];

/// Caller-owned view state for DataTable.
#[derive(Debug, Clone)]
pub struct TableState {
    /// Current page, 1-indexed
    pub page: usize,
    /// Rows per page
    pub page_size: usize,
    /// Total rows across all pages (from the backend)
    pub total: u64,
    /// Current search text
    pub search: String,
    /// Whether keystrokes edit the search box
    pub search_mode: bool,
    /// Selected row keys
    pub selection: Selection,
    /// Cursor row within the current page
    pub cursor: usize,
    /// Spinner animation frame, advanced by the caller's tick
    pub tick: usize,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PAGE_SIZES[0],
            total: 0,
            search: String::new(),
            search_mode: false,
            selection: Selection::default(),
            cursor: 0,
            tick: 0,
        }
    }
}

impl TableState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `ceil(total / page_size)`
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size as u64)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        (self.page as u64) < self.total_pages()
    }

    /// Move to the previous page; clamped at 1.
    pub fn prev_page(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            self.cursor = 0;
            true
        } else {
            false
        }
    }

    /// Move to the next page; clamped at the last page.
    pub fn next_page(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            self.cursor = 0;
            true
        } else {
            false
        }
    }

    /// Cycle to the next entry in [`PAGE_SIZES`], clamping the page so it
    /// stays in range under the new size.
    pub fn cycle_page_size(&mut self) {
        let idx = PAGE_SIZES
            .iter()
            .position(|&s| s == self.page_size)
            .unwrap_or(0);
        self.page_size = PAGE_SIZES[(idx + 1) % PAGE_SIZES.len()];
        let last = self.total_pages().max(1) as usize;
        self.page = self.page.min(last);
        self.cursor = 0;
    }

    /// 1-indexed "showing X to Y of Z" range; `None` when there is nothing
    /// to show.
    pub fn showing_range(&self) -> Option<(u64, u64)> {
        if self.total == 0 {
            return None;
        }
        let start = ((self.page - 1) * self.page_size) as u64 + 1;
        let end = ((self.page * self.page_size) as u64).min(self.total);
        Some((start, end))
    }

    /// The pagination bar is shown only when the data spans pages.
    pub fn paginated(&self) -> bool {
        self.total > self.page_size as u64
    }

    /// Offset of the first row of the current page, for `skip`-style queries.
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
        self.cursor = 0;
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self, row_count: usize) {
        if row_count > 0 && self.cursor + 1 < row_count {
            self.cursor += 1;
        }
    }

    /// Keep the cursor inside the current page's rows after a data change.
    pub fn clamp_cursor(&mut self, row_count: usize) {
        if row_count == 0 {
            self.cursor = 0;
        } else if self.cursor >= row_count {
            self.cursor = row_count - 1;
        }
    }
}
