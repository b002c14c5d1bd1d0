//! DataTable widget - schema-driven paginated grid over JSON rows.
//!
//! # Example
//!
//! ```ignore
//! use crud_widgets::{Column, ColumnWidth, DataTable, TableState};
//!
//! let columns = vec![
//!     Column::new("vehicle_id", "Vehicle ID").width(ColumnWidth::Fixed(12)),
//!     Column::new("make_model", "Make/Model"),
//!     Column::new("status", "Status")
//!         .render(|value, _| value.and_then(|v| v.as_str()).unwrap_or("Unknown").to_uppercase()),
//! ];
//!
//! let table = DataTable::new(&columns, &rows, "id")
//!     .selectable(true)
//!     .editable(true)
//!     .deletable(true)
//!     .add_button("Add Vehicle");
//! ```
//!
//! The widget renders one page of an externally-paginated data set and
//! reports every interaction as a [`TableEvent`]; it never fetches anything
//! itself.

mod column;
mod selection;
mod state;

pub use column::{Column, ColumnWidth};
pub use selection::Selection;
pub use state::{TableState, PAGE_SIZES};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, StatefulWidget, Widget};
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

use crate::record;

const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// A caller-supplied extra entry in the per-row action menu.
#[derive(Debug, Clone)]
pub struct RowAction {
    pub id: String,
    pub label: String,
    /// Keyboard shortcut triggering the action on the cursor row
    pub key: char,
}

impl RowAction {
    pub fn new(id: impl Into<String>, label: impl Into<String>, key: char) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            key,
        }
    }
}

/// Interaction reported upward by [`DataTable::handle_key`]. Row indices are
/// within the current page's data slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    Add,
    View(usize),
    Edit(usize),
    Delete(usize),
    Action { row: usize, id: String },
    SelectionChanged,
    PageChanged,
    PageSizeChanged,
    SearchChanged,
}

/// Schema-driven grid over one page of JSON rows.
pub struct DataTable<'a> {
    columns: &'a [Column],
    data: &'a [Value],
    key_field: &'a str,
    loading: bool,
    error: Option<&'a str>,
    empty_message: String,
    search_placeholder: String,
    add_label: Option<String>,
    selectable: bool,
    viewable: bool,
    editable: bool,
    deletable: bool,
    actions: Vec<RowAction>,
    block: Option<Block<'static>>,
}

impl<'a> DataTable<'a> {
    pub fn new(columns: &'a [Column], data: &'a [Value], key_field: &'a str) -> Self {
        Self {
            columns,
            data,
            key_field,
            loading: false,
            error: None,
            empty_message: "No data found.".to_string(),
            search_placeholder: "Search...".to_string(),
            add_label: None,
            selectable: false,
            viewable: false,
            editable: false,
            deletable: false,
            actions: Vec::new(),
            block: None,
        }
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }

    pub fn empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    pub fn search_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.search_placeholder = placeholder.into();
        self
    }

    /// Enable the add button with the given label.
    pub fn add_button(mut self, label: impl Into<String>) -> Self {
        self.add_label = Some(label.into());
        self
    }

    /// Enable the checkbox column and bulk selection.
    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn viewable(mut self, viewable: bool) -> Self {
        self.viewable = viewable;
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn deletable(mut self, deletable: bool) -> Self {
        self.deletable = deletable;
        self
    }

    /// Add a caller-supplied row action.
    pub fn action(mut self, action: RowAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn block(mut self, block: Block<'static>) -> Self {
        self.block = Some(block);
        self
    }

    /// Whether any row-level handler exists; without one the Actions column
    /// is suppressed entirely.
    fn has_actions(&self) -> bool {
        self.viewable || self.editable || self.deletable || !self.actions.is_empty()
    }

    /// Keys of the current page's rows, in display order.
    fn page_keys(&self) -> Vec<String> {
        self.data
            .iter()
            .filter_map(|row| record::key_of(row, self.key_field))
            .collect()
    }

    /// Handle a key event, mutating caller-owned state and reporting the
    /// interaction. Returns `None` for keys the table does not consume.
    pub fn handle_key(&self, key: KeyEvent, state: &mut TableState) -> Option<TableEvent> {
        if state.search_mode {
            return self.handle_search_key(key, state);
        }

        match key.code {
            KeyCode::Char('/') => {
                state.search_mode = true;
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                state.cursor_up();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                state.cursor_down(self.data.len());
                None
            }
            KeyCode::Left => state.prev_page().then_some(TableEvent::PageChanged),
            KeyCode::Right => state.next_page().then_some(TableEvent::PageChanged),
            KeyCode::Char('s') => {
                state.cycle_page_size();
                Some(TableEvent::PageSizeChanged)
            }
            KeyCode::Char(' ') if self.selectable => {
                let row = self.data.get(state.cursor)?;
                let key = record::key_of(row, self.key_field)?;
                state.selection.toggle(key);
                Some(TableEvent::SelectionChanged)
            }
            KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if !self.selectable {
                    return None;
                }
                state.selection.toggle_select_all(&self.page_keys());
                Some(TableEvent::SelectionChanged)
            }
            KeyCode::Char('a') if self.add_label.is_some() => Some(TableEvent::Add),
            KeyCode::Enter if self.viewable => self.row_event(state, TableEvent::View),
            KeyCode::Char('e') if self.editable => self.row_event(state, TableEvent::Edit),
            KeyCode::Char('d') if self.deletable => self.row_event(state, TableEvent::Delete),
            KeyCode::Char(c) => {
                let action = self.actions.iter().find(|a| a.key == c)?;
                let id = action.id.clone();
                self.data.get(state.cursor)?;
                Some(TableEvent::Action {
                    row: state.cursor,
                    id,
                })
            }
            _ => None,
        }
    }

    fn handle_search_key(&self, key: KeyEvent, state: &mut TableState) -> Option<TableEvent> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                state.search_mode = false;
                None
            }
            KeyCode::Char(c) => {
                let mut search = state.search.clone();
                search.push(c);
                state.set_search(search);
                Some(TableEvent::SearchChanged)
            }
            KeyCode::Backspace => {
                let mut search = state.search.clone();
                search.pop();
                state.set_search(search);
                Some(TableEvent::SearchChanged)
            }
            _ => None,
        }
    }

    fn row_event(
        &self,
        state: &TableState,
        event: impl FnOnce(usize) -> TableEvent,
    ) -> Option<TableEvent> {
        if self.loading || state.cursor >= self.data.len() {
            return None;
        }
        Some(event(state.cursor))
    }

    fn calculate_column_widths(&self, total_width: usize) -> Vec<u16> {
        let col_count = self.columns.len();
        if col_count == 0 {
            return vec![];
        }

        let separators = col_count.saturating_sub(1);
        let available = total_width.saturating_sub(separators);

        let mut widths = vec![0u16; col_count];
        let mut remaining = available;
        let mut flex_count = 0;

        for (i, col) in self.columns.iter().enumerate() {
            match col.width {
                ColumnWidth::Fixed(w) => {
                    widths[i] = w;
                    remaining = remaining.saturating_sub(w as usize);
                }
                ColumnWidth::Percentage(p) => {
                    let w = (available as f32 * p / 100.0) as u16;
                    widths[i] = w;
                    remaining = remaining.saturating_sub(w as usize);
                }
                ColumnWidth::Flex(_) => flex_count += 1,
            }
        }

        if flex_count > 0 {
            let total_flex: u16 = self
                .columns
                .iter()
                .filter_map(|c| match c.width {
                    ColumnWidth::Flex(f) => Some(f),
                    _ => None,
                })
                .sum();

            for (i, col) in self.columns.iter().enumerate() {
                if let ColumnWidth::Flex(f) = col.width {
                    let w = (remaining as f32 * f as f32 / total_flex.max(1) as f32) as u16;
                    widths[i] = w;
                }
            }
        }

        widths
    }

    fn render_toolbar(&self, area: Rect, buf: &mut Buffer, state: &TableState) {
        let search_display = if state.search.is_empty() && !state.search_mode {
            format!("/ {}", self.search_placeholder)
        } else {
            format!("/ {}", state.search)
        };
        let search_style = if state.search_mode {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        buf.set_stringn(
            area.x,
            area.y,
            &search_display,
            area.width as usize / 2,
            search_style,
        );
        if state.search_mode {
            let cursor_x = area.x + search_display.width() as u16;
            if cursor_x < area.x + area.width / 2 {
                buf[(cursor_x, area.y)].set_char('_');
            }
        }

        let mut right = String::new();
        if self.selectable && !state.selection.is_empty() {
            right.push_str(&format!("{} selected  ", state.selection.len()));
        }
        if let Some(label) = &self.add_label {
            right.push_str(&format!("[a] {}", label));
        }
        if !right.is_empty() {
            let x = area.x + area.width.saturating_sub(right.width() as u16);
            buf.set_string(x, area.y, &right, Style::default().fg(Color::Cyan));
        }
    }

    fn render_pagination(&self, area: Rect, buf: &mut Buffer, state: &TableState) {
        if let Some((start, end)) = state.showing_range() {
            let showing = format!("Showing {} to {} of {} results", start, end, state.total);
            buf.set_stringn(
                area.x,
                area.y,
                &showing,
                area.width as usize,
                Style::default().fg(Color::DarkGray),
            );
        }

        let prev_style = if state.has_prev() {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let next_style = if state.has_next() {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let pager = format!(
            "{}/page  ◀ Page {} of {} ▶",
            state.page_size,
            state.page,
            state.total_pages()
        );
        let x = area.x + area.width.saturating_sub(pager.width() as u16);
        buf.set_string(x, area.y, &pager, Style::default());
        // Re-style the arrows to show the boundary state.
        let right = area.x + area.width;
        let prev_x = x + format!("{}/page  ", state.page_size).width() as u16;
        if prev_x < right {
            buf[(prev_x, area.y)].set_style(prev_style);
        }
        let next_x = x + pager.width() as u16 - 1;
        if next_x < right {
            buf[(next_x, area.y)].set_style(next_style);
        }
    }
}

impl StatefulWidget for DataTable<'_> {
    type State = TableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.width < 10 || inner.height < 4 {
            return;
        }

        state.clamp_cursor(self.data.len());

        let mut y = inner.y;
        self.render_toolbar(Rect::new(inner.x, y, inner.width, 1), buf, state);
        y += 1;

        if let Some(error) = self.error {
            buf.set_stringn(
                inner.x,
                y,
                error,
                inner.width as usize,
                Style::default().fg(Color::Red),
            );
            y += 1;
        }

        let checkbox_width: u16 = if self.selectable { 4 } else { 0 };
        let actions_width: u16 = if self.has_actions() { 8 } else { 0 };
        let columns_width = inner
            .width
            .saturating_sub(checkbox_width + actions_width) as usize;
        let widths = self.calculate_column_widths(columns_width);

        // Header row
        let header_style = Style::default().add_modifier(Modifier::BOLD);
        let mut x = inner.x;
        if self.selectable {
            let all = state
                .selection
                .is_all_selected(self.page_keys().iter().map(String::as_str));
            buf.set_string(x, y, if all { "[x]" } else { "[ ]" }, header_style);
            x += checkbox_width;
        }
        for (i, col) in self.columns.iter().enumerate() {
            let width = widths.get(i).copied().unwrap_or(0);
            if width == 0 {
                continue;
            }
            let display = truncate_with_ellipsis(&col.header, width as usize);
            buf.set_string(x, y, &display, header_style);
            x += width + 1;
        }
        if self.has_actions() {
            let x = inner.x + inner.width.saturating_sub(actions_width);
            buf.set_string(x, y, "Actions", header_style);
        }
        y += 1;

        let footer_rows: u16 = if state.paginated() { 1 } else { 0 };
        let body_height = (inner.y + inner.height)
            .saturating_sub(y + footer_rows) as usize;
        if body_height == 0 {
            return;
        }

        if self.loading {
            let frame = SPINNER_FRAMES[state.tick % SPINNER_FRAMES.len()];
            let msg = format!("{} Loading...", frame);
            let cx = inner.x + (inner.width.saturating_sub(msg.chars().count() as u16)) / 2;
            let cy = y + (body_height as u16) / 2;
            buf.set_string(cx, cy, &msg, Style::default().fg(Color::DarkGray));
        } else if self.data.is_empty() {
            let msg = truncate_with_ellipsis(&self.empty_message, inner.width as usize);
            let cx = inner.x + (inner.width.saturating_sub(msg.chars().count() as u16)) / 2;
            let cy = y + (body_height as u16) / 2;
            buf.set_string(cx, cy, &msg, Style::default().fg(Color::DarkGray));
        } else {
            // Keep the cursor visible; scroll is derived, not stored.
            let scroll = state.cursor.saturating_sub(body_height.saturating_sub(1));
            for (offset, row) in self.data.iter().skip(scroll).take(body_height).enumerate() {
                let index = scroll + offset;
                let ry = y + offset as u16;
                let key = record::key_of(row, self.key_field);
                let is_cursor = index == state.cursor;
                let is_selected = key
                    .as_deref()
                    .map(|k| state.selection.contains(k))
                    .unwrap_or(false);

                let row_style = if is_cursor {
                    Style::default().bg(Color::Blue).fg(Color::White)
                } else if is_selected {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };

                for col_x in inner.x..inner.x + inner.width {
                    buf[(col_x, ry)].set_style(row_style);
                }

                let mut x = inner.x;
                if self.selectable {
                    buf.set_string(x, ry, if is_selected { "[x]" } else { "[ ]" }, row_style);
                    x += checkbox_width;
                }
                for (i, col) in self.columns.iter().enumerate() {
                    let width = widths.get(i).copied().unwrap_or(0);
                    if width == 0 {
                        continue;
                    }
                    let display = truncate_with_ellipsis(&col.cell_text(row), width as usize);
                    buf.set_string(x, ry, &display, row_style);
                    x += width + 1;
                }
                if self.has_actions() && is_cursor {
                    let hint = "⋯";
                    let x = inner.x + inner.width.saturating_sub(actions_width);
                    buf.set_string(x, ry, hint, row_style);
                }
            }
        }

        if state.paginated() {
            let py = inner.y + inner.height - 1;
            self.render_pagination(Rect::new(inner.x, py, inner.width, 1), buf, state);
        }
    }
}

/// Truncate a string with ellipsis if too long.
fn truncate_with_ellipsis(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return chars.into_iter().take(max_len).collect();
    }
    let mut out: String = chars.into_iter().take(max_len - 3).collect();
    out.push_str("...");
    out
}
