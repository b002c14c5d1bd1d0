//! FormDialog widget - modal create/edit/view form over a field schema.
//!
//! # Example
//!
//! ```ignore
//! use crud_widgets::{Field, FieldKind, FormDialog, FormMode, FormState, SelectOption};
//!
//! let fields = vec![
//!     Field::new("vehicle_id", "Vehicle ID").required(true),
//!     Field::new("status", "Status").kind(FieldKind::Select {
//!         options: vec![SelectOption::new("in_service", "In Service")],
//!         multiple: false,
//!     }),
//!     Field::new("notes", "Notes")
//!         .kind(FieldKind::TextArea { rows: 3 })
//!         .full_width(),
//! ];
//!
//! let dialog = FormDialog::new("Edit Vehicle", &fields, FormMode::Edit);
//! ```
//!
//! The dialog renders on top of the page (the background is cleared under
//! it) and reports submission and dismissal as [`FormEvent`]s. Field values
//! live in the caller-owned [`FormState`], reset on every open.

mod field;
mod state;
mod validation;

pub use field::{Field, FieldKind, FieldValue, FileRef, SelectOption};
pub use state::FormState;
pub use validation::validate;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, StatefulWidget, Widget};
use serde_json::{Map, Value};

/// What the dialog is open for. View mode renders every field read-only and
/// turns submission into a plain close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
    View,
}

impl FormMode {
    fn default_submit_label(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Edit => "Save",
            Self::View => "Close",
        }
    }
}

/// Outcome of a key press inside the dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    /// Validation passed; the payload is one JSON entry per schema field.
    Submit(Map<String, Value>),
    Close,
}

/// Modal form over a field schema.
pub struct FormDialog<'a> {
    title: &'a str,
    description: Option<&'a str>,
    fields: &'a [Field],
    mode: FormMode,
    submit_label: Option<&'a str>,
    loading: bool,
    error: Option<&'a str>,
}

impl<'a> FormDialog<'a> {
    pub fn new(title: &'a str, fields: &'a [Field], mode: FormMode) -> Self {
        Self {
            title,
            description: None,
            fields,
            mode,
            submit_label: None,
            loading: false,
            error: None,
        }
    }

    pub fn description(mut self, description: &'a str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn submit_label(mut self, label: &'a str) -> Self {
        self.submit_label = Some(label);
        self
    }

    /// A mutation is in flight; submission is ignored until it settles.
    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    /// Server-side error shown above the fields.
    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }

    fn read_only(&self) -> bool {
        self.mode == FormMode::View
    }

    /// Handle a key event. Returns `None` for keys the dialog swallows
    /// without an outward effect.
    pub fn handle_key(&self, key: KeyEvent, state: &mut FormState) -> Option<FormEvent> {
        match key.code {
            KeyCode::Esc => return Some(FormEvent::Close),
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                state.focus_previous(self.fields);
                return None;
            }
            KeyCode::Tab | KeyCode::Down => {
                state.focus_next(self.fields);
                return None;
            }
            KeyCode::BackTab | KeyCode::Up => {
                state.focus_previous(self.fields);
                return None;
            }
            _ => {}
        }

        if self.read_only() {
            return match key.code {
                KeyCode::Enter => Some(FormEvent::Close),
                _ => None,
            };
        }

        let focused = self.fields.get(state.focused)?.clone();
        match key.code {
            KeyCode::Enter => {
                if let FieldKind::TextArea { .. } = focused.kind {
                    state.input_char(&focused, '\n');
                    return None;
                }
                self.try_submit(state)
            }
            KeyCode::Backspace => {
                state.backspace(&focused);
                None
            }
            KeyCode::Left => {
                self.cycle_option(&focused, state, -1);
                self.step_number(&focused, state, -1.0);
                None
            }
            KeyCode::Right => {
                self.cycle_option(&focused, state, 1);
                self.step_number(&focused, state, 1.0);
                None
            }
            KeyCode::Delete => {
                if matches!(focused.kind, FieldKind::File { .. }) && !focused.disabled {
                    state.set_value(focused.name.clone(), FieldValue::Null);
                }
                None
            }
            KeyCode::Char(' ') if !matches!(focused.kind, FieldKind::TextArea { .. }) => {
                self.toggle(&focused, state);
                None
            }
            KeyCode::Char(c) => {
                state.input_char(&focused, c);
                None
            }
            _ => None,
        }
    }

    /// Validate everything; submit only when clean. All fields are marked
    /// touched so every error becomes visible.
    fn try_submit(&self, state: &mut FormState) -> Option<FormEvent> {
        if self.loading {
            return None;
        }
        for f in self.fields {
            state.blur(f);
        }
        if state.errors.is_empty() {
            Some(FormEvent::Submit(state.values_bag(self.fields)))
        } else {
            None
        }
    }

    fn toggle(&self, field: &Field, state: &mut FormState) {
        if field.disabled {
            return;
        }
        match &field.kind {
            FieldKind::Checkbox => {
                let checked = matches!(state.value(&field.name), Some(FieldValue::Bool(true)));
                state.set_value(field.name.clone(), FieldValue::Bool(!checked));
            }
            FieldKind::Select {
                options,
                multiple: true,
            } => {
                let Some(option) = options.get(state.option_cursor) else {
                    return;
                };
                let mut chosen = match state.value(&field.name) {
                    Some(FieldValue::List(l)) => l.clone(),
                    _ => Vec::new(),
                };
                match chosen.iter().position(|v| v == &option.value) {
                    Some(i) => {
                        chosen.remove(i);
                    }
                    None => chosen.push(option.value.clone()),
                }
                state.set_value(field.name.clone(), FieldValue::List(chosen));
            }
            _ => {
                // Space is ordinary input everywhere else.
                state.input_char(field, ' ');
            }
        }
    }

    /// Left/Right cycles a single select's value and moves the cursor in a
    /// multi select.
    fn cycle_option(&self, field: &Field, state: &mut FormState, direction: isize) {
        let FieldKind::Select { options, multiple } = &field.kind else {
            return;
        };
        if field.disabled || options.is_empty() {
            return;
        }
        let len = options.len() as isize;
        if *multiple {
            let next = (state.option_cursor as isize + direction).rem_euclid(len);
            state.option_cursor = next as usize;
        } else {
            let current = match state.value(&field.name) {
                Some(FieldValue::Text(v)) => options.iter().position(|o| &o.value == v),
                _ => None,
            };
            let next = match current {
                Some(i) => (i as isize + direction).rem_euclid(len),
                None => 0,
            };
            state.set_value(
                field.name.clone(),
                FieldValue::Text(options[next as usize].value.clone()),
            );
        }
    }

    /// Nudge a number field by its step, clamped to its bounds. A null value
    /// starts from the minimum (or zero).
    fn step_number(&self, field: &Field, state: &mut FormState, direction: f64) {
        let &FieldKind::Number { min, max, step } = &field.kind else {
            return;
        };
        if field.disabled {
            return;
        }
        // A pending text buffer wins over stepping.
        state.blur(field);
        let next = match state.value(&field.name) {
            Some(FieldValue::Number(n)) => n + step.unwrap_or(1.0) * direction,
            _ => min.unwrap_or(0.0),
        };
        let next = match (min, max) {
            (Some(min), _) if next < min => min,
            (_, Some(max)) if next > max => max,
            _ => next,
        };
        state.set_value(field.name.clone(), FieldValue::Number(next));
    }

    /// Fields packed into grid rows: a full-width field takes a row alone,
    /// single-span fields pair up.
    fn grid_rows(&self) -> Vec<Vec<usize>> {
        let mut rows: Vec<Vec<usize>> = Vec::new();
        let mut pending: Option<usize> = None;
        for (i, f) in self.fields.iter().enumerate() {
            if f.col_span >= 2 {
                if let Some(p) = pending.take() {
                    rows.push(vec![p]);
                }
                rows.push(vec![i]);
            } else if let Some(p) = pending.take() {
                rows.push(vec![p, i]);
            } else {
                pending = Some(i);
            }
        }
        if let Some(p) = pending {
            rows.push(vec![p]);
        }
        rows
    }

    fn input_height(&self, field: &Field) -> u16 {
        match field.kind {
            FieldKind::TextArea { rows } => rows.max(1),
            _ => 1,
        }
    }

    fn row_height(&self, row: &[usize]) -> u16 {
        // Label, input, one meta line (error or helper).
        let input = row
            .iter()
            .map(|&i| self.input_height(&self.fields[i]))
            .max()
            .unwrap_or(1);
        2 + input
    }

    fn render_field(
        &self,
        field: &Field,
        area: Rect,
        buf: &mut Buffer,
        state: &FormState,
        focused: bool,
    ) {
        let label = if field.required && !self.read_only() {
            format!("{} *", field.label)
        } else {
            field.label.clone()
        };
        let label_style = if focused {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        buf.set_stringn(area.x, area.y, &label, area.width as usize, label_style);

        let input_style = if field.disabled || self.read_only() {
            Style::default().fg(Color::DarkGray)
        } else if focused {
            Style::default().bg(Color::DarkGray).fg(Color::White)
        } else {
            Style::default()
        };

        let input_height = self.input_height(field);
        for dy in 0..input_height {
            for x in area.x..area.x + area.width {
                buf[(x, area.y + 1 + dy)].set_style(input_style);
            }
        }

        let value = state.value(&field.name).cloned().unwrap_or_default();
        let display = match &field.kind {
            FieldKind::Select { options, multiple } if focused && !self.read_only() => {
                self.select_display(options, *multiple, &value, state.option_cursor)
            }
            _ if focused && !self.read_only() => state.editing_text(field),
            _ => field.display(&value),
        };
        let display = if display.is_empty() && !focused {
            field.placeholder.clone().unwrap_or_default()
        } else {
            display
        };

        if input_height == 1 {
            buf.set_stringn(area.x, area.y + 1, &display, area.width as usize, input_style);
            if focused && !self.read_only() && field.kind.is_textual() {
                let cursor_x = area.x + (display.chars().count() as u16).min(area.width - 1);
                buf[(cursor_x, area.y + 1)].set_char('_');
            }
        } else {
            for (dy, line) in display.lines().take(input_height as usize).enumerate() {
                buf.set_stringn(
                    area.x,
                    area.y + 1 + dy as u16,
                    line,
                    area.width as usize,
                    input_style,
                );
            }
        }

        // Meta line: visible error wins over helper text.
        let meta_y = area.y + 1 + input_height;
        let visible_error = state
            .is_touched(&field.name)
            .then(|| state.error(&field.name))
            .flatten();
        if let Some(error) = visible_error {
            buf.set_stringn(
                area.x,
                meta_y,
                error,
                area.width as usize,
                Style::default().fg(Color::Red),
            );
        } else if let Some(helper) = &field.helper {
            buf.set_stringn(
                area.x,
                meta_y,
                helper,
                area.width as usize,
                Style::default().fg(Color::DarkGray),
            );
        }
    }

    fn select_display(
        &self,
        options: &[SelectOption],
        multiple: bool,
        value: &FieldValue,
        cursor: usize,
    ) -> String {
        if multiple {
            let chosen: &[String] = match value {
                FieldValue::List(l) => l,
                _ => &[],
            };
            options
                .iter()
                .enumerate()
                .map(|(i, o)| {
                    let mark = if chosen.contains(&o.value) { "x" } else { " " };
                    let point = if i == cursor { ">" } else { " " };
                    format!("{}[{}] {}", point, mark, o.label)
                })
                .collect::<Vec<_>>()
                .join("  ")
        } else {
            let label = match value {
                FieldValue::Text(v) => options
                    .iter()
                    .find(|o| &o.value == v)
                    .map(|o| o.label.clone())
                    .unwrap_or_else(|| v.clone()),
                _ => "(none)".to_string(),
            };
            format!("\u{25c0} {} \u{25b6}", label)
        }
    }
}

impl StatefulWidget for FormDialog<'_> {
    type State = FormState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let rows = self.grid_rows();
        let body_height: u16 = rows.iter().map(|r| self.row_height(r) + 1).sum();
        let mut height = body_height + 4; // borders, footer, spacing
        if self.description.is_some() {
            height += 2;
        }
        if self.error.is_some() {
            height += 2;
        }

        let width = area.width.saturating_sub(8).clamp(40, 72).min(area.width);
        let height = height.min(area.height);
        let modal = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        );

        Clear.render(modal, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.title));
        let inner = block.inner(modal);
        block.render(modal, buf);

        if inner.width < 10 || inner.height < 3 {
            return;
        }

        let mut y = inner.y;
        if let Some(description) = self.description {
            buf.set_stringn(
                inner.x,
                y,
                description,
                inner.width as usize,
                Style::default().fg(Color::DarkGray),
            );
            y += 2;
        }
        if let Some(error) = self.error {
            buf.set_stringn(
                inner.x,
                y,
                error,
                inner.width as usize,
                Style::default().fg(Color::Red),
            );
            y += 2;
        }

        let bottom = inner.y + inner.height;
        for row in &rows {
            let row_height = self.row_height(row);
            if y + row_height >= bottom {
                break;
            }
            let slot_width = if row.len() == 2 {
                inner.width.saturating_sub(2) / 2
            } else {
                inner.width
            };
            for (slot, &index) in row.iter().enumerate() {
                let x = inner.x + slot as u16 * (slot_width + 2);
                let field = &self.fields[index];
                let focused = index == state.focused;
                self.render_field(
                    field,
                    Rect::new(x, y, slot_width, row_height),
                    buf,
                    state,
                    focused,
                );
            }
            y += row_height + 1;
        }

        // Footer
        let footer_y = bottom - 1;
        let submit = if self.loading {
            "Saving...".to_string()
        } else {
            format!(
                "[Enter] {}",
                self.submit_label
                    .unwrap_or(self.mode.default_submit_label())
            )
        };
        let footer = format!("[Esc] Cancel   {}", submit);
        let x = inner.x + inner.width.saturating_sub(footer.chars().count() as u16);
        buf.set_string(x, footer_y, &footer, Style::default().fg(Color::Cyan));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Vec<Field> {
        vec![
            Field::new("vehicle_id", "Vehicle ID").required(true),
            Field::new("status", "Status").kind(FieldKind::Select {
                options: vec![
                    SelectOption::new("in_service", "In Service"),
                    SelectOption::new("maintenance", "Maintenance"),
                    SelectOption::new("retired", "Retired"),
                ],
                multiple: false,
            }),
            Field::new("active", "Active").kind(FieldKind::Checkbox),
        ]
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn typed(dialog: &FormDialog, state: &mut FormState, text: &str) {
        for c in text.chars() {
            dialog.handle_key(key(KeyCode::Char(c)), state);
        }
    }

    #[test]
    fn test_esc_closes_in_any_mode() {
        let fields = schema();
        let mut state = FormState::new();
        state.reset(&fields, None);
        for mode in [FormMode::Create, FormMode::Edit, FormMode::View] {
            let dialog = FormDialog::new("Vehicle", &fields, mode);
            assert_eq!(
                dialog.handle_key(key(KeyCode::Esc), &mut state),
                Some(FormEvent::Close)
            );
        }
    }

    #[test]
    fn test_view_mode_enter_closes_without_submit() {
        let fields = schema();
        let dialog = FormDialog::new("Vehicle", &fields, FormMode::View);
        let mut state = FormState::new();
        let record = json!({"vehicle_id": "VH-001"});
        state.reset(&fields, record.as_object());

        assert_eq!(
            dialog.handle_key(key(KeyCode::Enter), &mut state),
            Some(FormEvent::Close)
        );
    }

    #[test]
    fn test_view_mode_ignores_edits() {
        let fields = schema();
        let dialog = FormDialog::new("Vehicle", &fields, FormMode::View);
        let mut state = FormState::new();
        state.reset(&fields, None);
        typed(&dialog, &mut state, "abc");
        assert_eq!(state.value("vehicle_id"), None);
    }

    #[test]
    fn test_submit_blocked_until_valid() {
        let fields = schema();
        let dialog = FormDialog::new("Vehicle", &fields, FormMode::Create);
        let mut state = FormState::new();
        state.reset(&fields, None);

        assert_eq!(dialog.handle_key(key(KeyCode::Enter), &mut state), None);
        assert!(state.is_touched("vehicle_id"), "failed submit touches all fields");
        assert_eq!(state.error("vehicle_id"), Some("Vehicle ID is required"));

        typed(&dialog, &mut state, "VH-009");
        let event = dialog.handle_key(key(KeyCode::Enter), &mut state);
        let Some(FormEvent::Submit(bag)) = event else {
            panic!("expected submit, got {:?}", event);
        };
        assert_eq!(bag["vehicle_id"], json!("VH-009"));
        assert_eq!(bag["status"], Value::Null);
    }

    #[test]
    fn test_submit_ignored_while_loading() {
        let fields = schema();
        let dialog = FormDialog::new("Vehicle", &fields, FormMode::Create).loading(true);
        let mut state = FormState::new();
        state.reset(&fields, None);
        typed(&dialog, &mut state, "VH-010");
        assert_eq!(dialog.handle_key(key(KeyCode::Enter), &mut state), None);
    }

    #[test]
    fn test_single_select_cycles_with_arrows() {
        let fields = schema();
        let dialog = FormDialog::new("Vehicle", &fields, FormMode::Edit);
        let mut state = FormState::new();
        state.reset(&fields, None);
        state.focused = 1;

        dialog.handle_key(key(KeyCode::Right), &mut state);
        assert_eq!(
            state.value("status"),
            Some(&FieldValue::Text("in_service".into()))
        );
        dialog.handle_key(key(KeyCode::Right), &mut state);
        assert_eq!(
            state.value("status"),
            Some(&FieldValue::Text("maintenance".into()))
        );
        dialog.handle_key(key(KeyCode::Left), &mut state);
        assert_eq!(
            state.value("status"),
            Some(&FieldValue::Text("in_service".into()))
        );
    }

    #[test]
    fn test_checkbox_space_toggles() {
        let fields = schema();
        let dialog = FormDialog::new("Vehicle", &fields, FormMode::Edit);
        let mut state = FormState::new();
        state.reset(&fields, None);
        state.focused = 2;

        dialog.handle_key(key(KeyCode::Char(' ')), &mut state);
        assert_eq!(state.value("active"), Some(&FieldValue::Bool(true)));
        dialog.handle_key(key(KeyCode::Char(' ')), &mut state);
        assert_eq!(state.value("active"), Some(&FieldValue::Bool(false)));
    }

    #[test]
    fn test_multi_select_space_toggles_at_cursor() {
        let fields = vec![Field::new("tags", "Tags").kind(FieldKind::Select {
            options: vec![
                SelectOption::new("ev", "Electric"),
                SelectOption::new("van", "Van"),
            ],
            multiple: true,
        })];
        let dialog = FormDialog::new("Vehicle", &fields, FormMode::Edit);
        let mut state = FormState::new();
        state.reset(&fields, None);

        dialog.handle_key(key(KeyCode::Char(' ')), &mut state);
        assert_eq!(state.value("tags"), Some(&FieldValue::List(vec!["ev".into()])));

        dialog.handle_key(key(KeyCode::Right), &mut state);
        dialog.handle_key(key(KeyCode::Char(' ')), &mut state);
        assert_eq!(
            state.value("tags"),
            Some(&FieldValue::List(vec!["ev".into(), "van".into()]))
        );

        dialog.handle_key(key(KeyCode::Char(' ')), &mut state);
        assert_eq!(state.value("tags"), Some(&FieldValue::List(vec!["ev".into()])));
    }

    #[test]
    fn test_number_steps_with_arrows() {
        let fields = vec![Field::new("year", "Year").kind(FieldKind::Number {
            min: Some(1990.0),
            max: Some(1992.0),
            step: Some(1.0),
        })];
        let dialog = FormDialog::new("Vehicle", &fields, FormMode::Edit);
        let mut state = FormState::new();
        state.reset(&fields, None);

        dialog.handle_key(key(KeyCode::Right), &mut state);
        assert_eq!(state.value("year"), Some(&FieldValue::Number(1990.0)), "starts at min");
        dialog.handle_key(key(KeyCode::Right), &mut state);
        dialog.handle_key(key(KeyCode::Right), &mut state);
        dialog.handle_key(key(KeyCode::Right), &mut state);
        assert_eq!(state.value("year"), Some(&FieldValue::Number(1992.0)), "clamped at max");
        dialog.handle_key(key(KeyCode::Left), &mut state);
        assert_eq!(state.value("year"), Some(&FieldValue::Number(1991.0)));
    }

    #[test]
    fn test_file_delete_clears_value() {
        let fields = vec![Field::new("manual", "Manual").kind(FieldKind::File { accept: None })];
        let dialog = FormDialog::new("Vehicle", &fields, FormMode::Edit);
        let mut state = FormState::new();
        state.reset(&fields, None);
        state.set_value(
            "manual",
            FieldValue::File(FileRef {
                name: "manual.pdf".into(),
                size: 1024,
            }),
        );

        dialog.handle_key(key(KeyCode::Delete), &mut state);
        assert_eq!(state.value("manual"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_textarea_enter_inserts_newline() {
        let fields = vec![Field::new("notes", "Notes").kind(FieldKind::TextArea { rows: 3 })];
        let dialog = FormDialog::new("Vehicle", &fields, FormMode::Edit);
        let mut state = FormState::new();
        state.reset(&fields, None);

        typed(&dialog, &mut state, "line one");
        dialog.handle_key(key(KeyCode::Enter), &mut state);
        typed(&dialog, &mut state, "line two");
        assert_eq!(
            state.value("notes"),
            Some(&FieldValue::Text("line one\nline two".into()))
        );
    }

    #[test]
    fn test_grid_packs_spans() {
        let fields = vec![
            Field::new("a", "A"),
            Field::new("b", "B"),
            Field::new("c", "C").full_width(),
            Field::new("d", "D"),
        ];
        let dialog = FormDialog::new("Vehicle", &fields, FormMode::Create);
        assert_eq!(dialog.grid_rows(), vec![vec![0, 1], vec![2], vec![3]]);
    }
}
