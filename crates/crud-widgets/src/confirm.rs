//! DeleteDialog widget - confirmation modal guarding destructive actions.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Widget};

/// Outcome of a key press inside the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmEvent {
    Confirm,
    Close,
}

/// Confirmation modal for deletes. While the delete request is in flight
/// both confirm and dismiss are locked out, so the dialog cannot be closed
/// under a pending mutation.
pub struct DeleteDialog<'a> {
    title: &'a str,
    item_name: &'a str,
    description: Option<&'a str>,
    loading: bool,
}

impl<'a> DeleteDialog<'a> {
    pub fn new(item_name: &'a str) -> Self {
        Self {
            title: "Delete Item",
            item_name,
            description: None,
            loading: false,
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    /// Override the generated description.
    pub fn description(mut self, description: &'a str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    fn description_text(&self) -> String {
        match self.description {
            Some(d) => d.to_string(),
            None => format!(
                "Are you sure you want to delete \"{}\"? This action cannot be undone.",
                self.item_name
            ),
        }
    }

    /// Handle a key event. Every key is ignored while loading.
    pub fn handle_key(&self, key: KeyEvent) -> Option<ConfirmEvent> {
        if self.loading {
            return None;
        }
        match key.code {
            KeyCode::Enter | KeyCode::Char('y') => Some(ConfirmEvent::Confirm),
            KeyCode::Esc | KeyCode::Char('n') => Some(ConfirmEvent::Close),
            _ => None,
        }
    }
}

impl Widget for DeleteDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = area.width.saturating_sub(8).clamp(30, 60).min(area.width);
        let description = self.description_text();
        let text_width = width.saturating_sub(4).max(1) as usize;
        let lines = wrap(&description, text_width);
        let height = (lines.len() as u16 + 4).min(area.height);

        let modal = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        );

        Clear.render(modal, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(format!(" {} ", self.title))
            .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));
        let inner = block.inner(modal);
        block.render(modal, buf);

        if inner.width < 4 || inner.height < 2 {
            return;
        }

        let mut y = inner.y;
        for line in lines.iter().take(inner.height.saturating_sub(2) as usize) {
            buf.set_stringn(inner.x + 1, y, line, inner.width as usize - 1, Style::default());
            y += 1;
        }

        let footer = if self.loading {
            "Deleting...".to_string()
        } else {
            "[Esc] Cancel   [Enter] Delete".to_string()
        };
        let footer_style = if self.loading {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Red)
        };
        let x = inner.x + inner.width.saturating_sub(footer.chars().count() as u16 + 1);
        buf.set_string(x, inner.y + inner.height - 1, &footer, footer_style);
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_confirm_and_close_keys() {
        let dialog = DeleteDialog::new("VH-001");
        assert_eq!(dialog.handle_key(key(KeyCode::Enter)), Some(ConfirmEvent::Confirm));
        assert_eq!(
            dialog.handle_key(key(KeyCode::Char('y'))),
            Some(ConfirmEvent::Confirm)
        );
        assert_eq!(dialog.handle_key(key(KeyCode::Esc)), Some(ConfirmEvent::Close));
        assert_eq!(
            dialog.handle_key(key(KeyCode::Char('n'))),
            Some(ConfirmEvent::Close)
        );
        assert_eq!(dialog.handle_key(key(KeyCode::Char('q'))), None);
    }

    #[test]
    fn test_loading_locks_out_both_paths() {
        let dialog = DeleteDialog::new("VH-001").loading(true);
        assert_eq!(dialog.handle_key(key(KeyCode::Enter)), None);
        assert_eq!(dialog.handle_key(key(KeyCode::Esc)), None);
    }

    #[test]
    fn test_generated_description_names_the_item() {
        let dialog = DeleteDialog::new("VH-001");
        assert_eq!(
            dialog.description_text(),
            "Are you sure you want to delete \"VH-001\"? This action cannot be undone."
        );

        let custom = DeleteDialog::new("VH-001").description("Gone means gone.");
        assert_eq!(custom.description_text(), "Gone means gone.");
    }

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap("one two three four five", 9);
        assert_eq!(lines, vec!["one two", "three", "four five"]);
    }
}
