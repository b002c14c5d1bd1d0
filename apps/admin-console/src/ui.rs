//! Rendering for the admin console.

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crud_widgets::{DeleteDialog, FormDialog};

use crate::app::{build_table, App, Dialog};

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let title = Line::from(vec![
        Span::styled(
            " Fleet Admin ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  Vehicles"),
    ]);
    frame.render_widget(Paragraph::new(title), chunks[0]);

    let table = build_table(&app.columns, &app.rows, app.loading, app.error.as_deref())
        .block(Block::default().borders(Borders::ALL).title(" Vehicles "));
    frame.render_stateful_widget(table, chunks[1], &mut app.table);

    let status = match &app.status_message {
        Some(message) => Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Green),
        )),
        None => Line::from(Span::styled(
            " q quit  r refresh  / search  a add  e edit  d delete  space select",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(status), chunks[2]);

    match &app.dialog {
        Dialog::Form { mode, .. } => {
            let (title, loading) = app.form_chrome(*mode);
            let dialog = FormDialog::new(title, &app.fields, *mode)
                .loading(loading)
                .error(app.form_error.as_deref());
            frame.render_stateful_widget(dialog, frame.area(), &mut app.form);
        }
        Dialog::Delete { name, .. } => {
            let dialog = DeleteDialog::new(name)
                .title("Delete Vehicle")
                .loading(app.delete_pending());
            frame.render_widget(dialog, frame.area());
        }
        Dialog::None => {}
    }
}
