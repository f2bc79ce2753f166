//! Layout components (form list sidebar, status bar)

use crate::app::App;
use crate::presets::FormKind;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Create the main layout with sidebar
pub fn create_layout(area: Rect) -> (Rect, Rect) {
    // Reserve bottom line for status bar
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(22), // Sidebar
            Constraint::Min(0),     // Main content
        ])
        .split(rows[0]);

    (chunks[0], chunks[1])
}

/// Draw the list of portal forms
pub fn draw_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = FormKind::ALL
        .iter()
        .map(|kind| {
            let style = if *kind == app.form_kind() {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(Span::styled(kind.title(), style)))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Forms ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(list, area);
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mut spans = vec![];

    // Submission status
    let submit_status = if app.engine.is_submitting() {
        Span::styled(" ● saving ", Style::default().fg(Color::Yellow))
    } else if app.engine.is_valid() {
        Span::styled(" ● ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" ● ", Style::default().fg(Color::Red))
    };
    spans.push(submit_status);

    spans.push(Span::styled(
        format!("{}: switch form  Ctrl+C: quit", crate::platform::SWITCH_FORM_SHORTCUT),
        Style::default().fg(Color::DarkGray),
    ));

    if let Some((msg, is_error)) = &app.status_message {
        let color = if *is_error { Color::Red } else { Color::Green };
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(color)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), status_area);
}
