//! Form rendering driven by the active preset

use super::field_renderer::draw_field;
use crate::app::App;
use crate::presets::FieldKind;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Draw the active form
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let mut constraints: Vec<Constraint> = app
        .preset
        .fields
        .iter()
        .map(|spec| match spec.kind {
            FieldKind::Multiline => Constraint::Min(5),
            _ => Constraint::Length(3),
        })
        .collect();
    constraints.push(Constraint::Length(2)); // Help text

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(area);

    let border_color = if app.engine.is_submitting() {
        Color::Yellow
    } else {
        Color::Cyan
    };
    let block = Block::default()
        .title(format!(" {} ", app.form_kind().title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    frame.render_widget(block, area);

    for (idx, spec) in app.preset.fields.iter().enumerate() {
        draw_field(
            frame,
            chunks[idx],
            spec,
            app.engine.value(spec.path),
            app.draft_text(idx),
            app.visible_error(spec.path),
            app.active_field == idx,
        );
    }

    let on_toggle = app.active_spec().map(|s| s.kind) == Some(FieldKind::Toggle);
    let mut help_spans = Vec::new();
    if on_toggle {
        help_spans.push(Span::styled("Space", Style::default().fg(Color::Cyan)));
        help_spans.push(Span::raw(": toggle  "));
    }
    if app.active_spec().map(|s| s.kind) == Some(FieldKind::Files) {
        help_spans.push(Span::styled("Enter", Style::default().fg(Color::Cyan)));
        help_spans.push(Span::raw(": attach path  "));
    }
    help_spans.extend([
        Span::styled("Tab", Style::default().fg(Color::Cyan)),
        Span::raw(": next field  "),
        Span::styled(
            crate::platform::SAVE_SHORTCUT,
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(": submit  "),
        Span::styled("Esc", Style::default().fg(Color::Cyan)),
        Span::raw(": reset"),
    ]);

    let help = Paragraph::new(Line::from(help_spans)).style(Style::default().fg(Color::DarkGray));
    if let Some(help_area) = chunks.last() {
        frame.render_widget(help, *help_area);
    }
}
