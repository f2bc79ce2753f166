//! Field rendering utilities for forms

use crate::forms::FieldValue;
use crate::presets::{FieldKind, FieldSpec};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Draw one form field with its label, current value and error (if any)
pub fn draw_field(
    frame: &mut Frame,
    area: Rect,
    spec: &FieldSpec,
    value: Option<&FieldValue>,
    draft: Option<&str>,
    error: Option<&str>,
    is_active: bool,
) {
    let style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let border_style = match (error, is_active) {
        (Some(_), _) => Style::default().fg(Color::Red),
        (None, true) => Style::default().fg(Color::Cyan),
        (None, false) => Style::default().fg(Color::DarkGray),
    };

    let display_str = display_for(spec.kind, value, draft, is_active);
    let cursor = if is_active && spec.kind != FieldKind::Toggle {
        "▌"
    } else {
        ""
    };

    let content = if spec.kind == FieldKind::Multiline {
        let mut lines: Vec<Line> = display_str
            .lines()
            .map(|l| Line::from(l.to_string()))
            .collect();
        if is_active {
            if let Some(last) = lines.last_mut() {
                last.spans
                    .push(Span::styled(cursor, Style::default().fg(Color::Cyan)));
            } else {
                lines.push(Line::from(Span::styled(
                    cursor,
                    Style::default().fg(Color::Cyan),
                )));
            }
        }
        Paragraph::new(lines)
    } else {
        Paragraph::new(Line::from(vec![
            Span::styled(display_str, style),
            Span::styled(cursor, Style::default().fg(Color::Cyan)),
        ]))
    };

    let mut block = Block::default()
        .title(format!(" {} ", spec.label))
        .borders(Borders::ALL)
        .border_style(border_style);
    if let Some(error) = error {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {error} "),
            Style::default().fg(Color::Red),
        )));
    }

    frame.render_widget(content.wrap(Wrap { trim: false }).block(block), area);
}

/// Text shown inside a field box
///
/// `draft` is text typed but not stored verbatim: a number being entered
/// or a file path waiting to be attached.
pub fn display_for(
    kind: FieldKind,
    value: Option<&FieldValue>,
    draft: Option<&str>,
    is_active: bool,
) -> String {
    let raw = value.map(FieldValue::display_value).unwrap_or_default();
    match (kind, draft) {
        (FieldKind::Number, Some(text)) => return text.to_string(),
        (FieldKind::Files, Some(path)) => return format!("{raw}  + {path}"),
        _ => {}
    }
    match kind {
        FieldKind::Toggle => {
            let checked = value.and_then(FieldValue::as_bool).unwrap_or(false);
            let mark = if checked { "[x]" } else { "[ ]" };
            mark.to_string()
        }
        FieldKind::Secret => "•".repeat(raw.chars().count()),
        _ if raw.is_empty() && !is_active => "(empty)".to_string(),
        _ => raw,
    }
}
