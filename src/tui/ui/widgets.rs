//! Reusable UI widgets and helper functions
//!
//! This module contains shared rendering utilities used across the views.

use ratatui::prelude::*;
use ratatui::widgets::{Cell, Row};

use crate::tui::theme::Theme;

/// Create a styled table header row from column names
pub fn create_table_header<'a>(columns: Vec<String>, theme: &Theme) -> Row<'a> {
    let header_cells = columns
        .into_iter()
        .map(|h| Cell::from(h).style(Style::default().fg(theme.header_fg).bold()));
    Row::new(header_cells)
        .style(Style::default().bg(theme.header_bg))
        .height(1)
}

/// Create a centered rectangle
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

/// First line to draw so that `line` stays inside a window of `height` rows
pub fn window_start(line: usize, height: usize, total: usize) -> usize {
    if height == 0 || total <= height {
        return 0;
    }
    line.min(total - height)
}

/// A `[key] label` pair for footers and the keybind line
pub fn key_hint<'a>(key: &'a str, label: &'a str, theme: &Theme) -> Vec<Span<'a>> {
    vec![
        Span::styled(key, Style::default().fg(theme.border_focused).bold()),
        Span::styled(format!(" {}  ", label), Style::default().fg(theme.muted)),
    ]
}

/// Single-line text input with a block cursor
pub fn input_line<'a>(prompt: &'a str, value: &'a str, focused: bool, theme: &Theme) -> Line<'a> {
    let mut spans = vec![
        Span::styled(prompt, Style::default().fg(theme.muted)),
        Span::styled(value, Style::default().fg(theme.fg)),
    ];
    if focused {
        spans.push(Span::styled(" ", Style::default().bg(theme.fg)));
    }
    Line::from(spans)
}
