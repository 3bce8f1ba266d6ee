//! Filter panel: name prefix input and status checklist

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::models::JobStatus;
use crate::tui::app::{App, FilterFocus};
use crate::tui::theme::Theme;

use super::widgets::input_line;

pub fn render_filter_panel(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let layout = Layout::vertical([
        Constraint::Length(3), // Name input
        Constraint::Min(0),    // Status checklist
    ])
    .split(area);

    render_name_input(app, frame, layout[0], theme);
    render_status_list(app, frame, layout[1], theme);
}

fn panel_block<'a>(title: &'a str, focused: bool, theme: &Theme) -> Block<'a> {
    let color = if focused {
        theme.border_focused
    } else {
        theme.border
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title)
}

fn render_name_input(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let focused = app.filter_panel.focus == FilterFocus::Name;
    let line = input_line("", &app.filter.name_prefix, focused, theme);
    let para = Paragraph::new(line).block(panel_block(" Name starts with ", focused, theme));
    frame.render_widget(para, area);
}

fn render_status_list(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let focused = app.filter_panel.focus == FilterFocus::Statuses;
    let counts = app.jobs.status_counts();

    let lines: Vec<Line> = JobStatus::ALL
        .iter()
        .enumerate()
        .map(|(i, status)| {
            let checked = if app.filter.statuses.contains(status) {
                "[x]"
            } else {
                "[ ]"
            };
            let count = counts.get(status).copied().unwrap_or(0);
            let mut line = Line::from(vec![
                Span::raw(format!(" {} ", checked)),
                Span::styled(
                    format!("{:<10}", status.as_str()),
                    Style::default().fg(theme.job_status_color(*status)),
                ),
                Span::styled(format!("{:>5}", count), Style::default().fg(theme.muted)),
            ]);
            if focused && i == app.filter_panel.status_cursor {
                line = line.style(Style::default().bg(theme.selected_bg));
            }
            line
        })
        .collect();

    let para = Paragraph::new(lines).block(panel_block(" Status ", focused, theme));
    frame.render_widget(para, area);
}
