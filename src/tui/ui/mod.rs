//! UI rendering for the TUI
//!
//! This module handles all rendering using ratatui. The rendering is event-driven -
//! we only render when an event triggers a state change, not at a fixed frame rate.

mod filter_panel;
mod jobs;
mod overlays;
mod widgets;

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::models::JobStatus;
use crate::tui::app::{App, FILTER_PANEL_WIDTH, FilterFocus, ModalState};
use crate::tui::theme::Theme;

use filter_panel::render_filter_panel;
use jobs::render_jobs_view;
use overlays::{
    render_confirm_dialog, render_help_overlay, render_message, render_picker, render_sort_menu,
    render_text_view, render_toast,
};
use widgets::key_hint;

/// Render the entire TUI
pub fn render(app: &App, frame: &mut Frame) {
    let theme = Theme::from_name(&app.config.display.theme);
    let area = frame.area();

    // Main layout: header, content, footer
    let layout = Layout::vertical([
        Constraint::Length(1), // Title bar
        Constraint::Length(1), // Info bar
        Constraint::Min(0),    // Main content
        Constraint::Length(2), // Status bar
    ])
    .split(area);

    render_title_bar(app, frame, layout[0], &theme);
    render_info_bar(app, frame, layout[1], &theme);
    render_content(app, frame, layout[2], &theme);
    render_status_bar(app, frame, layout[3], &theme);

    // Overlays (render in order of z-index)
    match &app.modal {
        ModalState::None => {}
        ModalState::Help => render_help_overlay(frame, area, &theme),
        ModalState::Sort { menu } => render_sort_menu(app, menu, frame, area, &theme),
        ModalState::Confirm { action } => render_confirm_dialog(action, frame, area, &theme),
        ModalState::Picker(picker) => render_picker(picker, frame, area, &theme),
        ModalState::TextView(view) => render_text_view(view, frame, area, &theme),
        ModalState::Message { text, fatal } => render_message(text, *fatal, frame, area, &theme),
    }

    // Notification toast (always on top)
    if let Some(notification) = app.feedback.current() {
        render_toast(notification, frame, area, &theme);
    }
}

fn render_title_bar(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled(" batchmon ", Style::default().fg(theme.header_fg).bg(theme.header_bg).bold()),
        Span::raw(" "),
        Span::styled(app.queue_name(), Style::default().fg(theme.border_focused).bold()),
        Span::styled(format!(" @ {}", app.region()), Style::default().fg(theme.muted)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_info_bar(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let total = app.jobs.len();
    let shown = app.visible_records().len();

    let mut spans = vec![Span::styled(
        if shown == total {
            format!(" {} jobs", total)
        } else {
            format!(" {} jobs ({} shown)", total, shown)
        },
        Style::default().fg(theme.fg),
    )];

    let counts = app.jobs.status_counts();
    for status in [JobStatus::Running, JobStatus::Runnable, JobStatus::Failed] {
        if let Some(count) = counts.get(&status) {
            spans.push(Span::styled(" | ", Style::default().fg(theme.muted)));
            spans.push(Span::styled(
                format!("{} {}", count, status.as_str().to_lowercase()),
                Style::default().fg(theme.job_status_color(status)),
            ));
        }
    }

    let marked = app.jobs.selected_count();
    if marked > 0 {
        spans.push(Span::styled(" | ", Style::default().fg(theme.muted)));
        spans.push(Span::styled(
            format!("{} marked", marked),
            Style::default().fg(theme.marked).bold(),
        ));
    }

    if app.refresh.is_loading() {
        spans.push(Span::styled(" | ", Style::default().fg(theme.muted)));
        spans.push(Span::styled("Loading...", Style::default().fg(theme.pending)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_content(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    if !app.shows_filter_panel(area.width) {
        render_jobs_view(app, frame, area, theme);
        return;
    }

    let layout = Layout::horizontal([
        Constraint::Length(FILTER_PANEL_WIDTH),
        Constraint::Min(0),
    ])
    .split(area);

    render_filter_panel(app, frame, layout[0], theme);
    render_jobs_view(app, frame, layout[1], theme);
}

fn render_status_bar(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let layout = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(area);

    // Keybindings line - context-sensitive
    let hints: &[(&str, &str)] = match app.filter_panel.focus {
        FilterFocus::Name => &[("type", "filter"), ("Enter/Esc", "done"), ("Tab", "next")],
        FilterFocus::Statuses => &[("j/k", "move"), ("Space", "toggle"), ("Tab", "next")],
        FilterFocus::Table => &[
            ("Space", "mark"),
            ("e", "expand"),
            ("d", "details"),
            ("l", "logs"),
            ("K", "terminate"),
            ("s", "sort"),
            ("/", "filter"),
            ("r", "refresh"),
            ("?", "help"),
            ("q", "quit"),
        ],
    };
    let mut keybinds = vec![Span::raw(" ")];
    for (key, label) in hints {
        keybinds.extend(key_hint(key, label, theme));
    }
    frame.render_widget(Paragraph::new(Line::from(keybinds)), layout[0]);

    let mut status_parts = Vec::new();

    if let Some(column) = app.jobs.sort_state().column {
        let dir = if app.jobs.sort_state().ascending {
            "ASC"
        } else {
            "DESC"
        };
        status_parts.push(Span::styled(
            format!(" Sort:{}/{}", column.label(), dir),
            Style::default().fg(theme.border_focused),
        ));
    }

    // Config warnings stay until the config file is fixed
    if let Some(first) = app.feedback.config_warnings.first() {
        let warning_text = match app.feedback.config_warnings.len() {
            1 => format!(" | WARN: {}", first),
            n => format!(" | WARN: {} (+{} more)", first, n - 1),
        };
        status_parts.push(Span::styled(
            warning_text,
            Style::default().fg(theme.pending),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(status_parts)), layout[1]);
}
