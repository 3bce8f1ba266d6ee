//! Overlay and popup rendering
//!
//! Handles rendering of help, sort menu, confirm dialog, queue/region picker,
//! text viewer, message box and toast notifications.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::app::{
    App, ConfirmAction, Notification, PickerState, SortMenuState, TextViewState,
};
use crate::tui::theme::Theme;

use super::widgets::{centered_rect, input_line, key_hint, window_start};

fn section(title: &str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(theme.border_focused).bold(),
    ))
}

pub fn render_help_overlay(frame: &mut Frame, area: Rect, theme: &Theme) {
    let popup_area = centered_rect(60, 85, area);
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(Span::styled(
            "batchmon - Keyboard Shortcuts",
            Style::default().bold(),
        )),
        Line::from(""),
        section("Navigation", theme),
        Line::from("  j / Down       Move cursor down"),
        Line::from("  k / Up         Move cursor up"),
        Line::from("  g / Home       Jump to top"),
        Line::from("  G / End        Jump to bottom"),
        Line::from("  Ctrl+d / PgDn  Page down"),
        Line::from("  Ctrl+u / PgUp  Page up"),
        Line::from("  Mouse click    Move cursor to row"),
        Line::from("  Header click   Sort by that column"),
        Line::from(""),
        section("Jobs", theme),
        Line::from("  Space / Enter  Mark or unmark job"),
        Line::from("  a              Mark all shown jobs"),
        Line::from("  x              Clear marks"),
        Line::from("  e              Expand or collapse array job"),
        Line::from("  d              Show job details"),
        Line::from("  l              Show job logs"),
        Line::from("  K              Terminate marked jobs (or the one under the cursor)"),
        Line::from("  y              Copy job ID to clipboard"),
        Line::from("  s              Sort by column"),
        Line::from("  r              Refresh"),
        Line::from(""),
        section("Filter", theme),
        Line::from("  /              Edit name filter"),
        Line::from("  Tab            Cycle focus: name, status, table"),
        Line::from("  f              Show or hide the filter panel"),
        Line::from(""),
        section("General", theme),
        Line::from("  c              Change job queue"),
        Line::from("  R              Change region"),
        Line::from("  ? / F1         Show this help"),
        Line::from("  Esc            Close overlay"),
        Line::from("  q              Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? or Esc to close this help",
            Style::default().fg(theme.muted),
        )),
    ];

    let help_para = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border_focused))
                .title(" Help "),
        )
        .style(Style::default().fg(theme.fg));

    frame.render_widget(help_para, popup_area);
}

/// Render the sort menu
pub fn render_sort_menu(app: &App, menu: &SortMenuState, frame: &mut Frame, area: Rect, theme: &Theme) {
    let popup_area = centered_rect(30, 40, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .title(" Sort By ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let sort = app.jobs.sort_state();
    let mut lines = vec![Line::from("")];

    for (i, column) in menu.columns.iter().enumerate() {
        let is_selected = i == menu.selected;
        let is_current = sort.column == Some(*column);

        let prefix = if is_selected { "> " } else { "  " };
        let suffix = match sort.indicator(*column) {
            Some(arrow) => format!(" {}", arrow),
            None => String::new(),
        };

        let style = if is_selected {
            Style::default().fg(theme.selected_fg).bg(theme.selected_bg)
        } else if is_current {
            Style::default().fg(theme.border_focused)
        } else {
            Style::default()
        };

        lines.push(Line::from(Span::styled(
            format!("{}{}{}", prefix, column.label(), suffix),
            style,
        )));
    }

    lines.push(Line::from(""));
    let mut footer = key_hint("[Enter]", "Sort", theme);
    footer.extend(key_hint("[Esc]", "Cancel", theme));
    lines.push(Line::from(footer));

    let para = Paragraph::new(lines).style(Style::default().fg(theme.fg));
    frame.render_widget(para, inner);
}

/// Render the confirmation dialog
pub fn render_confirm_dialog(action: &ConfirmAction, frame: &mut Frame, area: Rect, theme: &Theme) {
    let popup_area = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.pending))
        .title(" Confirm ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(action.description(), Style::default().bold()),
        ]),
    ];

    let ConfirmAction::TerminateJobs { job_names, .. } = action;
    if job_names.len() > 1 {
        let shown = inner.height.saturating_sub(6) as usize;
        for name in job_names.iter().take(shown) {
            lines.push(Line::from(Span::styled(
                format!("    {}", name),
                Style::default().fg(theme.muted),
            )));
        }
        if job_names.len() > shown {
            lines.push(Line::from(Span::styled(
                format!("    ... and {} more", job_names.len() - shown),
                Style::default().fg(theme.muted),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("  Press "),
        Span::styled("[y/Enter]", Style::default().fg(theme.pending).bold()),
        Span::raw(" to confirm, "),
        Span::styled("[n/Esc]", Style::default().fg(theme.muted).bold()),
        Span::raw(" to cancel"),
    ]));

    let para = Paragraph::new(lines).style(Style::default().fg(theme.fg));
    frame.render_widget(para, inner);
}

/// Render the queue or region picker
pub fn render_picker(picker: &PickerState, frame: &mut Frame, area: Rect, theme: &Theme) {
    let popup_area = centered_rect(40, 60, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .title(format!(" {} ", picker.kind.title()));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let layout = Layout::vertical([
        Constraint::Length(1), // Query
        Constraint::Length(1), // Spacer
        Constraint::Min(0),    // Items
    ])
    .split(inner);

    frame.render_widget(
        Paragraph::new(input_line("> ", &picker.query, true, theme)),
        layout[0],
    );

    if picker.items.is_none() {
        frame.render_widget(
            Paragraph::new("Loading...").style(Style::default().fg(theme.muted)),
            layout[2],
        );
        return;
    }

    let matching = picker.matching();
    if matching.is_empty() {
        frame.render_widget(
            Paragraph::new("No matches").style(Style::default().fg(theme.muted)),
            layout[2],
        );
        return;
    }

    let height = layout[2].height as usize;
    let start = window_start(
        picker.list.selected.saturating_sub(height / 2),
        height,
        matching.len(),
    );
    let lines: Vec<Line> = matching
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(i, item)| {
            if i == picker.list.selected {
                Line::from(Span::styled(
                    format!("> {}", item),
                    Style::default().fg(theme.selected_fg).bg(theme.selected_bg),
                ))
            } else {
                Line::from(format!("  {}", item))
            }
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines).style(Style::default().fg(theme.fg)),
        layout[2],
    );
}

/// Render the details / logs viewer
pub fn render_text_view(view: &TextViewState, frame: &mut Frame, area: Rect, theme: &Theme) {
    let popup_area = centered_rect(90, 85, area);
    frame.render_widget(Clear, popup_area);

    let title = if view.loading {
        format!(" {} (loading...) ", view.title)
    } else {
        format!(" {} ({} lines) ", view.title, view.lines.len())
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .title(title)
        .title_bottom(Line::from(vec![
            Span::styled(" [j/k] ", Style::default().fg(theme.muted)),
            Span::styled("Scroll ", Style::default().fg(theme.muted)),
            Span::styled("[G] ", Style::default().fg(theme.muted)),
            Span::styled("Follow ", Style::default().fg(theme.muted)),
            Span::styled("[y] ", Style::default().fg(theme.muted)),
            Span::styled("Copy ", Style::default().fg(theme.muted)),
            Span::styled("[Esc] ", Style::default().fg(theme.muted)),
            Span::styled("Close ", Style::default().fg(theme.muted)),
        ]));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let height = inner.height as usize;
    let start = if view.follow {
        view.lines.len().saturating_sub(height)
    } else {
        window_start(view.scroll, height, view.lines.len())
    };

    let lines: Vec<Line> = view
        .lines
        .iter()
        .skip(start)
        .take(height)
        .map(|l| Line::from(l.as_str()))
        .collect();

    frame.render_widget(
        Paragraph::new(lines).style(Style::default().fg(theme.fg)),
        inner,
    );
}

/// Render a blocking message box
pub fn render_message(text: &str, fatal: bool, frame: &mut Frame, area: Rect, theme: &Theme) {
    let popup_area = centered_rect(50, 25, area);
    frame.render_widget(Clear, popup_area);

    let (title, color, hint) = if fatal {
        (" Error ", theme.failed, "Press Enter to quit")
    } else {
        (" Error ", theme.pending, "Press Enter or Esc to dismiss")
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(text, Style::default().bold())),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(theme.muted))),
    ];

    let para = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title),
        )
        .style(Style::default().fg(theme.fg))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(para, popup_area);
}

/// Render the transient notification toast
pub fn render_toast(notification: &Notification, frame: &mut Frame, area: Rect, theme: &Theme) {
    let toast_width = (notification.message.chars().count() + 4).min(60) as u16;
    let toast_area = Rect {
        x: area.width.saturating_sub(toast_width + 2),
        y: area.height.saturating_sub(5),
        width: toast_width.min(area.width),
        height: 3.min(area.height),
    };

    frame.render_widget(Clear, toast_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.severity_color(notification.severity)));

    let para = Paragraph::new(format!(" {} ", notification.message))
        .block(block)
        .style(Style::default().fg(theme.fg))
        .alignment(Alignment::Center);

    frame.render_widget(para, toast_area);
}
