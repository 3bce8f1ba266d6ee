//! Jobs table rendering

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::tui::app::{
    App, DisplayRow, FilterFocus, JOB_TABLE_COLUMN_SPACING, JOB_TABLE_WIDTHS, JobRecord,
    JobSortColumn,
};
use crate::tui::theme::Theme;

use super::widgets::create_table_header;

pub fn render_jobs_view(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let border_color = if app.filter_panel.focus == FilterFocus::Table {
        theme.border_focused
    } else {
        theme.border
    };
    let title = match app.filter.summary() {
        Some(summary) => format!(" Jobs in {} ({}) ", app.queue_name(), summary),
        None => format!(" Jobs in {} ", app.queue_name()),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible = app.visible_records();
    if visible.is_empty() {
        let msg = if app.refresh.is_loading() {
            "Loading jobs..."
        } else if app.jobs.is_empty() {
            "No jobs found"
        } else {
            "No jobs match the filter"
        };
        let para = Paragraph::new(msg)
            .style(Style::default().fg(theme.muted))
            .alignment(Alignment::Center);
        frame.render_widget(para, inner);
        return;
    }

    let header = create_table_header(header_labels(app), theme);

    let available_height = inner.height.saturating_sub(1) as usize; // -1 for header
    let selected = app.list_state.selected;
    let scroll_offset = app.list_state.scroll_offset;
    let name_max_len = app.config.display.job_name_max_length;

    let rows: Vec<Row> = visible
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(available_height)
        .map(|(display_idx, record)| job_to_row(record, display_idx == selected, name_max_len, theme))
        .collect();

    let table = Table::new(rows, JOB_TABLE_WIDTHS)
        .column_spacing(JOB_TABLE_COLUMN_SPACING)
        .header(header)
        .row_highlight_style(Style::default().bg(theme.selected_bg));

    frame.render_widget(table, inner);
}

/// Column titles with the sort arrow on the active column
fn header_labels(app: &App) -> Vec<String> {
    let sort = app.jobs.sort_state();
    let mut labels = vec!["Sel".to_string()];
    labels.extend(JobSortColumn::ALL.iter().map(|column| match sort.indicator(*column) {
        Some(arrow) => format!("{} {}", column.label(), arrow),
        None => column.label().to_string(),
    }));
    labels
}

fn job_to_row<'a>(record: &JobRecord, is_selected: bool, name_max_len: usize, theme: &Theme) -> Row<'a> {
    let display = DisplayRow::from_record(record, name_max_len);
    let status_color = theme.job_status_color(record.job.status);

    let name_style = if record.is_array_parent() {
        Style::default().fg(theme.array_parent)
    } else if record.is_child() {
        Style::default().fg(theme.muted)
    } else {
        Style::default()
    };

    let cells = vec![
        Cell::from(display.marker).style(Style::default().fg(theme.marked).bold()),
        Cell::from(display.name).style(name_style),
        Cell::from(display.job_id),
        Cell::from(display.created),
        Cell::from(display.status).style(Style::default().fg(status_color)),
    ];

    let mut row = Row::new(cells);
    if record.selected {
        row = row.style(Style::default().fg(theme.marked));
    }
    if is_selected {
        row = row.style(Style::default().bg(theme.selected_bg).fg(theme.selected_fg));
    }
    row
}
