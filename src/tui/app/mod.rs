//! Application state and core logic for the TUI
//!
//! `App` owns all UI state and is only touched by the event loop. Remote
//! work (listing, expansion, details, logs, termination) runs on background
//! tasks that report back as `DataEvent`s, applied in `handle_data`.

mod filter;
mod job_list;
mod state;
mod types;

pub use filter::FilterSettings;
pub use job_list::{ExpandAction, JobList, JobListError};
pub use state::{
    ConfirmAction, FeedbackState, FilterFocus, FilterPanelState, ListState, ModalState,
    Notification, PickerKind, PickerState, RefreshSlot, Severity, SortMenuState, TextViewState,
};
pub use types::{
    DisplayRow, JOB_TABLE_COLUMN_SPACING, JOB_TABLE_WIDTHS, JobRecord, JobSortColumn, SortState,
    job_table_column_at,
};

use std::collections::HashSet;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::batch::{BatchError, DEFAULT_TERMINATE_REASON, QueueClient};
use crate::models::{AppConfig, Job, JobStatus};
use crate::tui::event::{DataEvent, EventResult, InputEvent, KeyAction};

/// Log lines are forwarded at page boundaries or after this many lines
const LOG_BATCH_LINES: usize = 100;

/// Screen row of the first job row: title, info bar, table border, header
const TABLE_CONTENT_START: u16 = 4;

/// Rows taken by everything around the table body
const TABLE_CHROME_ROWS: u16 = 7;

/// Width of the filter panel including borders
pub const FILTER_PANEL_WIDTH: u16 = 28;

/// Lines scrolled per page in the text viewer
const TEXT_PAGE_LINES: usize = 20;

/// Main application state
pub struct App {
    pub running: bool,
    pub modal: ModalState,

    // Job list
    pub jobs: JobList,
    pub filter: FilterSettings,
    pub filter_panel: FilterPanelState,
    pub list_state: ListState,
    terminal_width: u16,

    // Background work
    pub refresh: RefreshSlot,
    generation: u64,
    expanding: HashSet<String>,
    next_viewer_id: u64,
    fatal_shown: bool,

    pub feedback: FeedbackState,
    pub config: AppConfig,

    // Communication
    client: QueueClient,
    data_tx: mpsc::Sender<DataEvent>,
    shutdown: CancellationToken,
}

impl App {
    /// Create the application.
    ///
    /// Background tasks report through `data_tx` and stop once `shutdown`
    /// is cancelled.
    pub fn new(
        config: AppConfig,
        config_warnings: Vec<String>,
        client: QueueClient,
        data_tx: mpsc::Sender<DataEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        let filter_panel = FilterPanelState {
            visible: config.display.show_filter,
            ..Default::default()
        };

        Self {
            running: true,
            modal: ModalState::None,
            jobs: JobList::new(),
            filter: FilterSettings::default(),
            filter_panel,
            list_state: ListState::default(),
            terminal_width: 0,
            refresh: RefreshSlot::Idle,
            generation: 0,
            expanding: HashSet::new(),
            next_viewer_id: 0,
            fatal_shown: false,
            feedback: FeedbackState::new(config_warnings),
            config,
            client,
            data_tx,
            shutdown,
        }
    }

    // ------------------------------------------------------------------
    // Accessors used by the renderer
    // ------------------------------------------------------------------

    #[must_use]
    pub fn queue_name(&self) -> &str {
        &self.config.queue.name
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.config.aws.region
    }

    /// Records that pass the current filter, in display order
    #[must_use]
    pub fn visible_records(&self) -> Vec<&JobRecord> {
        self.jobs
            .records()
            .iter()
            .filter(|r| self.filter.matches(&r.job))
            .collect()
    }

    fn visible_len(&self) -> usize {
        self.jobs.visible_indices(&self.filter).len()
    }

    /// Sequence index of the row under the cursor
    #[must_use]
    pub fn highlighted_index(&self) -> Option<usize> {
        self.jobs
            .visible_indices(&self.filter)
            .get(self.list_state.selected)
            .copied()
    }

    #[must_use]
    pub fn highlighted_record(&self) -> Option<&JobRecord> {
        self.highlighted_index().and_then(|i| self.jobs.get(i))
    }

    /// Tell the app the size of the terminal
    pub fn set_terminal_size(&mut self, width: u16, height: u16) {
        self.terminal_width = width;
        self.list_state.visible_count = height.saturating_sub(TABLE_CHROME_ROWS) as usize;
        let len = self.visible_len();
        self.list_state.clamp(len);
    }

    /// Put the cursor on `job_id` if it is visible
    fn focus_job(&mut self, job_id: &str) {
        let visible = self.jobs.visible_indices(&self.filter);
        if let Some(pos) = visible
            .iter()
            .position(|&i| self.jobs.get(i).is_some_and(|r| r.id() == job_id))
        {
            self.list_state.select(pos, visible.len());
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible_len();
        self.list_state.clamp(len);
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Handle an input event
    pub fn handle_input(&mut self, event: InputEvent) -> EventResult {
        match event {
            InputEvent::Key(key_event) => {
                let text_input = self.modal.takes_text_input()
                    || (!self.modal.is_active() && self.filter_panel.focus == FilterFocus::Name);
                let action = KeyAction::from_key_event(key_event, text_input);
                self.handle_action(action)
            }
            InputEvent::Mouse(mouse_event) => {
                let action = KeyAction::from_mouse_event(mouse_event);
                self.handle_action(action)
            }
            InputEvent::Resize(width, height) => {
                self.set_terminal_size(width, height);
                EventResult::Continue
            }
        }
    }

    fn handle_action(&mut self, action: KeyAction) -> EventResult {
        // Modal modes take priority over normal navigation
        match &self.modal {
            ModalState::None => {}
            ModalState::Help => return self.handle_help_action(action),
            ModalState::Sort { .. } => return self.handle_sort_action(action),
            ModalState::Confirm { .. } => return self.handle_confirm_action(action),
            ModalState::Picker(_) => return self.handle_picker_action(action),
            ModalState::TextView(_) => return self.handle_text_view_action(action),
            ModalState::Message { .. } => return self.handle_message_action(action),
        }

        if action == KeyAction::Quit {
            return self.quit();
        }

        match self.filter_panel.focus {
            FilterFocus::Name => {
                if let Some(result) = self.handle_name_filter_action(action) {
                    return result;
                }
            }
            FilterFocus::Statuses => {
                if let Some(result) = self.handle_status_filter_action(action) {
                    return result;
                }
            }
            FilterFocus::Table => {}
        }

        if let Some(result) = self.handle_navigation(&action) {
            return result;
        }

        match action {
            KeyAction::Select | KeyAction::ToggleSelection => {
                self.toggle_selection();
                EventResult::Continue
            }
            KeyAction::SelectAll => {
                self.jobs.select_all(&self.filter);
                EventResult::Continue
            }
            KeyAction::ClearSelection => {
                self.jobs.clear_selection();
                EventResult::Continue
            }
            KeyAction::ToggleExpand => {
                self.toggle_expand();
                EventResult::Continue
            }
            KeyAction::ViewDetails => {
                self.view_details();
                EventResult::Continue
            }
            KeyAction::ViewLogs => {
                self.view_logs();
                EventResult::Continue
            }
            KeyAction::Refresh => {
                if !self.request_refresh() {
                    self.feedback.info("Refresh already in progress");
                }
                EventResult::Continue
            }
            KeyAction::OpenSort => {
                self.modal = ModalState::Sort {
                    menu: SortMenuState::starting_at(self.jobs.sort_state().column),
                };
                EventResult::Continue
            }
            KeyAction::Terminate => {
                self.kill_selected_jobs();
                EventResult::Continue
            }
            KeyAction::YankJobId => {
                self.yank_highlighted_job_id();
                EventResult::Continue
            }
            KeyAction::EditNameFilter => {
                self.filter_panel.visible = true;
                self.filter_panel.focus = FilterFocus::Name;
                EventResult::Continue
            }
            KeyAction::CycleFocus => {
                self.cycle_focus();
                EventResult::Continue
            }
            KeyAction::ToggleFilterPanel => {
                self.filter_panel.visible = !self.filter_panel.visible;
                if !self.filter_panel.visible {
                    self.filter_panel.focus = FilterFocus::Table;
                }
                EventResult::Continue
            }
            KeyAction::ChangeQueue => {
                self.open_picker(PickerKind::Queue);
                EventResult::Continue
            }
            KeyAction::ChangeRegion => {
                self.open_picker(PickerKind::Region);
                EventResult::Continue
            }
            KeyAction::ShowHelp => {
                self.modal = ModalState::Help;
                EventResult::Continue
            }
            KeyAction::MouseClick { row, column } => {
                self.handle_mouse_click(row, column);
                EventResult::Continue
            }
            _ => EventResult::Unchanged,
        }
    }

    fn quit(&mut self) -> EventResult {
        self.running = false;
        EventResult::Quit
    }

    /// Handle navigation actions (returns Some if action was handled)
    fn handle_navigation(&mut self, action: &KeyAction) -> Option<EventResult> {
        let len = self.visible_len();
        let list = &mut self.list_state;
        match action {
            KeyAction::MoveUp | KeyAction::MouseScrollUp => list.move_up(len),
            KeyAction::MoveDown | KeyAction::MouseScrollDown => list.move_down(len),
            KeyAction::MoveToTop => list.move_to_top(),
            KeyAction::MoveToBottom => list.move_to_bottom(len),
            KeyAction::PageUp => list.page_up(len),
            KeyAction::PageDown => list.page_down(len),
            _ => return None,
        }
        Some(EventResult::Continue)
    }

    /// Whether the filter panel takes the left side of the content area
    #[must_use]
    pub fn shows_filter_panel(&self, width: u16) -> bool {
        self.filter_panel.visible && width >= FILTER_PANEL_WIDTH * 2
    }

    /// Horizontal start and width of the job table, borders included
    fn table_span(&self) -> (u16, u16) {
        if self.shows_filter_panel(self.terminal_width) {
            (FILTER_PANEL_WIDTH, self.terminal_width - FILTER_PANEL_WIDTH)
        } else {
            (0, self.terminal_width)
        }
    }

    fn handle_mouse_click(&mut self, row: u16, column: u16) {
        let (table_x, table_width) = self.table_span();
        if column < table_x {
            return;
        }
        if row == TABLE_CONTENT_START - 1 {
            self.handle_header_click(column - table_x, table_width);
            return;
        }
        if row < TABLE_CONTENT_START {
            return;
        }
        self.filter_panel.focus = FilterFocus::Table;
        let target = self.list_state.scroll_offset + (row - TABLE_CONTENT_START) as usize;
        let len = self.visible_len();
        if target < len {
            self.list_state.select(target, len);
        }
    }

    /// Sort by the clicked header column, keeping the cursor on its job
    fn handle_header_click(&mut self, x: u16, table_width: u16) {
        if self.visible_len() == 0 {
            return;
        }
        // One border cell on each side of the table
        let Some(inner_x) = x.checked_sub(1) else {
            return;
        };
        let Some(index) = job_table_column_at(table_width.saturating_sub(2), inner_x) else {
            return;
        };
        let highlighted = self.highlighted_record().map(|r| r.id().to_string());
        if self.jobs.sort_by_column(index)
            && let Some(id) = highlighted
        {
            self.focus_job(&id);
        }
    }

    fn cycle_focus(&mut self) {
        self.filter_panel.visible = true;
        self.filter_panel.focus = self.filter_panel.focus.next();
    }

    fn set_filter(&mut self, filter: FilterSettings) {
        self.filter = filter;
        self.clamp_cursor();
    }

    fn handle_name_filter_action(&mut self, action: KeyAction) -> Option<EventResult> {
        match action {
            KeyAction::TextChar(c) => {
                let mut prefix = self.filter.name_prefix.clone();
                prefix.push(c);
                self.set_filter(self.filter.with_name_prefix(prefix));
            }
            KeyAction::TextBackspace => {
                let mut prefix = self.filter.name_prefix.clone();
                prefix.pop();
                self.set_filter(self.filter.with_name_prefix(prefix));
            }
            KeyAction::TextClear => self.set_filter(self.filter.with_name_prefix("")),
            KeyAction::Select | KeyAction::Escape => self.filter_panel.focus = FilterFocus::Table,
            // Up/Down and Tab fall through to the table and focus handling
            _ => return None,
        }
        Some(EventResult::Continue)
    }

    fn handle_status_filter_action(&mut self, action: KeyAction) -> Option<EventResult> {
        let cursor = &mut self.filter_panel.status_cursor;
        match action {
            KeyAction::MoveUp => *cursor = cursor.saturating_sub(1),
            KeyAction::MoveDown => *cursor = (*cursor + 1).min(JobStatus::ALL.len() - 1),
            KeyAction::Select | KeyAction::ToggleSelection => {
                let status = JobStatus::ALL[*cursor];
                self.set_filter(self.filter.with_status_toggled(status));
            }
            KeyAction::Escape => self.filter_panel.focus = FilterFocus::Table,
            _ => return None,
        }
        Some(EventResult::Continue)
    }

    fn handle_help_action(&mut self, action: KeyAction) -> EventResult {
        match action {
            KeyAction::Escape | KeyAction::ShowHelp | KeyAction::Quit | KeyAction::Select => {
                self.modal.close();
                EventResult::Continue
            }
            _ => EventResult::Unchanged,
        }
    }

    fn handle_sort_action(&mut self, action: KeyAction) -> EventResult {
        match action {
            KeyAction::Escape | KeyAction::Quit => self.modal.close(),
            KeyAction::MoveUp => {
                if let Some(menu) = self.modal.sort_menu_mut() {
                    menu.move_up();
                }
            }
            KeyAction::MoveDown => {
                if let Some(menu) = self.modal.sort_menu_mut() {
                    menu.move_down();
                }
            }
            KeyAction::Select => {
                let column = self
                    .modal
                    .sort_menu_mut()
                    .and_then(|menu| menu.selected_column());
                if let Some(column) = column {
                    let highlighted = self.highlighted_record().map(|r| r.id().to_string());
                    self.jobs.sort_by(column);
                    if let Some(id) = highlighted {
                        self.focus_job(&id);
                    }
                }
                self.modal.close();
            }
            _ => return EventResult::Unchanged,
        }
        EventResult::Continue
    }

    fn handle_confirm_action(&mut self, action: KeyAction) -> EventResult {
        match action {
            KeyAction::Select | KeyAction::TextChar('y') | KeyAction::TextChar('Y') => {
                if let ModalState::Confirm { action } = std::mem::take(&mut self.modal) {
                    match action {
                        ConfirmAction::TerminateJobs { job_ids, .. } => {
                            self.execute_terminate(job_ids)
                        }
                    }
                }
                EventResult::Continue
            }
            KeyAction::Escape | KeyAction::TextChar('n') | KeyAction::TextChar('N') => {
                self.modal.close();
                EventResult::Continue
            }
            _ => EventResult::Unchanged,
        }
    }

    fn handle_picker_action(&mut self, action: KeyAction) -> EventResult {
        let ModalState::Picker(picker) = &mut self.modal else {
            return EventResult::Unchanged;
        };
        let len = picker.matching().len();
        match action {
            KeyAction::Escape | KeyAction::Quit => self.modal.close(),
            KeyAction::MoveUp => picker.list.move_up(len),
            KeyAction::MoveDown => picker.list.move_down(len),
            KeyAction::TextChar(c) => picker.push_char(c),
            KeyAction::TextBackspace => picker.pop_char(),
            KeyAction::TextClear => {
                picker.query.clear();
                picker.list.move_to_top();
            }
            KeyAction::Select => {
                let kind = picker.kind;
                let choice = picker.selected_item();
                self.modal.close();
                if let Some(choice) = choice {
                    self.apply_picker_choice(kind, choice);
                }
            }
            _ => return EventResult::Unchanged,
        }
        EventResult::Continue
    }

    fn handle_text_view_action(&mut self, action: KeyAction) -> EventResult {
        if matches!(action, KeyAction::YankJobId) {
            if let Some(text) = self.modal.text_view().map(TextViewState::text) {
                self.copy_with_feedback(&text, "Copied viewer contents".to_string());
            }
            return EventResult::Continue;
        }

        let ModalState::TextView(view) = &mut self.modal else {
            return EventResult::Unchanged;
        };
        match action {
            KeyAction::Escape | KeyAction::Quit | KeyAction::Select => self.modal.close(),
            KeyAction::MoveUp | KeyAction::MouseScrollUp => view.scroll_up(1),
            KeyAction::MoveDown | KeyAction::MouseScrollDown => view.scroll_down(1),
            KeyAction::PageUp => view.scroll_up(TEXT_PAGE_LINES),
            KeyAction::PageDown => view.scroll_down(TEXT_PAGE_LINES),
            KeyAction::MoveToTop => view.scroll_to_top(),
            KeyAction::MoveToBottom => view.scroll_to_bottom(),
            _ => return EventResult::Unchanged,
        }
        EventResult::Continue
    }

    fn handle_message_action(&mut self, action: KeyAction) -> EventResult {
        match action {
            KeyAction::Escape | KeyAction::Select | KeyAction::Quit => {
                if self.modal.is_fatal() {
                    return self.quit();
                }
                self.modal.close();
                EventResult::Continue
            }
            _ => EventResult::Unchanged,
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    fn toggle_selection(&mut self) {
        if let Some(index) = self.highlighted_index()
            && let Err(e) = self.jobs.toggle_selected(index)
        {
            tracing::warn!("Toggle selection failed: {}", e);
        }
    }

    fn yank_highlighted_job_id(&mut self) {
        if let Some(record) = self.highlighted_record() {
            let job_id = record.id().to_string();
            self.copy_with_feedback(&job_id, format!("Copied: {}", job_id));
        }
    }

    fn copy_with_feedback(&mut self, text: &str, success: String) {
        if !self.config.behavior.copy_to_clipboard {
            self.feedback.warn("Clipboard support is disabled");
            return;
        }
        match copy_to_clipboard(text) {
            Ok(()) => self.feedback.info(success),
            Err(e) => {
                tracing::warn!("Clipboard copy failed: {}", e);
                self.feedback.error("Failed to copy (no clipboard)");
            }
        }
    }

    // ------------------------------------------------------------------
    // Refresh
    // ------------------------------------------------------------------

    /// Start a refresh unless one is already running.
    ///
    /// Returns false when the request was dropped.
    pub fn request_refresh(&mut self) -> bool {
        if self.refresh.is_loading() || self.fatal_shown {
            tracing::debug!("Refresh request dropped");
            return false;
        }
        self.start_refresh();
        true
    }

    /// Cancel the in-flight refresh (if any) and start over
    pub fn restart_refresh(&mut self) {
        if self.fatal_shown {
            return;
        }
        self.refresh.cancel();
        self.start_refresh();
    }

    fn start_refresh(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        let cancel = self.shutdown.child_token();
        self.refresh = RefreshSlot::Loading {
            generation,
            cancel: cancel.clone(),
        };

        self.jobs.begin_refresh();
        self.expanding.clear();
        self.list_state.move_to_top();

        tracing::debug!(
            "Refresh {} of queue {} in {}",
            generation,
            self.config.queue.name,
            self.config.aws.region
        );

        let client = self.client.clone();
        let queue = self.config.queue.name.clone();
        let tx = self.data_tx.clone();
        tokio::task::spawn_blocking(move || {
            for item in client.list_jobs(&queue) {
                if cancel.is_cancelled() {
                    return;
                }
                let event = match item {
                    Ok(job) => DataEvent::JobLoaded { generation, job },
                    Err(error) => {
                        let _ = tx.blocking_send(DataEvent::RefreshFailed { generation, error });
                        return;
                    }
                };
                if tx.blocking_send(event).is_err() {
                    return;
                }
            }
            let _ = tx.blocking_send(DataEvent::RefreshFinished { generation });
        });
    }

    // ------------------------------------------------------------------
    // Expand / collapse
    // ------------------------------------------------------------------

    fn toggle_expand(&mut self) {
        let Some(index) = self.highlighted_index() else {
            return;
        };
        match self.jobs.toggle_expand(index) {
            Ok(ExpandAction::Expand { parent }) => self.expand_array_job(parent),
            Ok(ExpandAction::Collapsed { parent_id }) => self.focus_job(&parent_id),
            Ok(ExpandAction::NotArrayJob) => self.feedback.warn("Can only expand array jobs"),
            Err(e) => {
                tracing::error!("Expand failed: {}", e);
                self.feedback.error(e.to_string());
            }
        }
        self.clamp_cursor();
    }

    /// Fetch the children of `parent` in the background.
    ///
    /// A second request for a parent whose expansion is still running is ignored.
    fn expand_array_job(&mut self, parent: Job) {
        if !self.expanding.insert(parent.job_id.clone()) {
            return;
        }
        self.feedback.info(format!(
            "Expanding array job {}, hang tight...",
            parent.job_name
        ));

        let refresh_generation = self.generation;
        let client = self.client.clone();
        let tx = self.data_tx.clone();
        let cancel = self.shutdown.clone();
        tokio::task::spawn_blocking(move || {
            let mut children = Vec::new();
            let mut failure = None;
            for item in client.list_array_children(&parent.job_id) {
                if cancel.is_cancelled() {
                    return;
                }
                match item {
                    Ok(job) => children.push(job),
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }
            let _ = tx.blocking_send(DataEvent::ChildrenLoaded {
                refresh_generation,
                parent_id: parent.job_id,
                parent_name: parent.job_name,
                result: failure.map_or(Ok(children), Err),
            });
        });
    }

    // ------------------------------------------------------------------
    // Details and logs
    // ------------------------------------------------------------------

    fn open_viewer(&mut self, title: String, cancel: Option<CancellationToken>) -> u64 {
        self.next_viewer_id += 1;
        let viewer_id = self.next_viewer_id;
        self.modal
            .replace(ModalState::TextView(TextViewState::loading(viewer_id, title, cancel)));
        viewer_id
    }

    fn view_details(&mut self) {
        let Some(job) = self.highlighted_record().map(|r| r.job.clone()) else {
            return;
        };
        let viewer_id = self.open_viewer(format!("Details: {}", job.job_name), None);

        let client = self.client.clone();
        let tx = self.data_tx.clone();
        tokio::spawn(async move {
            let result = client
                .describe_jobs(std::slice::from_ref(&job.job_arn))
                .await
                .map(|described| described.into_iter().next());
            let _ = tx
                .send(DataEvent::DetailsLoaded {
                    viewer_id,
                    job_id: job.job_id,
                    result,
                })
                .await;
        });
    }

    fn view_logs(&mut self) {
        let Some(record) = self.highlighted_record() else {
            return;
        };
        let job = record.job.clone();
        let is_array_job = record.is_array_job();

        let cancel = self.shutdown.child_token();
        let viewer_id = self.open_viewer(format!("Logs: {}", job.job_name), Some(cancel.clone()));

        let client = self.client.clone();
        let tx = self.data_tx.clone();
        tokio::spawn(async move {
            let described = match client.describe_jobs(std::slice::from_ref(&job.job_arn)).await {
                Ok(described) => described,
                Err(error) => {
                    let _ = tx
                        .send(DataEvent::LogStreamEnded {
                            viewer_id,
                            error: Some(error),
                        })
                        .await;
                    return;
                }
            };

            let stream = described
                .into_iter()
                .next()
                .and_then(|d| d.job.log_stream_name);
            let Some(stream) = stream else {
                let reason = if is_array_job {
                    "Log stream not available for array jobs"
                } else {
                    "No logs available"
                };
                let _ = tx
                    .send(DataEvent::LogUnavailable {
                        viewer_id,
                        reason: reason.to_string(),
                    })
                    .await;
                return;
            };

            let streamed = tokio::task::spawn_blocking(move || {
                stream_log_lines(&client, &stream, viewer_id, &tx, &cancel)
            })
            .await;
            if let Err(e) = streamed {
                tracing::warn!("Log streaming task failed: {}", e);
            }
        });
    }

    // ------------------------------------------------------------------
    // Queue and region
    // ------------------------------------------------------------------

    fn open_picker(&mut self, kind: PickerKind) {
        self.modal.replace(ModalState::Picker(PickerState::loading(kind)));

        let client = self.client.clone();
        let tx = self.data_tx.clone();
        tokio::task::spawn_blocking(move || {
            let result = match kind {
                PickerKind::Queue => client.list_queue_names(),
                PickerKind::Region => client.list_region_names(),
            };
            let _ = tx.blocking_send(DataEvent::PickerItems { kind, result });
        });
    }

    fn apply_picker_choice(&mut self, kind: PickerKind, choice: String) {
        match kind {
            PickerKind::Queue => {
                if choice == self.config.queue.name {
                    return;
                }
                tracing::info!("Switching to job queue {}", choice);
                self.config.queue.name = choice;
            }
            PickerKind::Region => {
                if choice == self.config.aws.region {
                    return;
                }
                tracing::info!("Switching to region {}", choice);
                self.client = self.client.with_region(&choice);
                self.config.aws.region = choice;
            }
        }
        self.restart_refresh();
    }

    // ------------------------------------------------------------------
    // Termination
    // ------------------------------------------------------------------

    /// Terminate the selection, or the highlighted job when nothing is selected
    fn kill_selected_jobs(&mut self) {
        let highlighted = self.highlighted_index();
        let jobs = self.jobs.take_selection(&self.filter, highlighted);
        if jobs.is_empty() {
            self.feedback.warn("No jobs selected");
            return;
        }

        let (job_ids, job_names): (Vec<String>, Vec<String>) =
            jobs.into_iter().map(|j| (j.job_id, j.job_name)).unzip();

        if self.config.behavior.confirm_terminate {
            self.modal = ModalState::Confirm {
                action: ConfirmAction::TerminateJobs { job_ids, job_names },
            };
        } else {
            self.execute_terminate(job_ids);
        }
    }

    fn execute_terminate(&mut self, job_ids: Vec<String>) {
        self.feedback
            .info(format!("Terminating {} job(s)...", job_ids.len()));

        let client = self.client.clone();
        let tx = self.data_tx.clone();
        tokio::spawn(async move {
            let report = client
                .terminate_jobs(job_ids, DEFAULT_TERMINATE_REASON)
                .await;
            let _ = tx.send(DataEvent::TerminationFinished(report)).await;
        });
    }

    // ------------------------------------------------------------------
    // Data events
    // ------------------------------------------------------------------

    /// Apply the result of background work
    pub fn handle_data(&mut self, event: DataEvent) -> EventResult {
        match event {
            DataEvent::JobLoaded { generation, job } => {
                if !self.refresh.is_current(generation) {
                    return EventResult::Unchanged;
                }
                self.jobs.push_job(job);
                EventResult::Continue
            }
            DataEvent::RefreshFinished { generation } => {
                if !self.refresh.is_current(generation) {
                    return EventResult::Unchanged;
                }
                self.refresh = RefreshSlot::Idle;
                self.jobs.finish_refresh();
                self.clamp_cursor();
                self.feedback.info("All jobs loaded");
                EventResult::Continue
            }
            DataEvent::RefreshFailed { generation, error } => {
                if !self.refresh.is_current(generation) {
                    return EventResult::Unchanged;
                }
                self.refresh = RefreshSlot::Idle;
                // Rows that made it in still follow the active sort
                self.jobs.finish_refresh();
                self.clamp_cursor();
                self.report_error("Error loading jobs", error);
                EventResult::Continue
            }
            DataEvent::ChildrenLoaded {
                refresh_generation,
                parent_id,
                parent_name,
                result,
            } => {
                // The guard was reset by the newer refresh and may belong to
                // a new expansion of the same parent
                if refresh_generation != self.generation {
                    tracing::debug!("Dropping children of {} from an older refresh", parent_id);
                    return EventResult::Unchanged;
                }
                self.expanding.remove(&parent_id);
                match result {
                    Ok(children) => match self.jobs.splice_children(&parent_id, children) {
                        Ok(_) => {
                            self.focus_job(&parent_id);
                            self.feedback
                                .info(format!("Array job {} expanded.", parent_name));
                        }
                        Err(e) => tracing::warn!("Could not expand {}: {}", parent_id, e),
                    },
                    Err(error) => self.report_error("Error expanding array job", error),
                }
                EventResult::Continue
            }
            DataEvent::DetailsLoaded {
                viewer_id,
                job_id,
                result,
            } => {
                let Some(view) = self.modal.text_view_mut(viewer_id) else {
                    return EventResult::Unchanged;
                };
                match result {
                    Ok(Some(described)) => {
                        view.lines = described.pretty_json().lines().map(String::from).collect();
                        view.loading = false;
                    }
                    Ok(None) => {
                        self.modal.close();
                        self.feedback.warn(format!("Job {} not found", job_id));
                    }
                    Err(error) => {
                        self.modal.close();
                        self.report_error("Error loading job details", error);
                    }
                }
                EventResult::Continue
            }
            DataEvent::LogLines { viewer_id, lines } => {
                let Some(view) = self.modal.text_view_mut(viewer_id) else {
                    return EventResult::Unchanged;
                };
                view.loading = false;
                view.append(lines);
                EventResult::Continue
            }
            DataEvent::LogUnavailable { viewer_id, reason } => {
                if self.modal.text_view_mut(viewer_id).is_none() {
                    return EventResult::Unchanged;
                }
                self.modal.close();
                self.feedback.warn(reason);
                EventResult::Continue
            }
            DataEvent::LogStreamEnded { viewer_id, error } => {
                let Some(view) = self.modal.text_view_mut(viewer_id) else {
                    return EventResult::Unchanged;
                };
                view.loading = false;
                if let Some(error) = error {
                    self.report_error("Error loading logs", error);
                }
                EventResult::Continue
            }
            DataEvent::PickerItems { kind, result } => {
                let current = match kind {
                    PickerKind::Queue => self.config.queue.name.clone(),
                    PickerKind::Region => self.config.aws.region.clone(),
                };
                let Some(picker) = self.modal.picker_mut().filter(|p| p.kind == kind) else {
                    return EventResult::Unchanged;
                };
                match result {
                    Ok(items) => picker.set_items(items, &current),
                    Err(error) => {
                        self.modal.close();
                        self.report_error(&format!("Error loading {} list", kind_noun(kind)), error);
                    }
                }
                EventResult::Continue
            }
            DataEvent::TerminationFinished(report) => {
                if report.failures.is_empty() {
                    self.feedback
                        .info(format!("Terminated {} job(s)", report.requested));
                } else {
                    self.feedback.error(format!(
                        "Failed to terminate {} of {} jobs",
                        report.failures.len(),
                        report.requested
                    ));
                }
                self.request_refresh();
                EventResult::Continue
            }
            DataEvent::AutoRefreshTick => {
                if self.request_refresh() {
                    EventResult::Continue
                } else {
                    EventResult::Unchanged
                }
            }
        }
    }

    /// Turn a remote failure into a message for the user.
    ///
    /// Unauthorized ends the session; anything else is dismissible.
    fn report_error(&mut self, context: &str, error: BatchError) {
        if error.is_unauthorized() {
            self.show_fatal(error.to_string());
            return;
        }

        tracing::warn!("{}: {}", context, error);
        let text = format!("{}: {}", context, error);
        match self.modal {
            ModalState::None | ModalState::Message { fatal: false, .. } => {
                self.modal.replace(ModalState::Message { text, fatal: false });
            }
            _ => self.feedback.error(text),
        }
    }

    fn show_fatal(&mut self, text: String) {
        if self.fatal_shown {
            return;
        }
        tracing::error!("{}", text);
        self.fatal_shown = true;
        self.refresh.cancel();
        self.modal.replace(ModalState::Message { text, fatal: true });
    }

    /// Write queue, region, theme and filter visibility back to the user config
    pub fn save_config(&mut self) {
        self.config.display.show_filter = self.filter_panel.visible;
        match self.config.save() {
            Ok(path) => tracing::debug!("Saved config to {}", path.display()),
            Err(e) => tracing::warn!("Could not save config: {}", e),
        }
    }
}

fn kind_noun(kind: PickerKind) -> &'static str {
    match kind {
        PickerKind::Queue => "job queue",
        PickerKind::Region => "region",
    }
}

/// Pull log pages until the stream ends, the viewer goes away or the app quits
fn stream_log_lines(
    client: &QueueClient,
    stream: &str,
    viewer_id: u64,
    tx: &mpsc::Sender<DataEvent>,
    cancel: &CancellationToken,
) {
    let mut events = client.stream_log_events(stream);
    let mut batch = Vec::new();
    let mut error = None;

    loop {
        if cancel.is_cancelled() {
            return;
        }
        match events.next() {
            Some(Ok(line)) => {
                batch.push(line);
                if events.buffered() == 0 || batch.len() >= LOG_BATCH_LINES {
                    let lines = std::mem::take(&mut batch);
                    if tx.blocking_send(DataEvent::LogLines { viewer_id, lines }).is_err() {
                        return;
                    }
                }
            }
            Some(Err(e)) => {
                error = Some(e);
                break;
            }
            None => break,
        }
    }

    if !batch.is_empty() {
        let _ = tx.blocking_send(DataEvent::LogLines {
            viewer_id,
            lines: batch,
        });
    }
    let _ = tx.blocking_send(DataEvent::LogStreamEnded { viewer_id, error });
}

fn copy_to_clipboard(text: &str) -> Result<(), arboard::Error> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::batch::testing::FakeBatchApi;
    use crate::models::test_support::{array_job, child_job, job};

    fn test_app(fake: &Arc<FakeBatchApi>) -> (App, mpsc::Receiver<DataEvent>) {
        let (tx, rx) = mpsc::channel(32);
        let app = App::new(
            AppConfig::default(),
            Vec::new(),
            QueueClient::new(fake.clone()),
            tx,
            CancellationToken::new(),
        );
        (app, rx)
    }

    async fn next_event(rx: &mut mpsc::Receiver<DataEvent>) -> DataEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for a data event")
            .expect("data channel closed")
    }

    async fn settle_refresh(app: &mut App, rx: &mut mpsc::Receiver<DataEvent>) {
        while app.refresh.is_loading() {
            let event = next_event(rx).await;
            app.handle_data(event);
        }
    }

    fn ids(app: &App) -> Vec<String> {
        app.jobs.records().iter().map(|r| r.id().to_string()).collect()
    }

    fn last_message(app: &App) -> Option<String> {
        app.feedback.last().map(|n| n.message.clone())
    }

    #[tokio::test]
    async fn test_second_refresh_while_loading_is_dropped() {
        let fake = Arc::new(FakeBatchApi::with_queue_pages(vec![
            vec![job("a", "a", JobStatus::Running, 1), job("b", "b", JobStatus::Failed, 2)],
            vec![],
            vec![job("c", "c", JobStatus::Pending, 3)],
        ]));
        let (mut app, mut rx) = test_app(&fake);

        assert!(app.request_refresh());
        assert!(!app.request_refresh());
        settle_refresh(&mut app, &mut rx).await;

        assert_eq!(ids(&app), vec!["a", "b", "c"]);
        assert_eq!(app.generation, 1);
        assert_eq!(fake.list_calls(), 3);
        assert_eq!(last_message(&app).as_deref(), Some("All jobs loaded"));
    }

    #[tokio::test]
    async fn test_unauthorized_refresh_is_fatal_once() {
        let fake = Arc::new(FakeBatchApi::with_queue_pages(vec![
            vec![job("a", "a", JobStatus::Running, 1), job("b", "b", JobStatus::Failed, 2)],
            vec![job("c", "c", JobStatus::Pending, 3)],
        ]));
        fake.fail_queue_at_page(1, BatchError::Unauthorized);
        let (mut app, mut rx) = test_app(&fake);

        app.request_refresh();
        settle_refresh(&mut app, &mut rx).await;

        assert_eq!(ids(&app), vec!["a", "b"]);
        match &app.modal {
            ModalState::Message { text, fatal } => {
                assert!(*fatal);
                assert_eq!(text, "Unauthorized. Did you forget to login?");
            }
            other => panic!("expected a fatal message, got {:?}", other),
        }
        assert!(rx.try_recv().is_err());
        assert!(!app.request_refresh());

        // Dismissing the fatal message quits
        assert_eq!(app.handle_action(KeyAction::Select), EventResult::Quit);
        assert!(!app.running);
    }

    #[tokio::test]
    async fn test_other_refresh_errors_are_dismissible() {
        let fake = Arc::new(FakeBatchApi::with_queue_pages(vec![vec![]]));
        fake.fail_queue_at_page(0, BatchError::Remote("throttled".to_string()));
        let (mut app, mut rx) = test_app(&fake);

        app.request_refresh();
        settle_refresh(&mut app, &mut rx).await;

        assert!(matches!(
            &app.modal,
            ModalState::Message { text, fatal: false } if text == "Error loading jobs: throttled"
        ));
        assert_eq!(app.handle_action(KeyAction::Escape), EventResult::Continue);
        assert!(!app.modal.is_active());
        assert!(app.request_refresh());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_rows_sorted() {
        let fake = Arc::new(FakeBatchApi::with_queue_pages(vec![
            vec![job("b", "b", JobStatus::Running, 1), job("a", "a", JobStatus::Running, 2)],
            vec![job("c", "c", JobStatus::Running, 3)],
        ]));
        fake.fail_queue_at_page(1, BatchError::Remote("throttled".to_string()));
        let (mut app, mut rx) = test_app(&fake);
        app.jobs.sort_by(JobSortColumn::Id);

        app.request_refresh();
        settle_refresh(&mut app, &mut rx).await;

        assert_eq!(ids(&app), vec!["a", "b"]);
        assert_eq!(app.jobs.sort_state().column, Some(JobSortColumn::Id));
        assert!(app.jobs.sort_state().ascending);
        assert!(matches!(app.modal, ModalState::Message { fatal: false, .. }));
    }

    #[tokio::test]
    async fn test_stale_generation_events_are_dropped() {
        let fake = Arc::new(FakeBatchApi::with_queue_pages(vec![vec![]]));
        let (mut app, mut rx) = test_app(&fake);
        app.request_refresh();
        settle_refresh(&mut app, &mut rx).await;
        app.request_refresh();

        let stale = app.handle_data(DataEvent::JobLoaded {
            generation: 1,
            job: job("old", "old", JobStatus::Running, 0),
        });
        assert_eq!(stale, EventResult::Unchanged);
        assert!(app.jobs.is_empty());
        assert!(app.refresh.is_loading());
    }

    fn array_fixture() -> Arc<FakeBatchApi> {
        Arc::new(
            FakeBatchApi::with_queue_pages(vec![vec![
                array_job("job", "sweep", 3),
                job("z", "zeta", JobStatus::Failed, 5),
            ]])
            .with_children(
                JobStatus::Running,
                vec![
                    child_job("job", 10, JobStatus::Running),
                    child_job("job", 2, JobStatus::Running),
                ],
            )
            .with_children(JobStatus::Succeeded, vec![child_job("job", 1, JobStatus::Succeeded)]),
        )
    }

    #[tokio::test]
    async fn test_expand_splices_children_once() {
        let fake = array_fixture();
        let (mut app, mut rx) = test_app(&fake);
        app.request_refresh();
        settle_refresh(&mut app, &mut rx).await;

        app.handle_action(KeyAction::ToggleExpand);
        assert_eq!(
            last_message(&app).as_deref(),
            Some("Expanding array job sweep, hang tight...")
        );
        app.handle_action(KeyAction::ToggleExpand);

        let event = next_event(&mut rx).await;
        app.handle_data(event);

        assert_eq!(ids(&app), vec!["job", "job:1", "job:2", "job:10", "z"]);
        assert_eq!(last_message(&app).as_deref(), Some("Array job sweep expanded."));
        assert_eq!(fake.child_statuses_queried().len(), JobStatus::CHILD_QUERY_ORDER.len());
        assert_eq!(app.highlighted_record().map(JobRecord::id), Some("job"));

        // Toggling on a child collapses the group and returns to the parent
        app.list_state.select(2, 5);
        app.handle_action(KeyAction::ToggleExpand);
        assert_eq!(ids(&app), vec!["job", "z"]);
        assert_eq!(app.highlighted_record().map(JobRecord::id), Some("job"));
    }

    #[tokio::test]
    async fn test_expansion_from_older_refresh_is_discarded() {
        let fake = array_fixture();
        let (mut app, mut rx) = test_app(&fake);
        app.request_refresh();
        settle_refresh(&mut app, &mut rx).await;

        app.handle_action(KeyAction::ToggleExpand);
        let children = next_event(&mut rx).await;

        app.request_refresh();
        settle_refresh(&mut app, &mut rx).await;
        app.handle_data(children);

        assert_eq!(ids(&app), vec!["job", "z"]);
        assert!(!app.jobs.get(0).unwrap().is_expanded);
    }

    #[tokio::test]
    async fn test_older_expansion_does_not_release_newer_guard() {
        let fake = array_fixture();
        let (mut app, mut rx) = test_app(&fake);
        app.request_refresh();
        settle_refresh(&mut app, &mut rx).await;

        app.handle_action(KeyAction::ToggleExpand);
        let stale = next_event(&mut rx).await;

        app.request_refresh();
        settle_refresh(&mut app, &mut rx).await;

        // Expand again under the new refresh, then the old result shows up
        app.handle_action(KeyAction::ToggleExpand);
        assert_eq!(app.handle_data(stale), EventResult::Unchanged);
        assert!(app.expanding.contains("job"));

        // Still running, so this request is ignored
        app.handle_action(KeyAction::ToggleExpand);
        let fresh = next_event(&mut rx).await;
        app.handle_data(fresh);

        assert_eq!(ids(&app), vec!["job", "job:1", "job:2", "job:10", "z"]);
        assert!(app.expanding.is_empty());
        assert_eq!(
            fake.child_statuses_queried().len(),
            2 * JobStatus::CHILD_QUERY_ORDER.len()
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_header_click_sorts_by_column() {
        let fake = Arc::new(FakeBatchApi::with_queue_pages(vec![vec![
            job("j1", "zeta", JobStatus::Running, 1),
            job("j2", "alpha", JobStatus::Running, 2),
        ]]));
        let (mut app, mut rx) = test_app(&fake);
        app.request_refresh();
        settle_refresh(&mut app, &mut rx).await;

        // Filter panel on the left: the table border sits at x = 28
        app.set_terminal_size(200, 40);
        let header_row = TABLE_CONTENT_START - 1;
        let marker_x = FILTER_PANEL_WIDTH + 1;
        let name_x = FILTER_PANEL_WIDTH + 1 + 5;
        assert_eq!(app.highlighted_record().map(JobRecord::id), Some("j1"));

        app.handle_action(KeyAction::MouseClick { row: header_row, column: name_x });
        assert_eq!(ids(&app), vec!["j2", "j1"]);
        assert_eq!(app.jobs.sort_state().column, Some(JobSortColumn::Name));
        assert_eq!(app.highlighted_record().map(JobRecord::id), Some("j1"));

        app.handle_action(KeyAction::MouseClick { row: header_row, column: name_x });
        assert_eq!(ids(&app), vec!["j1", "j2"]);
        assert!(!app.jobs.sort_state().ascending);

        // The marker column is not sortable, clicks beside the table do nothing
        app.handle_action(KeyAction::MouseClick { row: header_row, column: marker_x });
        app.handle_action(KeyAction::MouseClick { row: header_row, column: 5 });
        assert_eq!(app.jobs.sort_state().column, Some(JobSortColumn::Name));
        assert!(!app.jobs.sort_state().ascending);

        // A click on a body row moves the cursor there
        app.handle_action(KeyAction::MouseClick {
            row: TABLE_CONTENT_START + 1,
            column: name_x,
        });
        assert_eq!(app.highlighted_record().map(JobRecord::id), Some("j2"));
    }

    #[tokio::test]
    async fn test_expand_on_plain_job_warns() {
        let fake = Arc::new(FakeBatchApi::with_queue_pages(vec![vec![job(
            "a",
            "a",
            JobStatus::Running,
            0,
        )]]));
        let (mut app, mut rx) = test_app(&fake);
        app.request_refresh();
        settle_refresh(&mut app, &mut rx).await;

        app.handle_action(KeyAction::ToggleExpand);
        let notification = app.feedback.last().unwrap();
        assert_eq!(notification.message, "Can only expand array jobs");
        assert_eq!(notification.severity, Severity::Warning);
    }

    #[tokio::test]
    async fn test_terminate_without_jobs_warns() {
        let fake = Arc::new(FakeBatchApi::default());
        let (mut app, _rx) = test_app(&fake);
        app.handle_action(KeyAction::Terminate);
        assert_eq!(last_message(&app).as_deref(), Some("No jobs selected"));
        assert!(!app.modal.is_active());
    }

    #[tokio::test]
    async fn test_terminate_highlighted_job_after_confirmation() {
        let fake = Arc::new(FakeBatchApi::with_queue_pages(vec![vec![
            job("a", "a", JobStatus::Running, 1),
            job("b", "b", JobStatus::Running, 2),
        ]]));
        let (mut app, mut rx) = test_app(&fake);
        app.request_refresh();
        settle_refresh(&mut app, &mut rx).await;

        app.handle_action(KeyAction::MoveDown);
        app.handle_action(KeyAction::Terminate);
        assert!(matches!(app.modal, ModalState::Confirm { .. }));

        app.handle_action(KeyAction::TextChar('y'));
        assert!(!app.modal.is_active());

        let event = next_event(&mut rx).await;
        assert!(matches!(event, DataEvent::TerminationFinished(_)));
        app.handle_data(event);
        assert!(app.refresh.is_loading());
        settle_refresh(&mut app, &mut rx).await;

        assert_eq!(fake.terminated(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_declined_confirmation_terminates_nothing() {
        let fake = Arc::new(FakeBatchApi::with_queue_pages(vec![vec![job(
            "a",
            "a",
            JobStatus::Running,
            1,
        )]]));
        let (mut app, mut rx) = test_app(&fake);
        app.request_refresh();
        settle_refresh(&mut app, &mut rx).await;

        app.handle_action(KeyAction::Terminate);
        app.handle_action(KeyAction::TextChar('n'));

        assert!(!app.modal.is_active());
        assert!(rx.try_recv().is_err());
        assert!(fake.terminated().is_empty());
    }

    #[tokio::test]
    async fn test_logs_stream_into_viewer() {
        let target = job("a", "train", JobStatus::Running, 1);
        let fake = Arc::new(
            FakeBatchApi::with_queue_pages(vec![vec![target.clone()]])
                .with_log_stream(&target.job_arn, "train/default/abc")
                .with_log_pages(vec![
                    vec!["l1".to_string(), "l2".to_string()],
                    vec!["l3".to_string()],
                ]),
        );
        let (mut app, mut rx) = test_app(&fake);
        app.request_refresh();
        settle_refresh(&mut app, &mut rx).await;

        app.handle_action(KeyAction::ViewLogs);
        assert!(app.modal.text_view().is_some_and(|v| v.loading));

        loop {
            let event = next_event(&mut rx).await;
            let ended = matches!(event, DataEvent::LogStreamEnded { .. });
            app.handle_data(event);
            if ended {
                break;
            }
        }

        let view = app.modal.text_view().unwrap();
        assert_eq!(view.lines, vec!["l1", "l2", "l3"]);
        assert!(!view.loading);
        assert_eq!(view.title, "Logs: train");
    }

    #[tokio::test]
    async fn test_logs_of_array_parent_are_unavailable() {
        let fake = array_fixture();
        let (mut app, mut rx) = test_app(&fake);
        app.request_refresh();
        settle_refresh(&mut app, &mut rx).await;

        app.handle_action(KeyAction::ViewLogs);
        let event = next_event(&mut rx).await;
        app.handle_data(event);

        assert!(!app.modal.is_active());
        assert_eq!(
            last_message(&app).as_deref(),
            Some("Log stream not available for array jobs")
        );
    }

    #[tokio::test]
    async fn test_details_show_pretty_json() {
        let fake = Arc::new(FakeBatchApi::with_queue_pages(vec![vec![job(
            "a",
            "train",
            JobStatus::Running,
            1,
        )]]));
        let (mut app, mut rx) = test_app(&fake);
        app.request_refresh();
        settle_refresh(&mut app, &mut rx).await;

        app.handle_action(KeyAction::ViewDetails);
        let event = next_event(&mut rx).await;
        app.handle_data(event);

        let view = app.modal.text_view().unwrap();
        assert!(!view.loading);
        assert!(view.text().contains("\"jobId\": \"a\""));

        app.handle_action(KeyAction::Escape);
        assert!(!app.modal.is_active());
    }

    #[tokio::test]
    async fn test_region_change_restarts_refresh() {
        let fake = Arc::new(
            FakeBatchApi::with_queue_pages(vec![vec![job("a", "a", JobStatus::Running, 1)]])
                .with_names(&["default"], &["eu-west-1", "us-east-1"]),
        );
        let (mut app, mut rx) = test_app(&fake);

        app.handle_action(KeyAction::ChangeRegion);
        let event = next_event(&mut rx).await;
        app.handle_data(event);

        app.handle_action(KeyAction::TextChar('u'));
        app.handle_action(KeyAction::TextChar('s'));
        app.handle_action(KeyAction::Select);

        assert_eq!(app.region(), "us-east-1");
        assert_eq!(fake.regions_requested(), vec!["us-east-1"]);
        assert!(app.refresh.is_loading());
        settle_refresh(&mut app, &mut rx).await;
        assert_eq!(ids(&app), vec!["a"]);
    }

    #[tokio::test]
    async fn test_name_filter_editing() {
        let fake = Arc::new(FakeBatchApi::with_queue_pages(vec![vec![
            job("a", "train", JobStatus::Running, 1),
            job("b", "eval", JobStatus::Running, 2),
        ]]));
        let (mut app, mut rx) = test_app(&fake);
        app.request_refresh();
        settle_refresh(&mut app, &mut rx).await;

        app.handle_action(KeyAction::EditNameFilter);
        app.handle_action(KeyAction::TextChar('e'));
        assert_eq!(app.filter.name_prefix, "e");
        assert_eq!(app.visible_records().len(), 1);

        // Select-all only reaches the visible row
        app.handle_action(KeyAction::Escape);
        assert_eq!(app.filter_panel.focus, FilterFocus::Table);
        app.handle_action(KeyAction::SelectAll);
        assert_eq!(app.jobs.selected_count(), 1);
        assert!(app.jobs.get(1).unwrap().selected);
    }

    #[tokio::test]
    async fn test_status_filter_toggle() {
        let fake = Arc::new(FakeBatchApi::with_queue_pages(vec![vec![
            job("a", "a", JobStatus::Running, 1000),
            job("b", "b", JobStatus::Failed, 2000),
        ]]));
        let (mut app, mut rx) = test_app(&fake);
        app.request_refresh();
        settle_refresh(&mut app, &mut rx).await;

        app.handle_action(KeyAction::CycleFocus);
        app.handle_action(KeyAction::CycleFocus);
        assert_eq!(app.filter_panel.focus, FilterFocus::Statuses);

        let failed = JobStatus::ALL
            .iter()
            .position(|s| *s == JobStatus::Failed)
            .unwrap();
        for _ in 0..failed {
            app.handle_action(KeyAction::MoveDown);
        }
        app.handle_action(KeyAction::ToggleSelection);

        let visible: Vec<&str> = app.visible_records().into_iter().map(JobRecord::id).collect();
        assert_eq!(visible, vec!["b"]);
    }
}
