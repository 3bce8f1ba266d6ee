//! Application state types for the TUI
//!
//! - Modal states (Help, Sort, Confirm, Picker, TextView, Message)
//! - Refresh slot guarding the single in-flight refresh
//! - Filter panel focus
//! - Selection and navigation state (ListState)
//! - Feedback state for transient notifications

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use super::types::JobSortColumn;
use crate::utils::contains_ignore_case;

// ============================================================================
// Confirmation
// ============================================================================

/// Actions that need a yes/no before they run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    TerminateJobs {
        job_ids: Vec<String>,
        job_names: Vec<String>,
    },
}

impl ConfirmAction {
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            ConfirmAction::TerminateJobs { job_ids, job_names } => match job_ids.as_slice() {
                [id] => format!(
                    "Terminate job {} ({})?",
                    job_names.first().map_or("", String::as_str),
                    id
                ),
                ids => format!("Terminate {} selected jobs?", ids.len()),
            },
        }
    }
}

// ============================================================================
// Sort Menu
// ============================================================================

#[derive(Debug)]
pub struct SortMenuState {
    pub selected: usize,
    pub columns: Vec<JobSortColumn>,
}

impl Default for SortMenuState {
    fn default() -> Self {
        Self::new()
    }
}

impl SortMenuState {
    pub fn new() -> Self {
        Self {
            selected: 0,
            columns: JobSortColumn::ALL.to_vec(),
        }
    }

    /// Menu with the cursor on the currently active column
    pub fn starting_at(column: Option<JobSortColumn>) -> Self {
        let mut menu = Self::new();
        if let Some(column) = column
            && let Some(pos) = menu.columns.iter().position(|c| *c == column)
        {
            menu.selected = pos;
        }
        menu
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.columns.len() {
            self.selected += 1;
        }
    }

    #[must_use]
    pub fn selected_column(&self) -> Option<JobSortColumn> {
        self.columns.get(self.selected).copied()
    }
}

// ============================================================================
// Queue / Region Picker
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    Queue,
    Region,
}

impl PickerKind {
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            PickerKind::Queue => "Change job queue",
            PickerKind::Region => "Change region",
        }
    }
}

/// Selector over remote names; `items` is `None` until they arrive
#[derive(Debug)]
pub struct PickerState {
    pub kind: PickerKind,
    pub items: Option<Vec<String>>,
    pub query: String,
    pub list: ListState,
}

impl PickerState {
    pub fn loading(kind: PickerKind) -> Self {
        Self {
            kind,
            items: None,
            query: String::new(),
            list: ListState::default(),
        }
    }

    /// Items matching the typed query (case-insensitive substring)
    #[must_use]
    pub fn matching(&self) -> Vec<&str> {
        self.items
            .iter()
            .flatten()
            .filter(|item| contains_ignore_case(item, &self.query))
            .map(String::as_str)
            .collect()
    }

    #[must_use]
    pub fn selected_item(&self) -> Option<String> {
        self.matching()
            .get(self.list.selected)
            .map(|s| s.to_string())
    }

    pub fn set_items(&mut self, items: Vec<String>, current: &str) {
        self.list.selected = items.iter().position(|i| i == current).unwrap_or(0);
        self.items = Some(items);
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.list.move_to_top();
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
        self.list.move_to_top();
    }
}

// ============================================================================
// Text Viewer (details and logs)
// ============================================================================

/// Scrollable text overlay.
///
/// Log viewers own a cancellation token; dropping the viewer through
/// [`ModalState::close`] stops the background stream.
#[derive(Debug)]
pub struct TextViewState {
    pub viewer_id: u64,
    pub title: String,
    pub lines: Vec<String>,
    pub scroll: usize,
    pub loading: bool,
    /// Keep the view pinned to the last line while lines stream in
    pub follow: bool,
    pub cancel: Option<CancellationToken>,
}

impl TextViewState {
    pub fn loading(viewer_id: u64, title: String, cancel: Option<CancellationToken>) -> Self {
        Self {
            viewer_id,
            title,
            lines: Vec::new(),
            scroll: 0,
            loading: true,
            follow: false,
            cancel,
        }
    }

    pub fn append(&mut self, lines: Vec<String>) {
        self.lines.extend(lines);
        if self.follow {
            self.scroll = self.lines.len().saturating_sub(1);
        }
    }

    pub fn scroll_up(&mut self, amount: usize) {
        self.follow = false;
        self.scroll = self.scroll.saturating_sub(amount);
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.scroll = (self.scroll + amount).min(self.lines.len().saturating_sub(1));
    }

    pub fn scroll_to_top(&mut self) {
        self.follow = false;
        self.scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow = true;
        self.scroll = self.lines.len().saturating_sub(1);
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

// ============================================================================
// Modal State
// ============================================================================

/// Modal overlay state - only one modal can be active at a time.
#[derive(Debug, Default)]
pub enum ModalState {
    #[default]
    None,
    Help,
    Sort {
        menu: SortMenuState,
    },
    Confirm {
        action: ConfirmAction,
    },
    Picker(PickerState),
    TextView(TextViewState),
    /// Blocking message; a fatal one ends the session when dismissed
    Message {
        text: String,
        fatal: bool,
    },
}

impl ModalState {
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, ModalState::None)
    }

    /// True when typed characters go to the modal instead of key bindings
    #[must_use]
    pub fn takes_text_input(&self) -> bool {
        matches!(self, ModalState::Picker(_) | ModalState::Confirm { .. })
    }

    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, ModalState::Message { fatal: true, .. })
    }

    /// Replace the modal, cancelling any background work owned by the old one
    pub fn replace(&mut self, next: ModalState) {
        if let ModalState::TextView(view) = self
            && let Some(cancel) = &view.cancel
        {
            cancel.cancel();
        }
        *self = next;
    }

    pub fn close(&mut self) {
        self.replace(ModalState::None);
    }

    #[must_use]
    pub fn sort_menu_mut(&mut self) -> Option<&mut SortMenuState> {
        match self {
            ModalState::Sort { menu } => Some(menu),
            _ => None,
        }
    }

    #[must_use]
    pub fn picker_mut(&mut self) -> Option<&mut PickerState> {
        match self {
            ModalState::Picker(picker) => Some(picker),
            _ => None,
        }
    }

    #[must_use]
    pub fn text_view(&self) -> Option<&TextViewState> {
        match self {
            ModalState::TextView(view) => Some(view),
            _ => None,
        }
    }

    /// The open viewer, only if it is `viewer_id`
    #[must_use]
    pub fn text_view_mut(&mut self, viewer_id: u64) -> Option<&mut TextViewState> {
        match self {
            ModalState::TextView(view) if view.viewer_id == viewer_id => Some(view),
            _ => None,
        }
    }
}

// ============================================================================
// Refresh Slot
// ============================================================================

/// Single slot for the in-flight refresh.
///
/// Every refresh gets a new generation; events from other generations are
/// stale and must be dropped.
#[derive(Debug, Default)]
pub enum RefreshSlot {
    #[default]
    Idle,
    Loading {
        generation: u64,
        cancel: CancellationToken,
    },
}

impl RefreshSlot {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, RefreshSlot::Loading { .. })
    }

    /// True while refresh `generation` is the one in flight
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        matches!(self, RefreshSlot::Loading { generation: g, .. } if *g == generation)
    }

    /// Cancel the in-flight refresh (if any) and return to idle
    pub fn cancel(&mut self) {
        if let RefreshSlot::Loading { cancel, .. } = std::mem::take(self) {
            cancel.cancel();
        }
    }
}

// ============================================================================
// Filter Panel
// ============================================================================

/// Where keyboard input goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterFocus {
    #[default]
    Table,
    Name,
    Statuses,
}

impl FilterFocus {
    #[must_use]
    pub fn next(&self) -> Self {
        match self {
            FilterFocus::Name => FilterFocus::Statuses,
            FilterFocus::Statuses => FilterFocus::Table,
            FilterFocus::Table => FilterFocus::Name,
        }
    }
}

#[derive(Debug, Default)]
pub struct FilterPanelState {
    pub visible: bool,
    pub focus: FilterFocus,
    /// Highlighted entry of the status checklist
    pub status_cursor: usize,
}

// ============================================================================
// List Navigation State
// ============================================================================

/// Cursor and scroll position over the visible rows
#[derive(Debug, Clone, Default)]
pub struct ListState {
    pub selected: usize,
    pub scroll_offset: usize,
    pub visible_count: usize,
}

impl ListState {
    pub fn clamp(&mut self, list_len: usize) {
        if list_len == 0 {
            self.selected = 0;
            self.scroll_offset = 0;
            return;
        }
        self.selected = self.selected.min(list_len - 1);
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.visible_count > 0 && self.selected >= self.scroll_offset + self.visible_count {
            self.scroll_offset = self.selected + 1 - self.visible_count;
        }
    }

    pub fn select(&mut self, index: usize, list_len: usize) {
        self.selected = index;
        self.clamp(list_len);
    }

    pub fn move_up(&mut self, list_len: usize) {
        self.select(self.selected.saturating_sub(1), list_len);
    }

    pub fn move_down(&mut self, list_len: usize) {
        self.select(self.selected.saturating_add(1), list_len);
    }

    pub fn move_to_top(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn move_to_bottom(&mut self, list_len: usize) {
        self.select(list_len.saturating_sub(1), list_len);
    }

    pub fn page_up(&mut self, list_len: usize) {
        let jump = (self.visible_count / 2).max(1);
        self.select(self.selected.saturating_sub(jump), list_len);
    }

    pub fn page_down(&mut self, list_len: usize) {
        let jump = (self.visible_count / 2).max(1);
        self.select(self.selected.saturating_add(jump), list_len);
    }
}

// ============================================================================
// Feedback State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    fn display_duration(&self) -> Duration {
        match self {
            Severity::Info => Duration::from_secs(2),
            Severity::Warning => Duration::from_secs(3),
            Severity::Error => Duration::from_secs(5),
        }
    }
}

/// Transient message shown in the status bar
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub timestamp: Instant,
}

impl Notification {
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.timestamp.elapsed() < self.severity.display_duration()
    }
}

#[derive(Debug, Default)]
pub struct FeedbackState {
    notification: Option<Notification>,
    pub config_warnings: Vec<String>,
}

impl FeedbackState {
    pub fn new(config_warnings: Vec<String>) -> Self {
        Self {
            notification: None,
            config_warnings,
        }
    }

    pub fn notify(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("{:?}: {}", severity, message);
        self.notification = Some(Notification {
            message,
            severity,
            timestamp: Instant::now(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.notify(Severity::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.notify(Severity::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.notify(Severity::Error, message);
    }

    #[must_use]
    pub fn current(&self) -> Option<&Notification> {
        self.notification.as_ref().filter(|n| n.is_visible())
    }

    /// Latest notification regardless of age
    #[must_use]
    pub fn last(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }
}
