//! Event types for the TUI
//!
//! This module implements a dual-channel event architecture:
//! - InputEvent: priority channel for user input
//! - DataEvent: results of background work, applied on the UI task
//!
//! Job rows and log lines are sent with back-pressure and never dropped.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};

use crate::batch::{BatchError, TerminationReport};
use crate::models::{DescribedJob, Job};
use crate::tui::app::PickerKind;

/// Input events from the terminal
#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
}

/// Completion events from background tasks
#[derive(Debug)]
pub enum DataEvent {
    /// One job of refresh `generation`, in listing order
    JobLoaded { generation: u64, job: Job },

    /// Refresh `generation` listed every page
    RefreshFinished { generation: u64 },

    /// Refresh `generation` stopped on an error
    RefreshFailed { generation: u64, error: BatchError },

    /// Children of an array job, fetched while `refresh_generation` was current
    ChildrenLoaded {
        refresh_generation: u64,
        parent_id: String,
        parent_name: String,
        result: Result<Vec<Job>, BatchError>,
    },

    /// Detail document for the viewer `viewer_id`
    DetailsLoaded {
        viewer_id: u64,
        job_id: String,
        result: Result<Option<DescribedJob>, BatchError>,
    },

    /// Next batch of log lines for the viewer `viewer_id`
    LogLines { viewer_id: u64, lines: Vec<String> },

    /// The job has no log stream to show
    LogUnavailable { viewer_id: u64, reason: String },

    /// The log stream ended, on its own or on an error
    LogStreamEnded {
        viewer_id: u64,
        error: Option<BatchError>,
    },

    /// Names for the queue or region picker
    PickerItems {
        kind: PickerKind,
        result: Result<Vec<String>, BatchError>,
    },

    /// A batch termination completed
    TerminationFinished(TerminationReport),

    /// Periodic auto-refresh timer
    AutoRefreshTick,
}

/// Result of processing an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Continue running, UI needs redraw
    Continue,
    /// Continue running, no UI change needed
    Unchanged,
    /// Quit the application
    Quit,
}

/// Key action mappings for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    // Navigation
    MoveUp,
    MoveDown,
    MoveToTop,
    MoveToBottom,
    PageUp,
    PageDown,

    // Job list
    Select,
    ToggleSelection,
    SelectAll,
    ClearSelection,
    ToggleExpand,
    ViewDetails,
    ViewLogs,
    Refresh,
    OpenSort,
    Terminate,
    YankJobId,

    // Filter panel
    EditNameFilter,
    CycleFocus,
    ToggleFilterPanel,

    // Remote selection
    ChangeQueue,
    ChangeRegion,

    // UI
    ShowHelp,
    Escape,
    Quit,

    // Text input (name filter, picker query, confirm dialog)
    TextClear,
    TextBackspace,
    TextChar(char),

    // Mouse actions
    MouseClick { row: u16, column: u16 },
    MouseScrollUp,
    MouseScrollDown,

    Unknown,
}

impl KeyAction {
    /// Map a mouse event to an action
    pub fn from_mouse_event(event: MouseEvent) -> Self {
        use crossterm::event::{MouseButton, MouseEventKind};

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => KeyAction::MouseClick {
                row: event.row,
                column: event.column,
            },
            MouseEventKind::ScrollUp => KeyAction::MouseScrollUp,
            MouseEventKind::ScrollDown => KeyAction::MouseScrollDown,
            _ => KeyAction::Unknown,
        }
    }

    /// Map a key event to an action.
    ///
    /// With `text_input` set, printable characters are passed through as
    /// [`KeyAction::TextChar`] instead of triggering bindings.
    pub fn from_key_event(event: KeyEvent, text_input: bool) -> Self {
        let KeyEvent {
            code, modifiers, ..
        } = event;

        if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        if text_input {
            return match code {
                KeyCode::Esc => KeyAction::Escape,
                KeyCode::Enter => KeyAction::Select,
                KeyCode::Tab => KeyAction::CycleFocus,
                KeyCode::Up => KeyAction::MoveUp,
                KeyCode::Down => KeyAction::MoveDown,
                KeyCode::Backspace => KeyAction::TextBackspace,
                KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
                    KeyAction::TextClear
                }
                KeyCode::Char(c) => KeyAction::TextChar(c),
                _ => KeyAction::Unknown,
            };
        }

        match code {
            KeyCode::Char('q') => KeyAction::Quit,

            // Ctrl+ combinations must come before bare character matches
            KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::PageDown,
            KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::PageUp,

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => KeyAction::MoveDown,
            KeyCode::Char('k') | KeyCode::Up => KeyAction::MoveUp,
            KeyCode::Char('g') | KeyCode::Home => KeyAction::MoveToTop,
            KeyCode::Char('G') | KeyCode::End => KeyAction::MoveToBottom,
            KeyCode::PageDown => KeyAction::PageDown,
            KeyCode::PageUp => KeyAction::PageUp,

            // Job list
            KeyCode::Enter => KeyAction::Select,
            KeyCode::Char(' ') => KeyAction::ToggleSelection,
            KeyCode::Char('a') => KeyAction::SelectAll,
            KeyCode::Char('x') => KeyAction::ClearSelection,
            KeyCode::Char('e') => KeyAction::ToggleExpand,
            KeyCode::Char('d') => KeyAction::ViewDetails,
            KeyCode::Char('l') => KeyAction::ViewLogs,
            KeyCode::Char('r') => KeyAction::Refresh,
            KeyCode::Char('s') => KeyAction::OpenSort,
            KeyCode::Char('K') => KeyAction::Terminate,
            KeyCode::Char('y') => KeyAction::YankJobId,

            // Filter panel
            KeyCode::Char('/') => KeyAction::EditNameFilter,
            KeyCode::Tab => KeyAction::CycleFocus,
            KeyCode::Char('f') => KeyAction::ToggleFilterPanel,

            KeyCode::Char('c') => KeyAction::ChangeQueue,
            KeyCode::Char('R') => KeyAction::ChangeRegion,

            KeyCode::Char('?') | KeyCode::F(1) => KeyAction::ShowHelp,
            KeyCode::Esc => KeyAction::Escape,

            _ => KeyAction::Unknown,
        }
    }
}
