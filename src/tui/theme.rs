//! Theme definitions for the TUI
//!
//! This module provides colorblind-safe themes for both dark and light terminals.
//! The default is "dark" but users can configure "light" via config file or env var.

use ratatui::style::Color;

use crate::models::JobStatus;
use crate::tui::app::Severity;

/// Available theme names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

impl ThemeName {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "light" => ThemeName::Light,
            _ => ThemeName::Dark,
        }
    }
}

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,

    // Base colors
    pub fg: Color,
    pub muted: Color,
    pub border: Color,
    pub border_focused: Color,

    // Job status colors (colorblind-safe)
    pub running: Color,
    pub starting: Color,
    pub pending: Color,
    pub succeeded: Color,
    pub failed: Color,

    // UI elements
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub marked: Color,
    pub array_parent: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Create a dark theme (default)
    pub fn dark() -> Self {
        Self {
            name: ThemeName::Dark,

            fg: Color::White,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            border_focused: Color::Cyan,

            running: Color::Rgb(0, 200, 0),       // Bright green
            starting: Color::Rgb(0, 190, 190),    // Teal
            pending: Color::Rgb(255, 180, 0),     // Orange
            succeeded: Color::Rgb(80, 160, 255),  // Light blue
            failed: Color::Rgb(255, 80, 80),      // Bright red

            selected_bg: Color::Rgb(60, 60, 80),
            selected_fg: Color::White,
            header_bg: Color::Rgb(40, 80, 120),
            header_fg: Color::White,
            marked: Color::Rgb(255, 200, 100),
            array_parent: Color::Cyan,
        }
    }

    /// Create a light theme
    /// Uses darker, more saturated colors for visibility on light backgrounds
    pub fn light() -> Self {
        Self {
            name: ThemeName::Light,

            fg: Color::Black,
            muted: Color::Rgb(120, 120, 120),
            border: Color::Rgb(120, 120, 120),
            border_focused: Color::Rgb(0, 100, 180),

            running: Color::Rgb(0, 140, 0),
            starting: Color::Rgb(0, 120, 120),
            pending: Color::Rgb(200, 120, 0),
            succeeded: Color::Rgb(0, 80, 180),
            failed: Color::Rgb(200, 0, 0),

            selected_bg: Color::Rgb(200, 220, 255),
            selected_fg: Color::Black,
            header_bg: Color::Rgb(180, 200, 230),
            header_fg: Color::Black,
            marked: Color::Rgb(180, 140, 60),
            array_parent: Color::Rgb(0, 100, 180),
        }
    }

    /// Create theme from name string
    pub fn from_name(name: &str) -> Self {
        match ThemeName::parse(name) {
            ThemeName::Dark => Self::dark(),
            ThemeName::Light => Self::light(),
        }
    }

    /// Get color for a job status
    pub fn job_status_color(&self, status: JobStatus) -> Color {
        match status {
            JobStatus::Submitted | JobStatus::Pending | JobStatus::Runnable => self.pending,
            JobStatus::Starting => self.starting,
            JobStatus::Running => self.running,
            JobStatus::Succeeded => self.succeeded,
            JobStatus::Failed => self.failed,
        }
    }

    /// Get color for a status bar notification
    pub fn severity_color(&self, severity: Severity) -> Color {
        match severity {
            Severity::Info => self.succeeded,
            Severity::Warning => self.pending,
            Severity::Error => self.failed,
        }
    }
}
