//! Terminal User Interface for batchmon
//!
//! This module provides an interactive browser for one AWS Batch job queue.
//! It features:
//! - Jobs streamed into the table page by page while a refresh runs
//! - Dual-channel event architecture (priority input, background results)
//! - Inline expansion of array jobs
//! - Detail and log viewers, termination with confirmation
//! - Queue and region switching without restarting

pub mod app;
pub mod event;
pub mod runtime;
pub mod theme;
pub mod ui;

use std::io::{self, IsTerminal, stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use crate::batch::{AwsCli, QueueClient};
use crate::models::AppConfig;
use crate::tui::app::App;
use crate::tui::runtime::{
    TuiRuntime, create_channels, run_event_loop, spawn_auto_refresh, spawn_input_task,
};

/// Terminal capability requirements for TUI mode
#[derive(Debug)]
pub struct TerminalCapabilities {
    pub is_tty: bool,
    pub term_type: String,
    pub supports_alternate_screen: bool,
}

impl TerminalCapabilities {
    /// Detect terminal capabilities
    pub fn detect() -> Self {
        let is_tty = stdout().is_terminal();
        let term_type = std::env::var("TERM").unwrap_or_default();

        let supports_alternate_screen = !matches!(term_type.as_str(), "dumb" | "" | "unknown");

        Self {
            is_tty,
            term_type,
            supports_alternate_screen,
        }
    }

    /// Check if terminal is suitable for TUI mode
    pub fn is_suitable(&self) -> bool {
        self.is_tty && self.supports_alternate_screen
    }

    /// Get error message for unsuitable terminal
    pub fn error_message(&self) -> String {
        if !self.is_tty {
            "TUI mode requires an interactive terminal (stdout is not a TTY).\n\
             Hint: Use non-TUI commands like 'batchmon jobs' instead."
                .to_string()
        } else if !self.supports_alternate_screen {
            format!(
                "Terminal type '{}' may not support TUI mode.\n\
                 Hint: Set TERM to a supported value (e.g., xterm-256color) or use CLI mode.",
                if self.term_type.is_empty() {
                    "(unset)"
                } else {
                    &self.term_type
                }
            )
        } else {
            "Unknown terminal capability issue.".to_string()
        }
    }
}

/// Run the TUI application
pub async fn run_tui(config: AppConfig, config_warnings: Vec<String>) -> Result<()> {
    let capabilities = TerminalCapabilities::detect();
    if !capabilities.is_suitable() {
        bail!("{}", capabilities.error_message());
    }

    let cli = AwsCli::from_config(&config.aws);
    if cli.is_missing() {
        bail!("aws CLI not found. Install it or set aws.bin_path in the config file");
    }
    let client = QueueClient::new(Arc::new(cli));

    let mut terminal = setup_terminal()?;

    let (input_tx, input_rx, data_tx, data_rx) = create_channels();
    let mut runtime = TuiRuntime::new();

    runtime.track(spawn_input_task(input_tx, runtime.cancel_token()));
    if config.refresh.auto_interval > 0 {
        runtime.track(spawn_auto_refresh(
            data_tx.clone(),
            runtime.cancel_token(),
            Duration::from_secs(config.refresh.auto_interval),
        ));
    }

    tracing::info!(
        "Starting TUI for queue {} in {}",
        config.queue.name,
        config.aws.region
    );

    let mut app = App::new(
        config,
        config_warnings,
        client,
        data_tx,
        runtime.cancel_token(),
    );
    app.request_refresh();

    let result = run_event_loop(&mut app, input_rx, data_rx, |app| {
        terminal.draw(|frame| {
            let area = frame.area();
            app.set_terminal_size(area.width, area.height);
            ui::render(app, frame);
        })?;
        Ok(())
    })
    .await;

    app.save_config();

    runtime.shutdown().await;

    restore_terminal(&mut terminal)?;

    result
}

/// Setup the terminal for TUI mode
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI with the tokio runtime (entry point from main)
pub fn run(config: AppConfig, config_warnings: Vec<String>) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_tui(config, config_warnings))
}
