//! batchmon - Terminal dashboard for AWS Batch job queues

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use dialoguer::{Confirm, theme::ColorfulTheme};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use batchmon::batch::{AwsCli, DEFAULT_TERMINATE_REASON, QueueClient};
use batchmon::display;
use batchmon::models::{AppConfig, Job, JobStatus};
use batchmon::tui::{self, app::FilterSettings};
use batchmon::utils::natural_sort_by_key;

#[derive(Parser)]
#[command(name = "batchmon")]
#[command(about = "Terminal dashboard for AWS Batch job queues", long_about = None)]
#[command(version)]
struct Cli {
    /// Job queue to show (overrides config)
    #[arg(short, long, global = true)]
    queue: Option<String>,

    /// AWS region (overrides config)
    #[arg(short, long, global = true)]
    region: Option<String>,

    /// AWS CLI profile (overrides config)
    #[arg(short, long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch interactive TUI mode (default)
    #[command(alias = "ui")]
    Tui,

    /// List the jobs of the queue
    Jobs {
        /// Only show jobs whose name starts with this prefix
        #[arg(short, long, value_name = "PREFIX")]
        name: Option<String>,

        /// Only show these statuses (comma-separated, e.g. RUNNING,FAILED)
        #[arg(short, long, value_name = "STATUSES")]
        status: Option<String>,

        /// Watch mode: refresh every N seconds
        #[arg(short, long, value_name = "SECONDS", default_value = "0")]
        watch: f64,
    },

    /// List the child tasks of an array job
    Children {
        /// Array job ID
        job_id: String,
    },

    /// Show details of a job
    Describe {
        /// Job ID or ARN
        job_id: String,
    },

    /// Print the log of a job
    Logs {
        /// Job ID or ARN
        job_id: String,
    },

    /// Terminate one or more jobs
    #[command(alias = "kill")]
    Terminate {
        /// Job IDs to terminate
        #[arg(required = true)]
        job_ids: Vec<String>,

        /// Reason recorded on the jobs
        #[arg(long, default_value = DEFAULT_TERMINATE_REASON)]
        reason: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List job queue names
    Queues,

    /// List region names
    Regions,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging()?;

    let (mut config, warnings) = AppConfig::load();
    config.apply_cli_overrides(cli.queue, cli.region, cli.profile);

    let command = cli.command.unwrap_or(Commands::Tui);
    if matches!(command, Commands::Tui) {
        return tui::run(config, warnings);
    }

    for warning in &warnings {
        eprintln!("{} {}", "warning:".yellow(), warning);
    }
    let client = connect(&config)?;

    match command {
        Commands::Tui => {} // started above
        Commands::Jobs {
            name,
            status,
            watch,
        } => {
            let filter = parse_filter(name, status.as_deref())?;
            if watch > 0.0 {
                watch_loop(watch, || handle_jobs_command(&client, &config, &filter))?;
            } else {
                let spinner = spinner(&format!("Listing jobs in {}...", config.queue.name))?;
                let output = handle_jobs_command(&client, &config, &filter);
                spinner.finish_and_clear();
                println!("{}", output?);
            }
        }
        Commands::Children { job_id } => {
            let spinner = spinner(&format!("Listing children of {}...", job_id))?;
            let children = client
                .list_array_children(&job_id)
                .collect::<Result<Vec<Job>, _>>();
            spinner.finish_and_clear();
            let mut children = children?;
            natural_sort_by_key(&mut children, |j| &j.job_id);
            println!("{}", display::format_status_summary(&children));
            println!(
                "{}",
                display::format_jobs(&children, config.display.job_name_max_length)
            );
        }
        Commands::Describe { job_id } => {
            let described = client.describe_jobs_blocking(&[job_id.clone()])?;
            match described.first() {
                Some(job) => println!("{}", display::format_job_details(job)),
                None => bail!("Job {} not found", job_id),
            }
        }
        Commands::Logs { job_id } => handle_logs_command(&client, &job_id)?,
        Commands::Terminate {
            job_ids,
            reason,
            yes,
        } => handle_terminate_command(&client, job_ids, &reason, yes)?,
        Commands::Queues => {
            let names = client.list_queue_names()?;
            println!("{}", display::format_names(&names, &config.queue.name));
        }
        Commands::Regions => {
            let names = client.list_region_names()?;
            println!("{}", display::format_names(&names, &config.aws.region));
        }
    }

    Ok(())
}

/// Build a queue client on top of the `aws` CLI
fn connect(config: &AppConfig) -> Result<QueueClient> {
    let aws = AwsCli::from_config(&config.aws);
    if aws.is_missing() {
        bail!("aws CLI not found. Install it or set aws.bin_path in the config file");
    }
    Ok(QueueClient::new(Arc::new(aws)))
}

/// Send tracing output to a file when `BATCHMON_LOG` is set.
///
/// The TUI owns the terminal, so logs never go to stdout or stderr.
fn init_logging() -> Result<()> {
    let Ok(directive) = std::env::var("BATCHMON_LOG") else {
        return Ok(());
    };

    let dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("batchmon");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let path: PathBuf = dir.join("batchmon.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();

    tracing::info!("batchmon {} starting", env!("CARGO_PKG_VERSION"));
    Ok(())
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Failed to set spinner template")?,
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// Build a filter from `--name` and a comma-separated `--status` list
fn parse_filter(name: Option<String>, statuses: Option<&str>) -> Result<FilterSettings> {
    let statuses = match statuses {
        Some(list) => list
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_uppercase().parse::<JobStatus>())
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    Ok(FilterSettings::new(name.unwrap_or_default(), statuses))
}

fn handle_jobs_command(
    client: &QueueClient,
    config: &AppConfig,
    filter: &FilterSettings,
) -> Result<String> {
    let jobs = client
        .list_jobs(&config.queue.name)
        .collect::<Result<Vec<Job>, _>>()?;
    let shown: Vec<Job> = jobs.into_iter().filter(|j| filter.matches(j)).collect();

    let mut output = format!(
        "\n{} {} ({})\n{}\n\n",
        "Queue".bold(),
        config.queue.name.cyan(),
        config.aws.region,
        display::format_status_summary(&shown)
    );
    if let Some(summary) = filter.summary() {
        output.push_str(&format!("Filter: {}\n\n", summary));
    }
    output.push_str(&display::format_jobs(
        &shown,
        config.display.job_name_max_length,
    ));
    Ok(output)
}

fn handle_logs_command(client: &QueueClient, job_id: &str) -> Result<()> {
    let described = client.describe_jobs_blocking(&[job_id.to_string()])?;
    let Some(job) = described.into_iter().next().map(|d| d.job) else {
        bail!("Job {} not found", job_id);
    };
    let Some(stream) = job.log_stream_name else {
        if job.has_array_properties() {
            bail!("Log stream not available for array jobs");
        }
        bail!("No logs available");
    };

    let mut stdout = io::stdout().lock();
    for line in client.stream_log_events(&stream) {
        writeln!(stdout, "{}", line?)?;
    }
    Ok(())
}

fn handle_terminate_command(
    client: &QueueClient,
    job_ids: Vec<String>,
    reason: &str,
    yes: bool,
) -> Result<()> {
    if !yes {
        let prompt = if job_ids.len() == 1 {
            format!("Terminate job {}?", job_ids[0])
        } else {
            format!("Terminate {} jobs?", job_ids.len())
        };
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(client.terminate_jobs(job_ids, reason));
    print!("{}", display::format_termination_report(&report));
    if !report.failures.is_empty() {
        bail!("{} termination(s) failed", report.failures.len());
    }
    Ok(())
}

/// Watch loop that repeatedly executes a command with flicker-free updates
fn watch_loop<F>(interval: f64, command: F) -> Result<()>
where
    F: Fn() -> Result<String>,
{
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let result = (|| -> Result<()> {
        while running.load(Ordering::SeqCst) {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

            let output = match command() {
                Ok(s) => s,
                Err(e) => format!("Error: {}", e),
            };

            let screen_content = format!(
                "{}\n\nLast updated: {} | Refreshing every {}s | Press Ctrl+C to exit",
                output, timestamp, interval
            );

            // Synchronized update so the terminal renders the whole frame at once
            write!(stdout, "\x1B[?2026h")?;
            write!(stdout, "\x1B[H{}\x1B[J", screen_content)?;
            write!(stdout, "\x1B[?2026l")?;
            stdout.flush()?;

            // Sleep in short steps so Ctrl+C is noticed promptly
            let mut remaining = Duration::from_secs_f64(interval);
            while !remaining.is_zero() && running.load(Ordering::SeqCst) {
                let step = remaining.min(Duration::from_millis(200));
                thread::sleep(step);
                remaining -= step;
            }
        }
        Ok(())
    })();

    execute!(io::stdout(), Show, LeaveAlternateScreen)?;
    println!("Watch mode stopped.");

    result
}
