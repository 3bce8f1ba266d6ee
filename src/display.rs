//! Display and formatting functions for the command line output

use owo_colors::OwoColorize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, Width, object::Rows},
};

use crate::batch::TerminationReport;
use crate::formatting::{
    format_duration_human, format_epoch_millis, format_optional_epoch_millis, truncate_string,
};
use crate::models::{DescribedJob, Job, JobStatus};

/// Color a job status the same way the TUI theme does
pub fn format_status(status: JobStatus) -> String {
    let text = status.as_str();
    match status {
        JobStatus::Submitted | JobStatus::Pending | JobStatus::Runnable => {
            text.yellow().to_string()
        }
        JobStatus::Starting => text.cyan().to_string(),
        JobStatus::Running => text.green().to_string(),
        JobStatus::Succeeded => text.bright_blue().to_string(),
        JobStatus::Failed => text.red().to_string(),
    }
}

fn format_runtime(job: &Job, now_ms: i64) -> String {
    match job.runtime_seconds(now_ms) {
        Some(secs) => format_duration_human(secs.max(0) as u64),
        None => "-".to_string(),
    }
}

#[derive(Tabled)]
struct JobRow {
    #[tabled(rename = "Job ID")]
    job_id: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Status")]
    status: String,

    #[tabled(rename = "Created At")]
    created: String,

    #[tabled(rename = "Runtime")]
    runtime: String,
}

/// Format a job listing as a table
pub fn format_jobs(jobs: &[Job], name_max_len: usize) -> String {
    if jobs.is_empty() {
        return "No jobs found".yellow().to_string();
    }

    let now_ms = chrono::Utc::now().timestamp_millis();
    let rows: Vec<JobRow> = jobs
        .iter()
        .map(|job| {
            let name = truncate_string(&job.job_name, name_max_len);
            JobRow {
                job_id: job.job_id.clone(),
                name: match job.array_size() {
                    Some(size) => format!("{} ({} tasks)", name, size),
                    None => name,
                },
                status: format_status(job.status),
                created: format_epoch_millis(job.created_at),
                runtime: format_runtime(job, now_ms),
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Width::wrap(200).keep_words(true))
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

/// One-line totals per status, e.g. `12 jobs: 3 RUNNING, 9 SUCCEEDED`
pub fn format_status_summary(jobs: &[Job]) -> String {
    let mut parts = Vec::new();
    for status in JobStatus::ALL {
        let count = jobs.iter().filter(|j| j.status == status).count();
        if count > 0 {
            parts.push(format!("{} {}", count, format_status(status)));
        }
    }
    if parts.is_empty() {
        format!("{} jobs", jobs.len())
    } else {
        format!("{} jobs: {}", jobs.len(), parts.join(", "))
    }
}

fn detail_line(label: &str, value: &str) -> String {
    format!("  {:<14} {}\n", format!("{}:", label).bold(), value)
}

/// Format the detail view of a single job followed by its full JSON document
pub fn format_job_details(described: &DescribedJob) -> String {
    let job = &described.job;
    let now_ms = chrono::Utc::now().timestamp_millis();
    let mut output = String::new();

    output.push_str(&format!("\n{}\n", job.job_name.bold().underline()));
    output.push_str(&detail_line("Job ID", &job.job_id.cyan().to_string()));
    output.push_str(&detail_line("ARN", &job.job_arn));
    output.push_str(&detail_line("Status", &format_status(job.status)));
    if let Some(reason) = &job.status_reason {
        output.push_str(&detail_line("Reason", reason));
    }
    output.push_str(&detail_line("Created", &format_epoch_millis(job.created_at)));
    output.push_str(&detail_line("Started", &format_optional_epoch_millis(job.started_at)));
    output.push_str(&detail_line("Stopped", &format_optional_epoch_millis(job.stopped_at)));
    output.push_str(&detail_line("Runtime", &format_runtime(job, now_ms)));
    if let Some(size) = job.array_size() {
        output.push_str(&detail_line("Array size", &size.to_string()));
    }
    if let Some(index) = job.array_index() {
        output.push_str(&detail_line("Array index", &index.to_string()));
    }
    output.push_str(&detail_line(
        "Log stream",
        job.log_stream_name.as_deref().unwrap_or("-"),
    ));

    output.push('\n');
    output.push_str(&described.pretty_json().bright_black().to_string());
    output
}

/// Format the outcome of a termination request
pub fn format_termination_report(report: &TerminationReport) -> String {
    let mut output = format!(
        "{} {} of {} job(s)\n",
        "Terminated".green(),
        report.succeeded(),
        report.requested
    );
    for (job_id, error) in &report.failures {
        output.push_str(&format!("  {} {}: {}\n", "failed".red(), job_id, error));
    }
    output
}

/// Format a plain list of names (queues, regions), marking `current`
pub fn format_names(names: &[String], current: &str) -> String {
    if names.is_empty() {
        return "None found".yellow().to_string();
    }
    names
        .iter()
        .map(|name| {
            if name == current {
                format!("* {}", name.green().bold())
            } else {
                format!("  {}", name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
