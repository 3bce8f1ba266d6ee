//! Access to the AWS Batch job queue and its CloudWatch logs.
//!
//! Two layers:
//! - [`BatchApi`]: one remote call per method (one page, one describe batch,
//!   one termination). [`AwsCli`] implements it by shelling out to the `aws`
//!   binary with JSON output.
//! - [`QueueClient`]: pagination, fan-out and batching on top of a `BatchApi`.
//!   This is what the rest of the crate talks to.

mod aws_cli;
mod client;
mod pager;
#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

pub use aws_cli::{AwsCli, AwsPathResult, PathResolution, classify_failure, find_aws_bin};
pub use client::{
    ChildJobs, DEFAULT_TERMINATE_REASON, DESCRIBE_BATCH_SIZE, JobPager, LogEvents, QueueClient,
    TerminationReport,
};
pub use pager::{Page, Paginated};

use crate::models::{DescribedJob, Job, JobStatus};

/// Errors raised by the job queue client
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    /// Credentials are missing or expired. The only error the dashboard treats as fatal.
    #[error("Unauthorized. Did you forget to login?")]
    Unauthorized,

    /// Any other failure reported by the remote service or the transport
    #[error("{0}")]
    Remote(String),

    /// The remote answered with something we could not parse
    #[error("failed to parse {context} output: {message}")]
    Parse { context: String, message: String },
}

impl BatchError {
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BatchError::Unauthorized)
    }
}

/// Which jobs a listing call asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListJobsQuery {
    /// Every job in the queue, regardless of status
    Queue(String),
    /// Children of one array job that currently have `status`
    ArrayChildren { parent_id: String, status: JobStatus },
}

/// One page of log output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogPage {
    pub messages: Vec<String>,
    pub next_forward_token: Option<String>,
}

/// Single-call access to the job queue service.
///
/// Implementations are blocking; async callers run them on the blocking pool.
pub trait BatchApi: Send + Sync {
    /// Fetch one page of jobs. `token` is the continuation token of the previous page.
    fn list_jobs_page(&self, query: &ListJobsQuery, token: Option<&str>)
    -> Result<Page<Job>, BatchError>;

    /// Describe up to 100 jobs by ARN (or id)
    fn describe_jobs(&self, job_arns: &[String]) -> Result<Vec<DescribedJob>, BatchError>;

    /// Request termination of one job
    fn terminate_job(&self, job_id: &str, reason: &str) -> Result<(), BatchError>;

    /// Fetch one page of log events, starting from the head of the stream
    /// when `token` is `None`
    fn log_events_page(&self, stream: &str, token: Option<&str>) -> Result<LogPage, BatchError>;

    fn job_queue_names(&self) -> Result<Vec<String>, BatchError>;

    fn region_names(&self) -> Result<Vec<String>, BatchError>;

    /// The same client, pointed at another region
    fn with_region(&self, region: &str) -> Arc<dyn BatchApi>;
}
