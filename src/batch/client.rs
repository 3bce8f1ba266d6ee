//! Queue client adapter: pagination, fan-out and batching over [`BatchApi`].

use std::sync::Arc;

use futures::future::join_all;

use super::pager::{Page, Paginated};
use super::{BatchApi, BatchError, ListJobsQuery};
use crate::models::{DescribedJob, Job, JobStatus};

/// Largest number of jobs accepted by one describe call
pub const DESCRIBE_BATCH_SIZE: usize = 100;

/// Reason recorded on jobs terminated without an explicit one
pub const DEFAULT_TERMINATE_REASON: &str = "Terminated by user from batchmon";

/// Lazy stream of every job in a queue
pub type JobPager = Paginated<Job>;

/// Lazy, forward-only stream of log lines
pub type LogEvents = Paginated<String>;

/// Outcome of a batch termination
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminationReport {
    pub requested: usize,
    /// `(job_id, error message)` for every request that failed
    pub failures: Vec<(String, String)>,
}

impl TerminationReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.requested - self.failures.len()
    }
}

/// Children of one array job, one status stream after another.
///
/// Stops at the first error.
pub struct ChildJobs {
    streams: std::vec::IntoIter<JobPager>,
    current: Option<JobPager>,
    failed: bool,
}

impl Iterator for ChildJobs {
    type Item = Result<Job, BatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(stream) = self.current.as_mut() {
                match stream.next() {
                    Some(Ok(job)) => return Some(Ok(job)),
                    Some(Err(e)) => {
                        self.failed = true;
                        return Some(Err(e));
                    }
                    None => self.current = None,
                }
            }
            self.current = Some(self.streams.next()?);
        }
    }
}

/// High-level access to one region's job queues
#[derive(Clone)]
pub struct QueueClient {
    api: Arc<dyn BatchApi>,
}

impl QueueClient {
    pub fn new(api: Arc<dyn BatchApi>) -> Self {
        Self { api }
    }

    /// The same client, pointed at another region
    #[must_use]
    pub fn with_region(&self, region: &str) -> Self {
        Self::new(self.api.with_region(region))
    }

    fn pager(&self, query: ListJobsQuery) -> JobPager {
        let api = self.api.clone();
        Paginated::new(move |token| api.list_jobs_page(&query, token))
    }

    /// Every job in `queue`, page by page, across all statuses
    pub fn list_jobs(&self, queue: &str) -> JobPager {
        self.pager(ListJobsQuery::Queue(queue.to_string()))
    }

    /// Every child of the array job `parent_id`.
    ///
    /// Child listing requires a status, so one paginated query is issued per
    /// status in [`JobStatus::CHILD_QUERY_ORDER`] and the streams are concatenated.
    pub fn list_array_children(&self, parent_id: &str) -> ChildJobs {
        let streams: Vec<JobPager> = JobStatus::CHILD_QUERY_ORDER
            .into_iter()
            .map(|status| {
                self.pager(ListJobsQuery::ArrayChildren {
                    parent_id: parent_id.to_string(),
                    status,
                })
            })
            .collect();

        ChildJobs {
            streams: streams.into_iter(),
            current: None,
            failed: false,
        }
    }

    /// Describe any number of jobs.
    ///
    /// Identifiers are split into batches of [`DESCRIBE_BATCH_SIZE`]; batches
    /// run in parallel on the blocking pool. The result order is not tied to
    /// the input order.
    pub async fn describe_jobs(&self, job_arns: &[String]) -> Result<Vec<DescribedJob>, BatchError> {
        let handles: Vec<_> = job_arns
            .chunks(DESCRIBE_BATCH_SIZE)
            .map(|chunk| {
                let api = self.api.clone();
                let chunk = chunk.to_vec();
                tokio::task::spawn_blocking(move || api.describe_jobs(&chunk))
            })
            .collect();

        let mut described = Vec::with_capacity(job_arns.len());
        for result in join_all(handles).await {
            let batch =
                result.map_err(|e| BatchError::Remote(format!("Task join error: {}", e)))??;
            described.extend(batch);
        }
        Ok(described)
    }

    /// Blocking variant of [`QueueClient::describe_jobs`] for the command line;
    /// batches run one after another.
    pub fn describe_jobs_blocking(&self, job_arns: &[String]) -> Result<Vec<DescribedJob>, BatchError> {
        let mut described = Vec::with_capacity(job_arns.len());
        for chunk in job_arns.chunks(DESCRIBE_BATCH_SIZE) {
            described.extend(self.api.describe_jobs(chunk)?);
        }
        Ok(described)
    }

    /// Log lines of `stream` from the beginning.
    ///
    /// Each page continues from the previous page's forward token; the stream
    /// ends at the first page with no events. Call again to start over.
    pub fn stream_log_events(&self, stream: &str) -> LogEvents {
        let api = self.api.clone();
        let stream = stream.to_string();
        Paginated::new(move |token| {
            let page = api.log_events_page(&stream, token)?;
            let next_token = if page.messages.is_empty() {
                None
            } else {
                page.next_forward_token
            };
            Ok(Page {
                items: page.messages,
                next_token,
            })
        })
    }

    /// Terminate a single job
    pub fn terminate_job(&self, job_id: &str, reason: &str) -> Result<(), BatchError> {
        self.api.terminate_job(job_id, reason)
    }

    /// Request termination of every job in `job_ids`, all in parallel.
    ///
    /// Individual failures are logged and collected in the report, never raised.
    pub async fn terminate_jobs(&self, job_ids: Vec<String>, reason: &str) -> TerminationReport {
        let requested = job_ids.len();
        let handles: Vec<_> = job_ids
            .into_iter()
            .map(|job_id| {
                let api = self.api.clone();
                let reason = reason.to_string();
                tokio::task::spawn_blocking(move || {
                    let result = api.terminate_job(&job_id, &reason);
                    (job_id, result)
                })
            })
            .collect();

        let mut report = TerminationReport {
            requested,
            failures: Vec::new(),
        };
        for result in join_all(handles).await {
            match result {
                Ok((_, Ok(()))) => {}
                Ok((job_id, Err(e))) => {
                    tracing::warn!("Failed to terminate job {}: {}", job_id, e);
                    report.failures.push((job_id, e.to_string()));
                }
                Err(e) => {
                    tracing::warn!("Termination task failed: {}", e);
                    report
                        .failures
                        .push((String::new(), format!("Task join error: {}", e)));
                }
            }
        }
        report
    }

    pub fn list_queue_names(&self) -> Result<Vec<String>, BatchError> {
        self.api.job_queue_names()
    }

    pub fn list_region_names(&self) -> Result<Vec<String>, BatchError> {
        self.api.region_names()
    }
}
