//! In-memory [`BatchApi`] double for tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{BatchApi, BatchError, ListJobsQuery, LogPage, Page};
use crate::models::{DescribedJob, Job, JobStatus};

/// Serves canned pages and records every call.
///
/// Queue pages are addressed by the token `"page-N"`; the first page has no
/// token. Children and log pages work the same way.
#[derive(Default)]
pub struct FakeBatchApi {
    queue_pages: Vec<Vec<Job>>,
    children: HashMap<JobStatus, Vec<Job>>,
    log_pages: Vec<Vec<String>>,
    queue_names: Vec<String>,
    region_names: Vec<String>,
    /// Log stream reported by describe, keyed by job ARN
    log_streams: HashMap<String, String>,
    /// Array size reported by describe, keyed by job ARN
    array_sizes: HashMap<String, u32>,

    queue_failure: Mutex<Option<(usize, BatchError)>>,
    children_failure: Mutex<Option<BatchError>>,
    describe_failure: Mutex<Option<BatchError>>,
    failing_terminations: Mutex<HashSet<String>>,

    list_calls: AtomicUsize,
    describe_calls: AtomicUsize,
    log_calls: AtomicUsize,
    child_statuses: Mutex<Vec<JobStatus>>,
    log_tokens: Mutex<Vec<Option<String>>>,
    terminated: Mutex<Vec<String>>,
    regions_requested: Mutex<Vec<String>>,
}

fn page_index(token: Option<&str>) -> usize {
    token
        .and_then(|t| t.strip_prefix("page-"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

fn page_of<T: Clone>(pages: &[Vec<T>], token: Option<&str>) -> Page<T> {
    let index = page_index(token);
    Page {
        items: pages.get(index).cloned().unwrap_or_default(),
        next_token: (index + 1 < pages.len()).then(|| format!("page-{}", index + 1)),
    }
}

impl FakeBatchApi {
    pub fn with_queue_pages(pages: Vec<Vec<Job>>) -> Self {
        Self {
            queue_pages: pages,
            ..Default::default()
        }
    }

    pub fn with_children(mut self, status: JobStatus, jobs: Vec<Job>) -> Self {
        self.children.insert(status, jobs);
        self
    }

    pub fn with_log_pages(mut self, pages: Vec<Vec<String>>) -> Self {
        self.log_pages = pages;
        self
    }

    pub fn with_names(mut self, queues: &[&str], regions: &[&str]) -> Self {
        self.queue_names = queues.iter().map(|s| s.to_string()).collect();
        self.region_names = regions.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_log_stream(mut self, job_arn: &str, stream: &str) -> Self {
        self.log_streams.insert(job_arn.to_string(), stream.to_string());
        self
    }

    pub fn with_array_size(mut self, job_arn: &str, size: u32) -> Self {
        self.array_sizes.insert(job_arn.to_string(), size);
        self
    }

    /// Fail the queue listing when page `page` is requested
    pub fn fail_queue_at_page(&self, page: usize, error: BatchError) {
        *self.queue_failure.lock().unwrap() = Some((page, error));
    }

    pub fn fail_children_with(&self, error: BatchError) {
        *self.children_failure.lock().unwrap() = Some(error);
    }

    pub fn fail_describe_with(&self, error: BatchError) {
        *self.describe_failure.lock().unwrap() = Some(error);
    }

    pub fn fail_termination_of(&self, job_id: &str) {
        self.failing_terminations
            .lock()
            .unwrap()
            .insert(job_id.to_string());
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn describe_calls(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }

    pub fn log_calls(&self) -> usize {
        self.log_calls.load(Ordering::SeqCst)
    }

    pub fn child_statuses_queried(&self) -> Vec<JobStatus> {
        self.child_statuses.lock().unwrap().clone()
    }

    pub fn log_tokens_seen(&self) -> Vec<Option<String>> {
        self.log_tokens.lock().unwrap().clone()
    }

    pub fn terminated(&self) -> Vec<String> {
        self.terminated.lock().unwrap().clone()
    }

    pub fn regions_requested(&self) -> Vec<String> {
        self.regions_requested.lock().unwrap().clone()
    }

    fn describe_one(&self, arn: &str) -> DescribedJob {
        let id = arn.rsplit('/').next().unwrap_or(arn).to_string();
        let mut raw = serde_json::json!({
            "jobArn": arn,
            "jobId": id,
            "jobName": format!("job-{id}"),
            "status": "SUCCEEDED",
            "createdAt": 0,
        });
        if let Some(stream) = self.log_streams.get(arn) {
            raw["container"] = serde_json::json!({ "logStreamName": stream });
        }
        if let Some(size) = self.array_sizes.get(arn) {
            raw["arrayProperties"] = serde_json::json!({ "size": size });
        }
        let wire: crate::models::JobWire = serde_json::from_value(raw.clone()).unwrap();
        DescribedJob {
            job: wire.into(),
            raw,
        }
    }
}

impl BatchApi for FakeBatchApi {
    fn list_jobs_page(
        &self,
        query: &ListJobsQuery,
        token: Option<&str>,
    ) -> Result<Page<Job>, BatchError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        match query {
            ListJobsQuery::Queue(_) => {
                if let Some((page, error)) = self.queue_failure.lock().unwrap().as_ref()
                    && *page == page_index(token)
                {
                    return Err(error.clone());
                }
                Ok(page_of(&self.queue_pages, token))
            }
            ListJobsQuery::ArrayChildren { status, .. } => {
                self.child_statuses.lock().unwrap().push(*status);
                if let Some(error) = self.children_failure.lock().unwrap().as_ref() {
                    return Err(error.clone());
                }
                Ok(Page::last(self.children.get(status).cloned().unwrap_or_default()))
            }
        }
    }

    fn describe_jobs(&self, job_arns: &[String]) -> Result<Vec<DescribedJob>, BatchError> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        assert!(job_arns.len() <= super::DESCRIBE_BATCH_SIZE);
        if let Some(error) = self.describe_failure.lock().unwrap().as_ref() {
            return Err(error.clone());
        }
        Ok(job_arns.iter().map(|arn| self.describe_one(arn)).collect())
    }

    fn terminate_job(&self, job_id: &str, _reason: &str) -> Result<(), BatchError> {
        if self.failing_terminations.lock().unwrap().contains(job_id) {
            return Err(BatchError::Remote(format!("cannot terminate {job_id}")));
        }
        self.terminated.lock().unwrap().push(job_id.to_string());
        Ok(())
    }

    fn log_events_page(&self, _stream: &str, token: Option<&str>) -> Result<LogPage, BatchError> {
        self.log_calls.fetch_add(1, Ordering::SeqCst);
        self.log_tokens
            .lock()
            .unwrap()
            .push(token.map(str::to_string));
        let index = page_index(token);
        Ok(LogPage {
            messages: self.log_pages.get(index).cloned().unwrap_or_default(),
            // Like CloudWatch, a forward token is always returned
            next_forward_token: Some(format!("page-{}", index + 1)),
        })
    }

    fn job_queue_names(&self) -> Result<Vec<String>, BatchError> {
        Ok(self.queue_names.clone())
    }

    fn region_names(&self) -> Result<Vec<String>, BatchError> {
        Ok(self.region_names.clone())
    }

    fn with_region(&self, region: &str) -> Arc<dyn BatchApi> {
        self.regions_requested
            .lock()
            .unwrap()
            .push(region.to_string());
        Arc::new(FakeBatchApi {
            queue_pages: self.queue_pages.clone(),
            ..Default::default()
        })
    }
}
