//! Job filtering for the job list
//!
//! A filter is a plain value: a job-name prefix and a set of accepted
//! statuses. Either part left empty accepts everything. The filter widget
//! builds a new value on every change and hands it to the controller whole.

use std::collections::BTreeSet;

use crate::models::{Job, JobStatus};

/// Current filter criteria
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSettings {
    /// Case-sensitive prefix of the job name ("" matches all)
    pub name_prefix: String,
    /// Accepted statuses (empty matches all)
    pub statuses: BTreeSet<JobStatus>,
}

impl FilterSettings {
    pub fn new(name_prefix: impl Into<String>, statuses: impl IntoIterator<Item = JobStatus>) -> Self {
        Self {
            name_prefix: name_prefix.into(),
            statuses: statuses.into_iter().collect(),
        }
    }

    /// True if `job` passes both the name and the status criterion
    #[must_use]
    pub fn matches(&self, job: &Job) -> bool {
        (self.name_prefix.is_empty() || job.job_name.starts_with(&self.name_prefix))
            && (self.statuses.is_empty() || self.statuses.contains(&job.status))
    }

    /// True when the filter accepts every job
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name_prefix.is_empty() && self.statuses.is_empty()
    }

    /// Same filter with another name prefix
    #[must_use]
    pub fn with_name_prefix(&self, prefix: impl Into<String>) -> Self {
        Self {
            name_prefix: prefix.into(),
            statuses: self.statuses.clone(),
        }
    }

    /// Same filter with `status` added to or removed from the accepted set
    #[must_use]
    pub fn with_status_toggled(&self, status: JobStatus) -> Self {
        let mut statuses = self.statuses.clone();
        if !statuses.remove(&status) {
            statuses.insert(status);
        }
        Self {
            name_prefix: self.name_prefix.clone(),
            statuses,
        }
    }

    /// Short description for the status bar, `None` when nothing is filtered
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut parts = Vec::new();
        if !self.name_prefix.is_empty() {
            parts.push(format!("name:{}*", self.name_prefix));
        }
        if !self.statuses.is_empty() {
            let names: Vec<&str> = self.statuses.iter().map(JobStatus::as_str).collect();
            parts.push(format!("status:{}", names.join(",")));
        }
        Some(parts.join(" "))
    }
}
