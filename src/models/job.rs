//! Typed job snapshot.

use serde::Serialize;

use super::state::JobStatus;

/// Array metadata attached to array jobs.
///
/// Parents carry `size` (number of child tasks), children carry `index`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArrayProperties {
    pub size: Option<u32>,
    pub index: Option<u32>,
}

/// Read-only snapshot of one job as returned by the job queue API.
///
/// Jobs are never mutated after parsing; a refresh replaces them wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub job_id: String,
    pub job_arn: String,
    pub job_name: String,
    pub status: JobStatus,
    /// Creation time in epoch milliseconds
    pub created_at: i64,
    pub array_properties: Option<ArrayProperties>,
    /// Only populated from a detail fetch
    pub log_stream_name: Option<String>,
    pub status_reason: Option<String>,
    pub started_at: Option<i64>,
    pub stopped_at: Option<i64>,
}

impl Job {
    /// True if the job carries array metadata (parent or child task)
    #[must_use]
    pub fn has_array_properties(&self) -> bool {
        self.array_properties.is_some()
    }

    /// Number of child tasks for an array parent
    #[must_use]
    pub fn array_size(&self) -> Option<u32> {
        self.array_properties.as_ref().and_then(|p| p.size)
    }

    /// Index of a child task within its parent array
    #[must_use]
    pub fn array_index(&self) -> Option<u32> {
        self.array_properties.as_ref().and_then(|p| p.index)
    }

    /// Wall-clock runtime in seconds, if the job has started.
    ///
    /// Running jobs are measured against `now_ms`. A finished job without a
    /// stop time has no runtime.
    #[must_use]
    pub fn runtime_seconds(&self, now_ms: i64) -> Option<i64> {
        let start = self.started_at?;
        let end = match self.stopped_at {
            Some(stopped) => stopped,
            None if self.status.is_terminal() => return None,
            None => now_ms,
        };
        Some((end - start).max(0) / 1000)
    }
}

/// Result of a detail fetch: the typed job plus the full JSON document
#[derive(Debug, Clone)]
pub struct DescribedJob {
    pub job: Job,
    pub raw: serde_json::Value,
}

impl DescribedJob {
    /// Pretty-printed JSON for the details viewer
    #[must_use]
    pub fn pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.raw).unwrap_or_else(|_| self.raw.to_string())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Build a plain (non-array) job for tests
    pub fn job(id: &str, name: &str, status: JobStatus, created_at: i64) -> Job {
        Job {
            job_id: id.to_string(),
            job_arn: format!("arn:aws:batch:eu-west-1:123456789012:job/{id}"),
            job_name: name.to_string(),
            status,
            created_at,
            array_properties: None,
            log_stream_name: None,
            status_reason: None,
            started_at: None,
            stopped_at: None,
        }
    }

    /// Build an array parent job with `size` children
    pub fn array_job(id: &str, name: &str, size: u32) -> Job {
        Job {
            array_properties: Some(ArrayProperties {
                size: Some(size),
                index: None,
            }),
            ..job(id, name, JobStatus::Running, 0)
        }
    }

    /// Build an array child task `<parent>:<index>`
    pub fn child_job(parent: &str, index: u32, status: JobStatus) -> Job {
        Job {
            array_properties: Some(ArrayProperties {
                size: None,
                index: Some(index),
            }),
            ..job(&format!("{parent}:{index}"), "child", status, 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_array_accessors() {
        let parent = array_job("p", "sweep", 10);
        assert!(parent.has_array_properties());
        assert_eq!(parent.array_size(), Some(10));
        assert_eq!(parent.array_index(), None);

        let child = child_job("p", 3, JobStatus::Pending);
        assert_eq!(child.array_size(), None);
        assert_eq!(child.array_index(), Some(3));
        assert_eq!(child.job_id, "p:3");
    }

    #[test]
    fn test_runtime_seconds() {
        let mut j = job("a", "a", JobStatus::Running, 0);
        assert_eq!(j.runtime_seconds(10_000), None);

        j.started_at = Some(1_000);
        assert_eq!(j.runtime_seconds(61_000), Some(60));

        j.stopped_at = Some(31_000);
        assert_eq!(j.runtime_seconds(999_999), Some(30));
    }

    #[test]
    fn test_finished_job_without_stop_time_has_no_runtime() {
        let mut j = job("a", "a", JobStatus::Failed, 0);
        j.started_at = Some(1_000);
        assert_eq!(j.runtime_seconds(61_000), None);

        j.stopped_at = Some(11_000);
        assert_eq!(j.runtime_seconds(61_000), Some(10));
    }
}
