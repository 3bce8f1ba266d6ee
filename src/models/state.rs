//! Job status type.
//!
//! AWS Batch reports exactly seven job statuses. They are parsed once at the
//! client boundary; anything else is rejected there as a malformed payload.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a batch job.
///
/// Variant order follows the lifecycle (SUBMITTED first, terminal states last)
/// and is the order used in the filter panel. Sorting by status compares the
/// status *names*, see [`JobStatus::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Submitted,
    Pending,
    Runnable,
    Starting,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [JobStatus; 7] = [
        JobStatus::Submitted,
        JobStatus::Pending,
        JobStatus::Runnable,
        JobStatus::Starting,
        JobStatus::Running,
        JobStatus::Succeeded,
        JobStatus::Failed,
    ];

    /// Statuses queried when enumerating the children of an array job.
    ///
    /// The remote API only lists array children for one status at a time.
    pub const CHILD_QUERY_ORDER: [JobStatus; 6] = [
        JobStatus::Succeeded,
        JobStatus::Failed,
        JobStatus::Runnable,
        JobStatus::Running,
        JobStatus::Pending,
        JobStatus::Starting,
    ];

    /// Return the status name as reported by AWS Batch.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "SUBMITTED",
            Self::Pending => "PENDING",
            Self::Runnable => "RUNNABLE",
            Self::Starting => "STARTING",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
        }
    }

    /// True once the job can no longer change status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status string is not one of the seven known names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job status '{0}'")]
pub struct ParseJobStatusError(pub String);

impl std::str::FromStr for JobStatus {
    type Err = ParseJobStatusError;

    /// Parse a status name, case-insensitively (`"running"` and `"RUNNING"` both work).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == upper)
            .ok_or_else(|| ParseJobStatusError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_str_case_insensitive() {
        assert_eq!("running".parse::<JobStatus>(), Ok(JobStatus::Running));
        assert_eq!("FAILED".parse::<JobStatus>(), Ok(JobStatus::Failed));
        assert_eq!(" Runnable ".parse::<JobStatus>(), Ok(JobStatus::Runnable));
        assert!("COMPLETED".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_status_serde_uses_wire_names() {
        let json = serde_json::to_string(&JobStatus::Succeeded).unwrap();
        assert_eq!(json, "\"SUCCEEDED\"");

        let parsed: JobStatus = serde_json::from_str("\"STARTING\"").unwrap();
        assert_eq!(parsed, JobStatus::Starting);

        assert!(serde_json::from_str::<JobStatus>("\"UNKNOWN\"").is_err());
    }

    #[test]
    fn test_child_query_order_skips_submitted() {
        assert_eq!(JobStatus::CHILD_QUERY_ORDER.len(), 6);
        assert!(!JobStatus::CHILD_QUERY_ORDER.contains(&JobStatus::Submitted));
        assert_eq!(JobStatus::CHILD_QUERY_ORDER[0], JobStatus::Succeeded);
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(!JobStatus::Submitted.is_terminal());
    }
}
