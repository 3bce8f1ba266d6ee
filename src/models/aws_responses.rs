//! Wire shapes of the AWS CLI JSON output.
//!
//! These mirror the camelCase documents printed by `aws batch ...`,
//! `aws logs ...` and `aws ec2 ...` with `--output json`. They are converted
//! into the typed models right after parsing and never leave the client.

use serde::Deserialize;

use super::job::{ArrayProperties, DescribedJob, Job};
use super::state::JobStatus;

/// `aws batch list-jobs`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListJobsResponse {
    #[serde(default)]
    pub job_summary_list: Vec<JobWire>,
    /// The CLI reports its pagination token as `NextToken`; the raw API uses `nextToken`
    #[serde(default, rename = "NextToken", alias = "nextToken")]
    pub next_token: Option<String>,
}

/// `aws batch describe-jobs`
///
/// Jobs are kept as raw documents so the details view can show every field.
#[derive(Debug, Deserialize)]
pub struct DescribeJobsResponse {
    #[serde(default)]
    pub jobs: Vec<serde_json::Value>,
}

impl DescribeJobsResponse {
    /// Parse every raw document into a [`DescribedJob`]
    pub fn into_described(self) -> Result<Vec<DescribedJob>, serde_json::Error> {
        self.jobs
            .into_iter()
            .map(|raw| {
                let wire: JobWire = serde_json::from_value(raw.clone())?;
                Ok(DescribedJob {
                    job: wire.into(),
                    raw,
                })
            })
            .collect()
    }
}

/// One job entry, shared by job summaries and job details
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobWire {
    pub job_id: String,
    #[serde(default)]
    pub job_arn: String,
    pub job_name: String,
    pub status: JobStatus,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub status_reason: Option<String>,
    #[serde(default)]
    pub started_at: Option<i64>,
    #[serde(default)]
    pub stopped_at: Option<i64>,
    #[serde(default)]
    pub array_properties: Option<ArrayPropertiesWire>,
    #[serde(default)]
    pub container: Option<ContainerWire>,
}

#[derive(Debug, Deserialize)]
pub struct ArrayPropertiesWire {
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub index: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerWire {
    #[serde(default)]
    pub log_stream_name: Option<String>,
}

impl From<JobWire> for Job {
    fn from(wire: JobWire) -> Self {
        Job {
            job_id: wire.job_id,
            job_arn: wire.job_arn,
            job_name: wire.job_name,
            status: wire.status,
            created_at: wire.created_at,
            array_properties: wire.array_properties.map(|p| ArrayProperties {
                size: p.size,
                index: p.index,
            }),
            log_stream_name: wire.container.and_then(|c| c.log_stream_name),
            status_reason: wire.status_reason,
            started_at: wire.started_at,
            stopped_at: wire.stopped_at,
        }
    }
}

/// `aws logs get-log-events`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetLogEventsResponse {
    #[serde(default)]
    pub events: Vec<LogEventWire>,
    #[serde(default)]
    pub next_forward_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogEventWire {
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub message: String,
}

/// `aws batch describe-job-queues`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeJobQueuesResponse {
    #[serde(default)]
    pub job_queues: Vec<JobQueueWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQueueWire {
    pub job_queue_name: String,
}

/// `aws ec2 describe-regions`
#[derive(Debug, Deserialize)]
pub struct DescribeRegionsResponse {
    #[serde(default, rename = "Regions")]
    pub regions: Vec<RegionWire>,
}

#[derive(Debug, Deserialize)]
pub struct RegionWire {
    #[serde(rename = "RegionName")]
    pub region_name: String,
}
