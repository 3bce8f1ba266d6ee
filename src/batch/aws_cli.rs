//! [`BatchApi`] implementation on top of the `aws` command line tool.
//!
//! Every call runs the CLI with `--output json` and parses stdout with serde.
//! Credentials, SSO sessions and retries are whatever the CLI is configured
//! with; a failing call is classified from its stderr.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::{BatchApi, BatchError, ListJobsQuery, LogPage, Page};
use crate::models::{
    AwsConfig, DescribeJobQueuesResponse, DescribeJobsResponse, DescribeRegionsResponse,
    DescribedJob, GetLogEventsResponse, Job, ListJobsResponse,
};

/// How the `aws` binary path was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResolution {
    /// Explicitly configured via config file or environment variable
    Configured,
    /// Found in the user's PATH
    AutoDetected,
    /// Found in a well-known install location
    Fallback,
    /// Not found anywhere; calls will fail with a hint
    NotFound,
}

/// Result of locating the `aws` binary
#[derive(Debug, Clone)]
pub struct AwsPathResult {
    pub path: PathBuf,
    pub resolution: PathResolution,
}

const FALLBACK_LOCATIONS: [&str; 2] = ["/usr/local/bin/aws", "/usr/bin/aws"];

/// Find the `aws` executable.
///
/// Resolution order:
/// 1. Explicit path from config, if it points at an existing file
/// 2. `aws` in PATH (via the `which` crate)
/// 3. `/usr/local/bin/aws`, then `/usr/bin/aws`
pub fn find_aws_bin(config_path: Option<&Path>) -> AwsPathResult {
    if let Some(path) = config_path {
        if path.is_file() {
            return AwsPathResult {
                path: path.to_path_buf(),
                resolution: PathResolution::Configured,
            };
        }
        tracing::warn!(
            "Configured aws.bin_path '{}' is not a file, trying auto-detection",
            path.display()
        );
    }

    if let Ok(path) = which::which("aws") {
        return AwsPathResult {
            path,
            resolution: PathResolution::AutoDetected,
        };
    }

    for candidate in FALLBACK_LOCATIONS {
        let path = PathBuf::from(candidate);
        if path.is_file() {
            return AwsPathResult {
                path,
                resolution: PathResolution::Fallback,
            };
        }
    }

    AwsPathResult {
        path: PathBuf::from("aws"),
        resolution: PathResolution::NotFound,
    }
}

/// stderr fragments that mean "log in again"
const UNAUTHORIZED_MARKERS: &[&str] = &[
    "UnauthorizedSSOTokenError",
    "The SSO session associated with this profile has expired",
    "Error loading SSO Token",
    "Token has expired and refresh failed",
    "ExpiredToken",
    "InvalidClientTokenId",
    "UnrecognizedClientException",
    "Unable to locate credentials",
];

/// Map a failed CLI invocation to a [`BatchError`]
#[must_use]
pub fn classify_failure(stderr: &str) -> BatchError {
    if UNAUTHORIZED_MARKERS
        .iter()
        .any(|marker| stderr.contains(marker))
    {
        return BatchError::Unauthorized;
    }
    let message = stderr.trim();
    if message.is_empty() {
        BatchError::Remote("aws command failed without output".to_string())
    } else {
        BatchError::Remote(message.to_string())
    }
}

/// Arguments for one `list-jobs` page
fn list_jobs_args(query: &ListJobsQuery, page_size: u32, token: Option<&str>) -> Vec<String> {
    let mut args: Vec<String> = vec!["batch".into(), "list-jobs".into()];
    match query {
        ListJobsQuery::Queue(queue) => {
            args.extend([
                "--job-queue".into(),
                queue.clone(),
                // Without a filter only RUNNING jobs are returned
                "--filters".into(),
                "name=AFTER_CREATED_AT,values=0".into(),
            ]);
        }
        ListJobsQuery::ArrayChildren { parent_id, status } => {
            args.extend([
                "--array-job-id".into(),
                parent_id.clone(),
                "--job-status".into(),
                status.as_str().into(),
            ]);
        }
    }
    args.extend(["--max-items".into(), page_size.to_string()]);
    if let Some(token) = token {
        args.extend(["--starting-token".into(), token.to_string()]);
    }
    args
}

fn log_events_args(log_group: &str, stream: &str, token: Option<&str>) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "logs".into(),
        "get-log-events".into(),
        "--log-group-name".into(),
        log_group.into(),
        "--log-stream-name".into(),
        stream.into(),
        "--start-from-head".into(),
    ];
    if let Some(token) = token {
        args.extend(["--next-token".into(), token.to_string()]);
    }
    args
}

/// AWS CLI backed job queue access
#[derive(Debug, Clone)]
pub struct AwsCli {
    bin: PathBuf,
    resolution: PathResolution,
    region: Option<String>,
    profile: Option<String>,
    log_group: String,
    page_size: u32,
}

impl AwsCli {
    pub fn from_config(config: &AwsConfig) -> Self {
        let found = find_aws_bin(config.bin_path.as_deref());
        Self {
            bin: found.path,
            resolution: found.resolution,
            region: Some(config.region.clone()).filter(|r| !r.is_empty()),
            profile: config.profile.clone(),
            log_group: config.log_group.clone(),
            page_size: config.page_size,
        }
    }

    /// True when no `aws` binary could be found
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.resolution == PathResolution::NotFound
    }

    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    fn command<S: AsRef<std::ffi::OsStr>>(&self, args: &[S]) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.args(args).args(["--output", "json", "--no-cli-pager"]);
        if let Some(region) = &self.region {
            cmd.arg("--region").arg(region);
        }
        if let Some(profile) = &self.profile {
            cmd.arg("--profile").arg(profile);
        }
        cmd
    }

    /// Run a command and return its stdout, classifying failures
    fn execute(&self, mut cmd: Command, context: &str) -> Result<String, BatchError> {
        tracing::debug!("aws {}", context);
        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BatchError::Remote(format!(
                    "aws CLI not found at '{}'. Install it or set aws.bin_path",
                    self.bin.display()
                ))
            } else {
                BatchError::Remote(format!("Failed to execute aws {}: {}", context, e))
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!("aws {} failed: {}", context, stderr.trim());
            return Err(classify_failure(&stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn run_json<T: DeserializeOwned>(&self, cmd: Command, context: &str) -> Result<T, BatchError> {
        let stdout = self.execute(cmd, context)?;
        serde_json::from_str(&stdout).map_err(|e| BatchError::Parse {
            context: context.to_string(),
            message: e.to_string(),
        })
    }
}

impl BatchApi for AwsCli {
    fn list_jobs_page(
        &self,
        query: &ListJobsQuery,
        token: Option<&str>,
    ) -> Result<Page<Job>, BatchError> {
        let cmd = self.command(&list_jobs_args(query, self.page_size, token));
        let response: ListJobsResponse = self.run_json(cmd, "batch list-jobs")?;
        Ok(Page {
            items: response.job_summary_list.into_iter().map(Job::from).collect(),
            next_token: response.next_token,
        })
    }

    fn describe_jobs(&self, job_arns: &[String]) -> Result<Vec<DescribedJob>, BatchError> {
        if job_arns.is_empty() {
            return Ok(Vec::new());
        }
        let mut args: Vec<&str> = vec!["batch", "describe-jobs", "--jobs"];
        args.extend(job_arns.iter().map(String::as_str));
        let response: DescribeJobsResponse =
            self.run_json(self.command(&args), "batch describe-jobs")?;
        response.into_described().map_err(|e| BatchError::Parse {
            context: "batch describe-jobs".to_string(),
            message: e.to_string(),
        })
    }

    fn terminate_job(&self, job_id: &str, reason: &str) -> Result<(), BatchError> {
        let cmd = self.command(&[
            "batch",
            "terminate-job",
            "--job-id",
            job_id,
            "--reason",
            reason,
        ]);
        self.execute(cmd, "batch terminate-job").map(|_| ())
    }

    fn log_events_page(&self, stream: &str, token: Option<&str>) -> Result<LogPage, BatchError> {
        let cmd = self.command(&log_events_args(&self.log_group, stream, token));
        let response: GetLogEventsResponse = self.run_json(cmd, "logs get-log-events")?;
        Ok(LogPage {
            messages: response.events.into_iter().map(|e| e.message).collect(),
            next_forward_token: response.next_forward_token,
        })
    }

    fn job_queue_names(&self) -> Result<Vec<String>, BatchError> {
        let response: DescribeJobQueuesResponse =
            self.run_json(self.command(&["batch", "describe-job-queues"]), "batch describe-job-queues")?;
        Ok(response
            .job_queues
            .into_iter()
            .map(|q| q.job_queue_name)
            .collect())
    }

    fn region_names(&self) -> Result<Vec<String>, BatchError> {
        let response: DescribeRegionsResponse =
            self.run_json(self.command(&["ec2", "describe-regions"]), "ec2 describe-regions")?;
        let mut names: Vec<String> = response
            .regions
            .into_iter()
            .map(|r| r.region_name)
            .collect();
        names.sort();
        Ok(names)
    }

    fn with_region(&self, region: &str) -> Arc<dyn BatchApi> {
        let mut cli = self.clone();
        cli.region = Some(region.to_string());
        Arc::new(cli)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobStatus;

    #[test]
    fn test_classify_sso_expiry_as_unauthorized() {
        let stderr = "\nError when retrieving token from sso: Token has expired and refresh failed\n";
        assert_eq!(classify_failure(stderr), BatchError::Unauthorized);

        let stderr = "An error occurred (UnrecognizedClientException) when calling the ListJobs operation";
        assert_eq!(classify_failure(stderr), BatchError::Unauthorized);
    }

    #[test]
    fn test_classify_other_failures_as_remote() {
        let stderr = "  An error occurred (ClientException) when calling the ListJobs operation: Job queue not found  \n";
        match classify_failure(stderr) {
            BatchError::Remote(msg) => {
                assert!(msg.starts_with("An error occurred"));
                assert!(!msg.ends_with('\n'));
            }
            other => panic!("expected Remote, got {other:?}"),
        }
        assert!(matches!(classify_failure(""), BatchError::Remote(_)));
    }

    #[test]
    fn test_list_jobs_args_for_queue() {
        let args = list_jobs_args(&ListJobsQuery::Queue("default".into()), 50, None);
        assert_eq!(
            args,
            vec![
                "batch",
                "list-jobs",
                "--job-queue",
                "default",
                "--filters",
                "name=AFTER_CREATED_AT,values=0",
                "--max-items",
                "50",
            ]
        );
    }

    #[test]
    fn test_list_jobs_args_for_children_with_token() {
        let query = ListJobsQuery::ArrayChildren {
            parent_id: "abc".into(),
            status: JobStatus::Runnable,
        };
        let args = list_jobs_args(&query, 100, Some("tok"));
        assert!(args.windows(2).any(|w| w == ["--array-job-id", "abc"]));
        assert!(args.windows(2).any(|w| w == ["--job-status", "RUNNABLE"]));
        assert!(args.windows(2).any(|w| w == ["--starting-token", "tok"]));
        assert!(!args.contains(&"--filters".to_string()));
    }

    #[test]
    fn test_log_events_args() {
        let first = log_events_args("/aws/batch/job", "s/1", None);
        assert!(first.contains(&"--start-from-head".to_string()));
        assert!(!first.contains(&"--next-token".to_string()));

        let next = log_events_args("/aws/batch/job", "s/1", Some("f/2"));
        assert!(next.windows(2).any(|w| w == ["--next-token", "f/2"]));
    }

    #[test]
    fn test_from_config_carries_region_and_profile() {
        let config = AwsConfig {
            profile: Some("dev".to_string()),
            ..AwsConfig::default()
        };
        let cli = AwsCli::from_config(&config);
        assert_eq!(cli.region(), Some("eu-west-1"));
        assert_eq!(cli.profile.as_deref(), Some("dev"));
        assert_eq!(cli.page_size, 100);
    }

    #[test]
    fn test_missing_binary_is_remote_error() {
        let mut config = AwsConfig::default();
        config.bin_path = Some(PathBuf::from("/nonexistent/aws-binary"));
        let mut cli = AwsCli::from_config(&config);
        cli.bin = PathBuf::from("/nonexistent/aws-binary");

        match cli.job_queue_names() {
            Err(BatchError::Remote(msg)) => assert!(msg.contains("not found")),
            other => panic!("expected Remote error, got {other:?}"),
        }
    }
}
