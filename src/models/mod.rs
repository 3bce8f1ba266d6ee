//! Data models for the AWS Batch job queue.
//!
//! This module provides the typed job snapshot used throughout the crate,
//! the wire shapes of the AWS CLI JSON output, and configuration types.

mod aws_responses;
mod config;
mod job;
mod state;

pub use aws_responses::{
    DescribeJobQueuesResponse, DescribeJobsResponse, DescribeRegionsResponse,
    GetLogEventsResponse, JobWire, ListJobsResponse,
};
pub use config::{
    AppConfig, AwsConfig, BehaviorConfig, ConfigError, DisplayConfig, QueueConfig, RefreshConfig,
};
pub use job::{ArrayProperties, DescribedJob, Job};
pub use state::{JobStatus, ParseJobStatusError};

#[cfg(test)]
pub(crate) use job::test_support;
