//! batchmon - terminal dashboard for AWS Batch job queues
//!
//! The library exposes the queue client, the job models and the TUI so the
//! binary and the benchmarks share one implementation.

pub mod batch;
pub mod display;
pub mod formatting;
pub mod models;
pub mod tui;
pub mod utils;
