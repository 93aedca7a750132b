//! Fan-out executor subsystem
//!
//! Executes the partition queries of a filter request concurrently and
//! merges their paginated results.
//!
//! # Execution Flow
//!
//! 1. Plan all partition queries up front
//! 2. One task per partition, pages fetched sequentially
//! 3. Retryable store errors retried with backoff
//! 4. Malformed records skipped and counted
//! 5. Task-local buffers merged after every task has finished
//!
//! A failed partition never corrupts what siblings collected; whether the
//! request fails is decided by [`FailurePolicy`].

mod errors;
mod executor;
mod result;
mod retry;

pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult, Severity};
pub use executor::{FailurePolicy, FanOutExecutor};
pub use result::{AggregatedResult, FailureCause, PartitionFailure, PartitionOutcome};
pub use retry::{next_retry_delay, retry_store, RetrySettings};
