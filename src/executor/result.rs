//! Result types for fan-out execution

use std::fmt;

use crate::planner::PartitionKey;
use crate::store::{Record, StoreError};

/// Why a partition did not complete
#[derive(Debug, Clone, PartialEq)]
pub enum FailureCause {
    /// The store returned a non-retryable error, or retries ran out
    Store(StoreError),
    /// The partition task panicked or was cancelled
    TaskAborted(String),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Store(e) => write!(f, "{}", e),
            FailureCause::TaskAborted(reason) => write!(f, "partition task aborted: {}", reason),
        }
    }
}

/// A partition that did not finish paginating
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionFailure {
    /// Partition key of the failed query
    pub partition: PartitionKey,
    /// Failure cause
    pub cause: FailureCause,
}

/// Everything one partition task produced, built in a task-local buffer
#[derive(Debug, Clone)]
pub struct PartitionOutcome {
    /// Partition key the task queried
    pub partition: PartitionKey,
    /// Records deserialized so far
    pub records: Vec<Record>,
    /// Sum of page costs, including pages of a later failure
    pub consumed_capacity: f64,
    /// Pages received
    pub pages_fetched: usize,
    /// Store retries performed
    pub retries: usize,
    /// Records dropped as malformed
    pub skipped_records: usize,
    /// Set when pagination stopped early
    pub error: Option<StoreError>,
}

impl PartitionOutcome {
    /// Creates an empty outcome for a partition
    pub fn new(partition: PartitionKey) -> Self {
        Self {
            partition,
            records: Vec::new(),
            consumed_capacity: 0.0,
            pages_fetched: 0,
            retries: 0,
            skipped_records: 0,
            error: None,
        }
    }

    /// Returns true if every page was fetched
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Merged result of every partition
#[derive(Debug, Clone, Default)]
pub struct AggregatedResult {
    /// Records from all partitions, unordered
    pub records: Vec<Record>,
    /// Summed cost units
    pub consumed_capacity: f64,
    /// Partitions queried
    pub partitions: usize,
    /// Pages fetched across partitions
    pub pages_fetched: usize,
    /// Store retries across partitions
    pub retries: usize,
    /// Malformed records skipped
    pub skipped_records: usize,
    /// Partitions that did not complete
    pub failures: Vec<PartitionFailure>,
}

impl AggregatedResult {
    /// Creates an empty result
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records were collected
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns true if any partition failed
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Fold one partition outcome into the result
    pub fn merge(&mut self, outcome: PartitionOutcome) {
        self.partitions += 1;
        self.records.extend(outcome.records);
        self.consumed_capacity += outcome.consumed_capacity;
        self.pages_fetched += outcome.pages_fetched;
        self.retries += outcome.retries;
        self.skipped_records += outcome.skipped_records;
        if let Some(e) = outcome.error {
            self.failures.push(PartitionFailure {
                partition: outcome.partition,
                cause: FailureCause::Store(e),
            });
        }
    }

    /// Record a partition whose task never reported back
    pub fn record_aborted(&mut self, partition: PartitionKey, reason: impl Into<String>) {
        self.partitions += 1;
        self.failures.push(PartitionFailure {
            partition,
            cause: FailureCause::TaskAborted(reason.into()),
        });
    }
}
