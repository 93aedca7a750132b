//! Observable events
//!
//! Every log line emitted by the service names one of these events.

use std::fmt;

/// Observable events in searchx
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Startup begins
    BootStart,
    /// Startup complete, ready to serve
    BootComplete,
    /// Shutdown initiated
    ShutdownStart,

    // Configuration
    /// Configuration loaded
    ConfigLoaded,
    /// Geo dataset loaded
    GeoDatasetLoaded,
    /// Geo dataset could not be loaded; serving with an empty dataset
    GeoDatasetFallback,
    /// Listings loaded into the in-memory store
    ListingsLoaded,

    // Search
    /// Raw search request received
    SearchReceived,
    /// Partition queries planned
    SearchPlanned,
    /// Search finished with all partitions answered
    SearchExecuted,
    /// Search rejected before any store traffic
    SearchRejected,
    /// Search failed after fan-out
    SearchFailed,
    /// Search returned partial results
    SearchPartial,

    // Partition fan-out
    /// One store page fetched for a partition
    PartitionPage,
    /// Store call retried after a retryable error
    PartitionRetry,
    /// Partition gave up
    PartitionFailed,
    /// Record dropped during deserialization or normalization
    RecordSkipped,

    // Server
    /// HTTP server listening
    Serving,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "SEARCHX_STARTUP_BEGIN",
            Event::BootComplete => "SEARCHX_STARTUP_COMPLETE",
            Event::ShutdownStart => "SHUTDOWN_START",

            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::GeoDatasetLoaded => "GEO_DATASET_LOADED",
            Event::GeoDatasetFallback => "GEO_DATASET_FALLBACK",
            Event::ListingsLoaded => "LISTINGS_LOADED",

            Event::SearchReceived => "SEARCH_BEGIN",
            Event::SearchPlanned => "SEARCH_PLANNED",
            Event::SearchExecuted => "SEARCH_COMPLETE",
            Event::SearchRejected => "SEARCH_REJECTED",
            Event::SearchFailed => "SEARCH_FAILED",
            Event::SearchPartial => "SEARCH_PARTIAL",

            Event::PartitionPage => "PARTITION_PAGE",
            Event::PartitionRetry => "PARTITION_RETRY",
            Event::PartitionFailed => "PARTITION_FAILED",
            Event::RecordSkipped => "RECORD_SKIPPED",

            Event::Serving => "SEARCHX_SERVING",
        }
    }

    /// Returns true if this event indicates the request or process could not proceed
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::SearchFailed | Event::PartitionFailed)
    }

    /// Returns true if this event flags degraded but continuing operation
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            Event::GeoDatasetFallback
                | Event::SearchPartial
                | Event::PartitionRetry
                | Event::RecordSkipped
                | Event::SearchRejected
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
