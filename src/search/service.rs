//! Search service
//!
//! Ties the pipeline together for one request:
//! normalize → resolve postal code → plan → fan out under a deadline →
//! shape listings. Every request gets a uuid carried in its log lines.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use uuid::Uuid;

use crate::executor::{AggregatedResult, ExecutorError, FanOutExecutor};
use crate::geo::GeoDataset;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::planner::FilterRequest;
use crate::store::QueryStore;

use super::errors::{SearchError, SearchResult};
use super::request::{normalize_request, NormalizedRequest};
use super::response::{normalize_records, Listing};

/// Default deadline for one search
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one search
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Request id used in log lines
    pub request_id: String,
    /// Shaped listings, unordered
    pub listings: Vec<Listing>,
    /// Summed store cost units
    pub consumed_capacity: f64,
    /// Partitions queried
    pub partitions: usize,
    /// Partitions that failed (only non-zero when partial results are allowed)
    pub failed_partitions: usize,
}

impl SearchOutcome {
    fn empty(request_id: String) -> Self {
        Self {
            request_id,
            listings: Vec::new(),
            consumed_capacity: 0.0,
            partitions: 0,
            failed_partitions: 0,
        }
    }

    /// Returns true if some partitions did not answer
    pub fn is_partial(&self) -> bool {
        self.failed_partitions > 0
    }
}

/// Search entry point shared by the HTTP server and the CLI
pub struct SearchService<S: QueryStore> {
    executor: FanOutExecutor<S>,
    geo: Arc<GeoDataset>,
    timeout: Duration,
    metrics: Arc<MetricsRegistry>,
}

impl<S: QueryStore> SearchService<S> {
    /// Creates a service with the default deadline and fresh metrics
    pub fn new(executor: FanOutExecutor<S>, geo: Arc<GeoDataset>) -> Self {
        Self {
            executor,
            geo,
            timeout: DEFAULT_QUERY_TIMEOUT,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Use a specific deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Share a metrics registry
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Returns the geo dataset
    pub fn geo(&self) -> &GeoDataset {
        &self.geo
    }

    /// Returns the metrics registry
    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Returns the executor
    pub fn executor(&self) -> &FanOutExecutor<S> {
        &self.executor
    }

    /// Run a search from a raw transport request
    pub async fn search(&self, raw: &Value) -> SearchResult<SearchOutcome> {
        let request_id = Uuid::new_v4().to_string();
        log_event_with_fields(
            Event::SearchReceived,
            &[("request_id", &request_id), ("request", &raw.to_string())],
        );

        match normalize_request(raw, &self.geo) {
            Ok(NormalizedRequest::Filters(filters)) => self.run(filters, request_id).await,
            Ok(NormalizedRequest::UnknownPostalCode(code)) => {
                self.metrics.increment_searches_executed();
                log_event_with_fields(
                    Event::SearchExecuted,
                    &[
                        ("request_id", &request_id),
                        ("postal_code", &code),
                        ("records", "0"),
                        ("reason", "unknown postal code"),
                    ],
                );
                Ok(SearchOutcome::empty(request_id))
            }
            Err(e) => Err(self.rejected(&request_id, e)),
        }
    }

    /// Run a search from already normalized filters
    pub async fn search_filters(&self, filters: FilterRequest) -> SearchResult<SearchOutcome> {
        self.run(filters, Uuid::new_v4().to_string()).await
    }

    async fn run(&self, filters: FilterRequest, request_id: String) -> SearchResult<SearchOutcome> {
        let started = Instant::now();

        let specs = self
            .executor
            .plan(&filters)
            .map_err(|e| self.rejected(&request_id, SearchError::from(e)))?;

        let index = specs.first().map(|s| s.index_name()).unwrap_or("none");
        log_event_with_fields(
            Event::SearchPlanned,
            &[
                ("request_id", &request_id),
                ("partitions", &specs.len().to_string()),
                ("index", index),
            ],
        );

        let executed = tokio::time::timeout(self.timeout, self.executor.execute_plan(specs)).await;
        let elapsed_ms = started.elapsed().as_millis().to_string();

        let result = match executed {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => return Err(self.failed(&request_id, &elapsed_ms, e)),
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                self.metrics.increment_searches_failed();
                log_event_with_fields(
                    Event::SearchFailed,
                    &[
                        ("request_id", &request_id),
                        ("code", "SEARCH_TIMEOUT"),
                        ("duration_ms", &elapsed_ms),
                    ],
                );
                return Err(SearchError::Timeout(timeout_ms));
            }
        };

        self.record_execution(&result);
        let (listings, skipped) = normalize_records(&result.records, &request_id);
        self.metrics.add_records_skipped(skipped as u64);
        self.metrics.add_records_returned(listings.len() as u64);
        self.metrics.increment_searches_executed();

        let fields: [(&str, &str); 9] = [
            ("request_id", request_id.as_str()),
            ("partitions", &result.partitions.to_string()),
            ("pages", &result.pages_fetched.to_string()),
            ("retries", &result.retries.to_string()),
            ("records", &listings.len().to_string()),
            ("skipped", &(result.skipped_records + skipped).to_string()),
            ("consumed_capacity", &result.consumed_capacity.to_string()),
            ("failed_partitions", &result.failures.len().to_string()),
            ("duration_ms", &elapsed_ms),
        ];
        if result.is_partial() {
            self.metrics.increment_searches_partial();
            log_event_with_fields(Event::SearchPartial, &fields);
        } else {
            log_event_with_fields(Event::SearchExecuted, &fields);
        }

        Ok(SearchOutcome {
            request_id,
            listings,
            consumed_capacity: result.consumed_capacity,
            partitions: result.partitions,
            failed_partitions: result.failures.len(),
        })
    }

    fn record_execution(&self, result: &AggregatedResult) {
        self.metrics.add_partitions(result.partitions as u64);
        self.metrics.add_pages(result.pages_fetched as u64);
        self.metrics.add_retries(result.retries as u64);
        self.metrics.add_records_skipped(result.skipped_records as u64);
        self.metrics.add_consumed_capacity(result.consumed_capacity);
    }

    fn rejected(&self, request_id: &str, err: SearchError) -> SearchError {
        self.metrics.increment_searches_rejected();
        log_event_with_fields(
            Event::SearchRejected,
            &[
                ("request_id", request_id),
                ("code", err.code()),
                ("error", &err.to_string()),
            ],
        );
        err
    }

    fn failed(&self, request_id: &str, elapsed_ms: &str, err: ExecutorError) -> SearchError {
        if let Some(partial) = err.partial() {
            self.record_execution(partial);
        }
        let failures: Vec<String> = err
            .failures()
            .iter()
            .map(|f| format!("{}: {}", f.partition, f.cause))
            .collect();
        self.metrics.increment_searches_failed();
        log_event_with_fields(
            Event::SearchFailed,
            &[
                ("request_id", request_id),
                ("code", err.code().code()),
                ("failures", &failures.join("; ")),
                ("duration_ms", elapsed_ms),
            ],
        );
        SearchError::from(err)
    }
}
