//! Fan-out executor
//!
//! Runs one task per partition and merges their results.
//!
//! Execution flow (strict order):
//! 1. Plan every partition query (no store traffic on a bad request)
//! 2. Spawn one task per partition into a `JoinSet`
//! 3. Each task paginates sequentially into its own buffer
//! 4. Wait for every task (fan-in barrier)
//! 5. Merge outcomes in partition-key order
//! 6. Apply the failure policy

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::observability::{log_event_with_fields, Event, Logger};
use crate::planner::{FilterRequest, PartitionKey, QueryBuilder, QuerySpec};
use crate::store::{deserialize_record, ContinuationToken, QueryRequest, QueryStore};

use super::errors::{ExecutorError, ExecutorResult};
use super::result::{AggregatedResult, PartitionOutcome};
use super::retry::{retry_store, RetrySettings};

/// What to do when some partitions fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Any failed partition fails the request
    #[default]
    FailRequest,
    /// Return what succeeded, with the failures listed
    AllowPartial,
}

impl FailurePolicy {
    /// Policy for the `allow_partial_results` setting
    pub fn from_allow_partial(allow_partial: bool) -> Self {
        if allow_partial {
            FailurePolicy::AllowPartial
        } else {
            FailurePolicy::FailRequest
        }
    }
}

/// Executes filter requests against a store, one task per partition
pub struct FanOutExecutor<S: QueryStore> {
    store: Arc<S>,
    builder: QueryBuilder,
    retry: RetrySettings,
    policy: FailurePolicy,
}

impl<S: QueryStore> FanOutExecutor<S> {
    /// Creates an executor with default table, retries and policy
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            builder: QueryBuilder::default(),
            retry: RetrySettings::default(),
            policy: FailurePolicy::default(),
        }
    }

    /// Use a specific query builder
    pub fn with_builder(mut self, builder: QueryBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Use specific retry settings
    pub fn with_retry(mut self, retry: RetrySettings) -> Self {
        self.retry = retry;
        self
    }

    /// Use a specific failure policy
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the failure policy
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Plan the partition queries for a request without executing them
    pub fn plan(&self, filters: &FilterRequest) -> ExecutorResult<Vec<QuerySpec>> {
        self.builder
            .plan_queries(filters)
            .map_err(ExecutorError::plan_rejected)
    }

    /// Execute a filter request.
    ///
    /// Waits for every partition before returning. Dropping the returned
    /// future aborts the partition tasks still running.
    pub async fn execute(&self, filters: &FilterRequest) -> ExecutorResult<AggregatedResult> {
        let specs = self.plan(filters)?;
        self.execute_plan(specs).await
    }

    /// Execute already planned partition queries
    pub async fn execute_plan(&self, specs: Vec<QuerySpec>) -> ExecutorResult<AggregatedResult> {
        let keys: Vec<PartitionKey> = specs.iter().map(|s| s.partition_key).collect();

        let mut tasks = JoinSet::new();
        for spec in specs {
            tasks.spawn(run_partition(
                Arc::clone(&self.store),
                Arc::new(spec),
                self.retry,
            ));
        }

        let mut outcomes = BTreeMap::new();
        let mut join_errors = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    outcomes.insert(outcome.partition, outcome);
                }
                Err(e) => join_errors.push(e.to_string()),
            }
        }

        let mut result = AggregatedResult::empty();
        for key in keys {
            match outcomes.remove(&key) {
                Some(outcome) => result.merge(outcome),
                None => {
                    let reason = if join_errors.is_empty() {
                        "task did not report".to_string()
                    } else {
                        join_errors.join("; ")
                    };
                    log_event_with_fields(
                        Event::PartitionFailed,
                        &[("partition", &key.to_string()), ("error", &reason)],
                    );
                    result.record_aborted(key, reason);
                }
            }
        }

        if !result.is_partial() {
            return Ok(result);
        }

        match self.policy {
            FailurePolicy::FailRequest => Err(ExecutorError::partition_failed(result)),
            FailurePolicy::AllowPartial => Ok(result),
        }
    }
}

/// Paginate one partition to completion or first unrecoverable error
async fn run_partition<S: QueryStore>(
    store: Arc<S>,
    spec: Arc<QuerySpec>,
    retry: RetrySettings,
) -> PartitionOutcome {
    let partition = spec.partition_key;
    let operation = format!("partition {}", partition);
    let mut outcome = PartitionOutcome::new(partition);
    let mut token: Option<ContinuationToken> = None;

    loop {
        let request = QueryRequest {
            spec: Arc::clone(&spec),
            exclusive_start: token.take(),
        };
        let (result, retries) =
            retry_store(&operation, &retry, || store.query(request.clone())).await;
        outcome.retries += retries;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                log_event_with_fields(
                    Event::PartitionFailed,
                    &[
                        ("partition", &partition.to_string()),
                        ("pages_fetched", &outcome.pages_fetched.to_string()),
                        ("error", &e.to_string()),
                    ],
                );
                outcome.error = Some(e);
                return outcome;
            }
        };

        outcome.pages_fetched += 1;
        outcome.consumed_capacity += page.consumed_capacity;

        for raw in &page.records {
            match deserialize_record(raw) {
                Ok(record) => outcome.records.push(record),
                Err(e) => {
                    outcome.skipped_records += 1;
                    log_event_with_fields(
                        Event::RecordSkipped,
                        &[
                            ("partition", &partition.to_string()),
                            ("error", &e.to_string()),
                        ],
                    );
                }
            }
        }

        Logger::trace(
            Event::PartitionPage.as_str(),
            &[
                ("partition", &partition.to_string()),
                ("page", &outcome.pages_fetched.to_string()),
                ("records", &page.records.len().to_string()),
                ("consumed_capacity", &page.consumed_capacity.to_string()),
            ],
        );

        match page.continuation {
            Some(next) => token = Some(next),
            None => return outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{ExecutorErrorCode, FailureCause};
    use crate::planner::{MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE};
    use crate::store::{AttributeValue, MemoryStore, RawRecord};

    fn listing(id: &str, lat: f64, lon: f64) -> serde_json::Value {
        serde_json::json!({"id": id, "latitude": lat, "longitude": lon, "bedroomsTotal": 2})
    }

    fn window(min_lat: f64, max_lat: f64) -> FilterRequest {
        FilterRequest::new()
            .with(MIN_LATITUDE, min_lat)
            .with(MAX_LATITUDE, max_lat)
            .with(MIN_LONGITUDE, -117.5)
            .with(MAX_LONGITUDE, -117.0)
    }

    fn store() -> Arc<MemoryStore> {
        let listings = serde_json::json!([
            listing("A", 32.51, -117.1),
            listing("B", 32.55, -117.2),
            listing("C", 32.61, -117.3),
            listing("D", 32.72, -117.4),
            listing("E", 32.95, -117.1)
        ]);
        Arc::new(MemoryStore::from_listings(&listings, 1).unwrap())
    }

    #[tokio::test]
    async fn test_execute_merges_partitions() {
        let executor = FanOutExecutor::new(store());
        let result = executor.execute(&window(32.5, 32.79)).await.unwrap();

        let mut ids: Vec<&str> = result
            .records
            .iter()
            .filter_map(|r| r["id"].as_str())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["A", "B", "C", "D"]);
        assert_eq!(result.partitions, 3);
        // page size 1: two pages in 325, one each in 326 and 327
        assert_eq!(result.pages_fetched, 4);
        assert_eq!(result.consumed_capacity, 2.0);
        assert!(!result.is_partial());
    }

    #[tokio::test]
    async fn test_plan_error_before_store_traffic() {
        let filters = window(32.5, 32.79).with("minGarage", true);
        let err = FanOutExecutor::new(store()).execute(&filters).await.unwrap_err();
        assert_eq!(err.code(), ExecutorErrorCode::SearchPlanRejected);
    }

    #[tokio::test]
    async fn test_inverted_window_is_empty() {
        let result = FanOutExecutor::new(store())
            .execute(&window(32.9, 32.5))
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.partitions, 0);
    }

    #[tokio::test]
    async fn test_malformed_records_skipped() {
        let mut memory = MemoryStore::new(10);
        for (id, price) in [("A", "500000"), ("B", "call agent")] {
            let mut record: RawRecord = RawRecord::new();
            record.insert("id".into(), AttributeValue::S(id.into()));
            record.insert("latitude_box".into(), AttributeValue::N("325".into()));
            record.insert("longitude".into(), AttributeValue::N("-117.2".into()));
            record.insert("listPrice".into(), AttributeValue::N(price.into()));
            memory.insert_raw(record);
        }

        let result = FanOutExecutor::new(Arc::new(memory))
            .execute(&window(32.5, 32.55))
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.skipped_records, 1);
    }

    #[tokio::test]
    async fn test_store_rejection_recorded_as_failure() {
        let memory = MemoryStore::new(10);
        let filters = window(32.5, 32.55);
        let executor = FanOutExecutor::new(Arc::new(memory)).with_retry(RetrySettings::none());

        // A query without longitude bounds is refused by the store
        let mut spec = executor.plan(&filters).unwrap().remove(0);
        spec.values.remove(":minLongitude");
        let outcome = run_partition(Arc::clone(executor.store()), Arc::new(spec), RetrySettings::none()).await;
        assert!(!outcome.is_complete());

        let mut result = AggregatedResult::empty();
        result.merge(outcome);
        assert!(matches!(result.failures[0].cause, FailureCause::Store(_)));
    }
}
