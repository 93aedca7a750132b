//! Metrics registry
//!
//! - Counters only
//! - Monotonic increase, reset only on process start
//! - Thread-safe, lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Metrics registry containing all search counters
///
/// All counters use Relaxed atomics; readers tolerate slightly stale values.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    searches_executed: AtomicU64,
    searches_rejected: AtomicU64,
    searches_failed: AtomicU64,
    searches_partial: AtomicU64,
    partitions_queried: AtomicU64,
    pages_fetched: AtomicU64,
    store_retries: AtomicU64,
    records_returned: AtomicU64,
    records_skipped: AtomicU64,
    /// Consumed capacity in thousandths of a unit
    consumed_capacity_milli: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_searches_executed(&self) {
        self.searches_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_searches_rejected(&self) {
        self.searches_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_searches_failed(&self) {
        self.searches_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_searches_partial(&self) {
        self.searches_partial.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_partitions(&self, count: u64) {
        self.partitions_queried.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_pages(&self, count: u64) {
        self.pages_fetched.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_retries(&self, count: u64) {
        self.store_retries.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_records_returned(&self, count: u64) {
        self.records_returned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_records_skipped(&self, count: u64) {
        self.records_skipped.fetch_add(count, Ordering::Relaxed);
    }

    /// Add consumed capacity units. Negative and non-finite values are ignored.
    pub fn add_consumed_capacity(&self, units: f64) {
        if units.is_finite() && units > 0.0 {
            let milli = (units * 1000.0).round() as u64;
            self.consumed_capacity_milli.fetch_add(milli, Ordering::Relaxed);
        }
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            searches_executed: self.searches_executed.load(Ordering::Relaxed),
            searches_rejected: self.searches_rejected.load(Ordering::Relaxed),
            searches_failed: self.searches_failed.load(Ordering::Relaxed),
            searches_partial: self.searches_partial.load(Ordering::Relaxed),
            partitions_queried: self.partitions_queried.load(Ordering::Relaxed),
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            store_retries: self.store_retries.load(Ordering::Relaxed),
            records_returned: self.records_returned.load(Ordering::Relaxed),
            records_skipped: self.records_skipped.load(Ordering::Relaxed),
            consumed_capacity: self.consumed_capacity_milli.load(Ordering::Relaxed) as f64
                / 1000.0,
        }
    }

    /// Current snapshot as a JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub searches_executed: u64,
    pub searches_rejected: u64,
    pub searches_failed: u64,
    pub searches_partial: u64,
    pub partitions_queried: u64,
    pub pages_fetched: u64,
    pub store_retries: u64,
    pub records_returned: u64,
    pub records_skipped: u64,
    pub consumed_capacity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let snapshot = MetricsRegistry::new().snapshot();
        assert_eq!(snapshot.searches_executed, 0);
        assert_eq!(snapshot.pages_fetched, 0);
        assert_eq!(snapshot.consumed_capacity, 0.0);
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();

        registry.increment_searches_executed();
        registry.increment_searches_executed();
        registry.increment_searches_rejected();
        registry.add_partitions(4);
        registry.add_pages(7);
        registry.add_records_skipped(1);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.searches_executed, 2);
        assert_eq!(snapshot.searches_rejected, 1);
        assert_eq!(snapshot.partitions_queried, 4);
        assert_eq!(snapshot.pages_fetched, 7);
        assert_eq!(snapshot.records_skipped, 1);
    }

    #[test]
    fn test_consumed_capacity_accumulates() {
        let registry = MetricsRegistry::new();
        registry.add_consumed_capacity(1.5);
        registry.add_consumed_capacity(0.5);
        registry.add_consumed_capacity(-3.0);
        registry.add_consumed_capacity(f64::NAN);

        assert_eq!(registry.snapshot().consumed_capacity, 2.0);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.increment_searches_failed();
        registry.add_records_returned(12);

        let parsed: serde_json::Value = serde_json::from_str(&registry.to_json()).unwrap();
        assert_eq!(parsed["searches_failed"], 1);
        assert_eq!(parsed["records_returned"], 12);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.add_pages(1);
                    reg.increment_searches_executed();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.pages_fetched, 1000);
        assert_eq!(snapshot.searches_executed, 1000);
    }
}
