//! Shared test utilities
//!
//! `ScriptedStore` answers partition queries from fixed pages and can be told
//! to fail specific pages or to delay every call.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use searchx::planner::{
    FilterRequest, PartitionKey, MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE,
};
use searchx::store::{
    AttributeValue, ContinuationToken, QueryRequest, QueryStore, RawRecord, ResultPage,
    StoreError, StoreResult,
};

/// Cost charged for a partition the script knows nothing about
pub const EMPTY_PARTITION_COST: f64 = 0.5;

/// One scripted page
#[derive(Debug, Clone)]
pub struct ScriptedPage {
    pub records: Vec<RawRecord>,
    pub consumed_capacity: f64,
}

/// Store answering from scripted pages
#[derive(Default)]
pub struct ScriptedStore {
    pages: HashMap<PartitionKey, Vec<ScriptedPage>>,
    failures: Mutex<HashMap<(PartitionKey, usize), VecDeque<StoreError>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page to a partition
    pub fn with_page(mut self, partition: PartitionKey, records: Vec<RawRecord>, cost: f64) -> Self {
        self.pages.entry(partition).or_default().push(ScriptedPage {
            records,
            consumed_capacity: cost,
        });
        self
    }

    /// Fail the given page (0-based) once per queued error
    pub fn fail_page(self, partition: PartitionKey, page: usize, error: StoreError) -> Self {
        if let Ok(mut failures) = self.failures.lock() {
            failures.entry((partition, page)).or_default().push_back(error);
        }
        self
    }

    /// Sleep before answering every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Store calls received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most calls observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn answer(&self, request: &QueryRequest) -> StoreResult<ResultPage> {
        let partition = request.spec.partition_key;
        let index = match &request.exclusive_start {
            None => 0,
            Some(token) => token
                .as_str()
                .parse::<usize>()
                .map_err(|_| StoreError::rejected("bad token"))?,
        };

        if let Ok(mut failures) = self.failures.lock() {
            if let Some(error) = failures.get_mut(&(partition, index)).and_then(VecDeque::pop_front) {
                return Err(error);
            }
        }

        let pages = match self.pages.get(&partition) {
            Some(pages) => pages,
            None => {
                return Ok(ResultPage {
                    records: Vec::new(),
                    continuation: None,
                    consumed_capacity: EMPTY_PARTITION_COST,
                })
            }
        };
        let page = pages
            .get(index)
            .ok_or_else(|| StoreError::rejected("token past the last page"))?;

        Ok(ResultPage {
            records: page.records.clone(),
            continuation: (index + 1 < pages.len())
                .then(|| ContinuationToken::new((index + 1).to_string())),
            consumed_capacity: page.consumed_capacity,
        })
    }
}

impl QueryStore for ScriptedStore {
    fn query(&self, request: QueryRequest) -> impl Future<Output = StoreResult<ResultPage>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self.answer(&request);
        let delay = self.delay;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let in_flight = &self.in_flight;
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }
}

/// A raw record in the store's tagged shape
pub fn raw_listing(id: &str, latitude: f64, longitude: f64) -> RawRecord {
    let mut record = RawRecord::new();
    record.insert("id".into(), AttributeValue::S(id.into()));
    record.insert("latitude".into(), AttributeValue::N(latitude.to_string()));
    record.insert("longitude".into(), AttributeValue::N(longitude.to_string()));
    record
}

/// A listing with every attribute the response shape needs
pub fn full_listing(id: &str, latitude: f64, longitude: f64) -> RawRecord {
    let mut record = raw_listing(id, latitude, longitude);
    for (name, value) in [
        ("listPrice", "450000"),
        ("bedroomsTotal", "3"),
        ("bathroomsTotalInteger", "2"),
        ("bathroomsHalf", "0"),
        ("postalCode", "92101"),
    ] {
        record.insert(name.into(), AttributeValue::N(value.into()));
    }
    for (name, value) in [
        ("status", "Active"),
        ("livingArea", "1200"),
        ("unitAddress", "10 Main St #3"),
        ("city", "San Diego"),
        ("stateOrProvince", "CA"),
    ] {
        record.insert(name.into(), AttributeValue::S(value.into()));
    }
    record
}

/// Filters for a window spanning `[min_lat, max_lat]`
pub fn window(min_lat: f64, max_lat: f64) -> FilterRequest {
    FilterRequest::new()
        .with(MIN_LATITUDE, min_lat)
        .with(MAX_LATITUDE, max_lat)
        .with(MIN_LONGITUDE, -117.5)
        .with(MAX_LONGITUDE, -116.5)
}
