//! In-memory listing store
//!
//! Implements the paginated query protocol over a fixed set of records.
//! Evaluation mirrors the real store:
//! - the key condition selects rows of one partition within the longitude range
//! - `page_size` bounds the rows *examined* per page, before filtering
//! - the filter expression is applied to the examined rows
//! - the web-available index is sparse: only available listings carry its key

use std::cmp::Ordering;
use std::fs;
use std::future::Future;
use std::path::Path;

use serde_json::Value;

use crate::planner::{partition_key, FilterClause, QuerySpec, TargetIndex, LONGITUDE_ATTRIBUTE};

use super::attribute::{raw_record_from_json, AttributeValue, RawRecord};
use super::errors::{StoreError, StoreResult};
use super::page::{ContinuationToken, QueryRequest, QueryStore, ResultPage};

/// Capacity units charged per examined row
pub const CAPACITY_PER_ROW: f64 = 0.5;

/// Default rows examined per page
pub const DEFAULT_PAGE_SIZE: usize = 100;

const LATITUDE_ATTRIBUTE: &str = "latitude";
const WEB_AVAILABLE_ATTRIBUTE: &str = "webAvailable";

/// Immutable in-memory store
#[derive(Debug, Clone)]
pub struct MemoryStore {
    records: Vec<RawRecord>,
    page_size: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl MemoryStore {
    /// Creates an empty store. A page size of 0 is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            records: Vec::new(),
            page_size: page_size.max(1),
        }
    }

    /// Load listings from a JSON array of plain objects
    pub fn from_listings_file(path: &Path, page_size: usize) -> StoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            StoreError::unavailable(format!("cannot read listings {}: {}", path.display(), e))
        })?;
        let listings: Value = serde_json::from_str(&content)
            .map_err(|e| StoreError::malformed(format!("invalid listings JSON: {}", e)))?;
        Self::from_listings(&listings, page_size)
    }

    /// Load listings from a JSON array of plain objects
    pub fn from_listings(listings: &Value, page_size: usize) -> StoreResult<Self> {
        let items = listings
            .as_array()
            .ok_or_else(|| StoreError::malformed("listings must be a JSON array"))?;

        let mut store = Self::new(page_size);
        for (i, item) in items.iter().enumerate() {
            let object = item
                .as_object()
                .ok_or_else(|| StoreError::malformed(format!("listing {} is not an object", i)))?;
            store.insert_listing(raw_record_from_json(object));
        }
        Ok(store)
    }

    /// Insert a listing, deriving its index keys from `latitude` and
    /// `webAvailable` when they are not already present.
    pub fn insert_listing(&mut self, mut record: RawRecord) {
        let band = record
            .get(LATITUDE_ATTRIBUTE)
            .and_then(AttributeValue::as_f64)
            .map(partition_key);

        if let Some(band) = band {
            let key = TargetIndex::LatitudeLongitude.partition_attribute();
            record
                .entry(key.to_string())
                .or_insert_with(|| AttributeValue::N(band.to_string()));

            if record.get(WEB_AVAILABLE_ATTRIBUTE) == Some(&AttributeValue::Bool(true)) {
                let key = TargetIndex::WebAvailable.partition_attribute();
                record
                    .entry(key.to_string())
                    .or_insert_with(|| AttributeValue::N(band.to_string()));
            }
        }

        self.records.push(record);
    }

    /// Insert a raw record as-is
    pub fn insert_raw(&mut self, record: RawRecord) {
        self.records.push(record);
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows examined per page
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Answer one page request synchronously
    pub fn query_page(&self, request: &QueryRequest) -> StoreResult<ResultPage> {
        let spec = &*request.spec;
        let (min_lon, max_lon) = spec
            .longitude_range()
            .ok_or_else(|| StoreError::rejected("key condition longitude bounds are not numeric"))?;

        let start = match &request.exclusive_start {
            None => 0,
            Some(token) => token
                .as_str()
                .parse::<usize>()
                .map_err(|_| StoreError::rejected(format!("invalid continuation token '{}'", token)))?,
        };

        let candidates: Vec<&RawRecord> = self
            .records
            .iter()
            .filter(|r| key_matches(spec, r, min_lon, max_lon))
            .collect();

        let end = start.saturating_add(self.page_size).min(candidates.len());
        let examined = candidates.get(start..end).unwrap_or(&[]);

        let mut records = Vec::new();
        for record in examined {
            if filter_matches(spec, record)? {
                records.push((*record).clone());
            }
        }

        let continuation = if end < candidates.len() {
            Some(ContinuationToken::new(end.to_string()))
        } else {
            None
        };

        Ok(ResultPage {
            records,
            continuation,
            consumed_capacity: examined.len().max(1) as f64 * CAPACITY_PER_ROW,
        })
    }
}

impl QueryStore for MemoryStore {
    fn query(&self, request: QueryRequest) -> impl Future<Output = StoreResult<ResultPage>> + Send {
        std::future::ready(self.query_page(&request))
    }
}

fn key_matches(spec: &QuerySpec, record: &RawRecord, min_lon: f64, max_lon: f64) -> bool {
    let in_partition = record
        .get(spec.index.partition_attribute())
        .and_then(AttributeValue::as_f64)
        .map_or(false, |band| band == spec.partition_key as f64);

    let in_range = record
        .get(LONGITUDE_ATTRIBUTE)
        .and_then(AttributeValue::as_f64)
        .map_or(false, |lon| lon >= min_lon && lon <= max_lon);

    in_partition && in_range
}

fn filter_matches(spec: &QuerySpec, record: &RawRecord) -> StoreResult<bool> {
    for clause in &spec.clauses {
        if !clause_matches(spec, clause, record)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn clause_matches(spec: &QuerySpec, clause: &FilterClause, record: &RawRecord) -> StoreResult<bool> {
    // Missing attributes never match
    let actual = match record.get(clause.attribute()) {
        Some(v) => v,
        None => return Ok(false),
    };

    Ok(match clause {
        FilterClause::AtLeast { placeholder, .. } => {
            compare(actual, bound(spec, placeholder)?).map_or(false, |o| o != Ordering::Less)
        }
        FilterClause::AtMost { placeholder, .. } => {
            compare(actual, bound(spec, placeholder)?).map_or(false, |o| o != Ordering::Greater)
        }
        FilterClause::Equals { placeholder, .. } => {
            compare(actual, bound(spec, placeholder)?) == Some(Ordering::Equal)
        }
        FilterClause::In { placeholders, .. } => {
            let mut found = false;
            for placeholder in placeholders {
                if compare(actual, bound(spec, placeholder)?) == Some(Ordering::Equal) {
                    found = true;
                    break;
                }
            }
            found
        }
    })
}

fn bound<'a>(spec: &'a QuerySpec, placeholder: &str) -> StoreResult<&'a AttributeValue> {
    spec.value(placeholder)
        .ok_or_else(|| StoreError::rejected(format!("placeholder {} has no bound value", placeholder)))
}

/// Compare values of the same type; mismatched types are incomparable
fn compare(actual: &AttributeValue, expected: &AttributeValue) -> Option<Ordering> {
    match (actual, expected) {
        (AttributeValue::N(_), AttributeValue::N(_)) => actual.as_f64()?.partial_cmp(&expected.as_f64()?),
        (AttributeValue::S(a), AttributeValue::S(b)) => Some(a.cmp(b)),
        (AttributeValue::Bool(a), AttributeValue::Bool(b)) if a == b => Some(Ordering::Equal),
        _ => None,
    }
}
