//! Listing store subsystem
//!
//! The paginated query protocol ([`QueryStore`]), the store's attribute
//! value model, and an in-memory implementation used by the CLI and tests.

mod attribute;
mod errors;
mod memory;
mod page;

pub use attribute::{
    deserialize_record, parse_number, raw_record_from_json, AttributeValue, RawRecord, Record,
};
pub use errors::{StoreError, StoreErrorCode, StoreResult};
pub use memory::{MemoryStore, CAPACITY_PER_ROW, DEFAULT_PAGE_SIZE};
pub use page::{ContinuationToken, QueryRequest, QueryStore, ResultPage};
