//! Query planning subsystem
//!
//! Turns a normalized filter request into partition-scoped store queries.
//!
//! # Pipeline
//!
//! 1. Resolve the spatial window from the request
//! 2. Enumerate the latitude partitions the window spans
//! 3. Build one [`QuerySpec`] per partition
//!
//! Planning is pure and deterministic: the same request always yields the
//! same queries, clauses in field-name order.

mod errors;
mod filters;
mod partition;
mod predicate;

pub use errors::{PlannerError, PlannerErrorCode, PlannerResult};
pub use filters::{
    is_reserved_field, FilterRequest, FilterValue, SpatialWindow, AVAILABLE_ONLY, MAX_LATITUDE,
    MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE, WINDOW_FIELDS,
};
pub use partition::{partition_key, partition_keys, PartitionKey, BANDS_PER_DEGREE};
pub use predicate::{
    FilterClause, QueryBuilder, QuerySpec, TargetIndex, DEFAULT_TABLE, LONGITUDE_ATTRIBUTE,
};
