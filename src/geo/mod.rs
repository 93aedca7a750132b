//! Geo lookup subsystem
//!
//! Resolves a postal code to the bounding rectangle of its area using a
//! static GeoJSON dataset loaded once at startup. Unknown codes resolve to
//! [`BoundingRectangle::ZERO`], which callers treat as "no results".

mod dataset;
mod errors;
mod postal;

pub use dataset::{default_dataset_path, BoundingRectangle, GeoDataset, DEFAULT_DATASET_FILE};
pub use errors::{GeoError, GeoErrorCode, GeoResult};
pub use postal::{base_postal_code, is_valid_postal_code};
