//! Postal code boundary dataset
//!
//! Loaded once from a GeoJSON feature collection whose features carry the
//! postal code in `properties.ZIP`. Bounds are computed at load time; the
//! dataset is immutable afterwards.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::observability::{log_event_with_fields, Event};

use super::errors::{GeoError, GeoResult};

/// File name of the dataset shipped next to the executable
pub const DEFAULT_DATASET_FILE: &str = "ZIP_CODES.geojson";

const POSTAL_CODE_PROPERTY: &str = "ZIP";

/// Axis-aligned bounds of a postal code area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingRectangle {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl BoundingRectangle {
    /// Returned for unknown postal codes; matches nothing
    pub const ZERO: BoundingRectangle = BoundingRectangle {
        min_lon: 0.0,
        max_lon: 0.0,
        min_lat: 0.0,
        max_lat: 0.0,
    };

    /// Returns true for the all-zero rectangle
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Bounds of a set of `[lon, lat, ...]` positions, `None` when empty
    fn from_positions<'a>(positions: impl IntoIterator<Item = &'a Vec<f64>>) -> Option<Self> {
        let mut bounds: Option<Self> = None;
        for position in positions {
            let (lon, lat) = match position.as_slice() {
                [lon, lat, ..] => (*lon, *lat),
                _ => continue,
            };
            bounds = Some(match bounds {
                None => BoundingRectangle {
                    min_lon: lon,
                    max_lon: lon,
                    min_lat: lat,
                    max_lat: lat,
                },
                Some(b) => BoundingRectangle {
                    min_lon: b.min_lon.min(lon),
                    max_lon: b.max_lon.max(lon),
                    min_lat: b.min_lat.min(lat),
                    max_lat: b.max_lat.max(lat),
                },
            });
        }
        bounds
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

type Ring = Vec<Vec<f64>>;

impl Geometry {
    /// Outer rings: the first ring of every polygon
    fn outer_rings(&self) -> Vec<Ring> {
        match self.kind.as_str() {
            "Polygon" => serde_json::from_value::<Vec<Ring>>(self.coordinates.clone())
                .ok()
                .and_then(|rings| rings.into_iter().next())
                .into_iter()
                .collect(),
            "MultiPolygon" => serde_json::from_value::<Vec<Vec<Ring>>>(self.coordinates.clone())
                .map(|polygons| {
                    polygons
                        .into_iter()
                        .filter_map(|rings| rings.into_iter().next())
                        .collect()
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn bounds(&self) -> Option<BoundingRectangle> {
        let rings = self.outer_rings();
        BoundingRectangle::from_positions(rings.iter().flatten())
    }
}

/// Immutable postal code to bounds lookup
#[derive(Debug, Clone, Default)]
pub struct GeoDataset {
    rectangles: HashMap<String, BoundingRectangle>,
}

impl GeoDataset {
    /// Dataset with no entries; every lookup yields [`BoundingRectangle::ZERO`]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a GeoJSON feature collection.
    ///
    /// Features without a string `ZIP` property or usable polygon
    /// coordinates are ignored. The first feature for a code wins.
    pub fn from_geojson_str(content: &str) -> GeoResult<Self> {
        let collection: FeatureCollection = serde_json::from_str(content)
            .map_err(|e| GeoError::invalid(format!("not a GeoJSON feature collection: {}", e)))?;

        let mut rectangles = HashMap::new();
        for feature in collection.features {
            let code = match feature
                .properties
                .as_ref()
                .and_then(|p| p.get(POSTAL_CODE_PROPERTY))
                .and_then(Value::as_str)
            {
                Some(code) => code.to_string(),
                None => continue,
            };
            if rectangles.contains_key(&code) {
                continue;
            }
            if let Some(bounds) = feature.geometry.as_ref().and_then(Geometry::bounds) {
                rectangles.insert(code, bounds);
            }
        }

        Ok(Self { rectangles })
    }

    /// Load the dataset from a file
    pub fn load(path: &Path) -> GeoResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| GeoError::io(path, e))?;
        Self::from_geojson_str(&content).map_err(|e| e.with_path(path))
    }

    /// Load the dataset, falling back to an empty one on failure.
    ///
    /// With the fallback every lookup misses and searches by postal code
    /// return no listings; the failure is logged as `GEO_DATASET_FALLBACK`.
    pub fn load_or_empty(path: &Path) -> Self {
        let path_str = path.display().to_string();
        match Self::load(path) {
            Ok(dataset) => {
                log_event_with_fields(
                    Event::GeoDatasetLoaded,
                    &[
                        ("path", &path_str),
                        ("postal_codes", &dataset.len().to_string()),
                    ],
                );
                dataset
            }
            Err(e) => {
                log_event_with_fields(
                    Event::GeoDatasetFallback,
                    &[("path", &path_str), ("error", &e.to_string())],
                );
                Self::empty()
            }
        }
    }

    /// Bounds for an exact postal code, [`BoundingRectangle::ZERO`] if unknown
    pub fn bounding_rectangle(&self, postal_code: &str) -> BoundingRectangle {
        self.rectangles
            .get(postal_code)
            .copied()
            .unwrap_or(BoundingRectangle::ZERO)
    }

    /// Returns true if the postal code is known
    pub fn contains(&self, postal_code: &str) -> bool {
        self.rectangles.contains_key(postal_code)
    }

    /// Number of postal codes
    pub fn len(&self) -> usize {
        self.rectangles.len()
    }

    /// Returns true if the dataset has no entries
    pub fn is_empty(&self) -> bool {
        self.rectangles.is_empty()
    }
}

/// `ZIP_CODES.geojson` in the executable's directory
pub fn default_dataset_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_DATASET_FILE)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_FILE))
}
