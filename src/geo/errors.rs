//! Geo dataset error types
//!
//! Error codes:
//! - SEARCH_GEO_DATASET_IO (ERROR)
//! - SEARCH_GEO_DATASET_INVALID (ERROR)

use std::fmt;
use std::path::{Path, PathBuf};

/// Geo dataset error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    /// The dataset file could not be read
    SearchGeoDatasetIo,
    /// The dataset is not a GeoJSON feature collection
    SearchGeoDatasetInvalid,
}

impl GeoErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            GeoErrorCode::SearchGeoDatasetIo => "SEARCH_GEO_DATASET_IO",
            GeoErrorCode::SearchGeoDatasetInvalid => "SEARCH_GEO_DATASET_INVALID",
        }
    }
}

impl fmt::Display for GeoErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Geo dataset error
#[derive(Debug)]
pub struct GeoError {
    code: GeoErrorCode,
    message: String,
    path: Option<PathBuf>,
    source: Option<std::io::Error>,
}

impl GeoError {
    /// Create an I/O error for a dataset file
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        Self {
            code: GeoErrorCode::SearchGeoDatasetIo,
            message: format!("cannot read {}: {}", path.display(), err),
            path: Some(path.to_path_buf()),
            source: Some(err),
        }
    }

    /// Create an invalid dataset error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            code: GeoErrorCode::SearchGeoDatasetInvalid,
            message: reason.into(),
            path: None,
            source: None,
        }
    }

    /// Attach the dataset path
    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.to_path_buf());
        self
    }

    /// Returns the error code
    pub fn code(&self) -> GeoErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the dataset path if known
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for GeoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for geo operations
pub type GeoResult<T> = Result<T, GeoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_keeps_path_and_source() {
        let err = GeoError::io(
            Path::new("/missing/ZIP_CODES.geojson"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert_eq!(err.code(), GeoErrorCode::SearchGeoDatasetIo);
        assert_eq!(err.path(), Some(Path::new("/missing/ZIP_CODES.geojson")));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("[ERROR] SEARCH_GEO_DATASET_IO"));
    }
}
