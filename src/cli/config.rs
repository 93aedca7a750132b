//! Configuration file
//!
//! A JSON file; every field is optional. Relative paths are resolved against
//! the directory holding the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::executor::{FailurePolicy, RetrySettings};
use crate::geo::default_dataset_path;
use crate::http_server::HttpServerConfig;
use crate::planner::DEFAULT_TABLE;
use crate::store::DEFAULT_PAGE_SIZE;

use super::errors::{CliError, CliResult};

/// Store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Table name used in queries (default: "rets-search")
    #[serde(default = "default_table")]
    pub table: String,

    /// JSON array of listings loaded into the in-memory store
    #[serde(default)]
    pub listings_path: Option<PathBuf>,

    /// Rows examined per page (default: 100)
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_query_timeout_ms() -> u64 {
    10_000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            listings_path: None,
            page_size: default_page_size(),
        }
    }
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpServerConfig,

    /// GeoJSON postal code dataset (default: ZIP_CODES.geojson next to the binary)
    #[serde(default)]
    pub geo_dataset_path: Option<PathBuf>,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub retry: RetrySettings,

    /// Return what succeeded when some partitions fail (default: false)
    #[serde(default)]
    pub allow_partial_results: bool,

    /// Deadline for one search (default: 10000)
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpServerConfig::default(),
            geo_dataset_path: None,
            store: StoreConfig::default(),
            retry: RetrySettings::default(),
            allow_partial_results: false,
            query_timeout_ms: default_query_timeout_ms(),
            base_dir: PathBuf::new(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config = Self::from_json_str(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    /// Parse and validate configuration JSON
    pub fn from_json_str(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        self.http.validate().map_err(CliError::config_error)?;

        if self.store.table.trim().is_empty() {
            return Err(CliError::config_error("store.table must not be empty"));
        }

        if self.store.page_size == 0 {
            return Err(CliError::config_error("store.page_size must be > 0"));
        }

        if self.retry.max_attempts == 0 {
            return Err(CliError::config_error("retry.max_attempts must be > 0"));
        }

        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(CliError::config_error(
                "retry.base_delay_ms must not exceed retry.max_delay_ms",
            ));
        }

        if self.query_timeout_ms == 0 {
            return Err(CliError::config_error("query_timeout_ms must be > 0"));
        }

        Ok(())
    }

    /// Resolved path of the geo dataset
    pub fn geo_dataset_path(&self) -> PathBuf {
        match &self.geo_dataset_path {
            Some(path) => self.resolve(path),
            None => default_dataset_path(),
        }
    }

    /// Resolved path of the listings file, if configured
    pub fn listings_path(&self) -> Option<PathBuf> {
        self.store.listings_path.as_ref().map(|p| self.resolve(p))
    }

    /// Failure policy for the executor
    pub fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::from_allow_partial(self.allow_partial_results)
    }

    /// Deadline for one search
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}
