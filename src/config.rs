//! YAML configuration file support for catstats.
//!
//! A single file configures both stages. Every key is optional; omitted keys
//! take the same defaults as [`IngestConfig::default`] and
//! [`AggregateConfig::default`].
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # catstats configuration
//! version: "1.0"
//! name: "wiki-loves-monuments"
//!
//! ingest:
//!   version: 1
//!   strip_control_chars: true
//!   max_metadata_bytes: 1048576
//!   strict_payload_shape: false
//!
//! aggregate:
//!   version: 1
//!   top_n: 10
//!   thumbnail_width: 300
//!   commons_base_url: "https://commons.wikimedia.org"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AggregateConfig, IngestConfig};

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the catstats pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CatstatsConfig {
    /// Configuration format version
    #[serde(default = "default_format_version")]
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Record normalization settings
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Statistics aggregation settings
    #[serde(default)]
    pub aggregate: AggregateConfig,
}

impl CatstatsConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: CatstatsConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.ingest
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("ingest: {err}")))?;
        self.aggregate
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("aggregate: {err}")))?;
        Ok(())
    }

    /// Normalizer configuration described by the `ingest` section.
    pub fn to_ingest_config(&self) -> IngestConfig {
        self.ingest.clone()
    }

    /// Aggregator configuration described by the `aggregate` section.
    pub fn to_aggregate_config(&self) -> AggregateConfig {
        self.aggregate.clone()
    }
}

impl Default for CatstatsConfig {
    fn default() -> Self {
        Self {
            version: default_format_version(),
            name: None,
            ingest: IngestConfig::default(),
            aggregate: AggregateConfig::default(),
        }
    }
}

fn default_format_version() -> String {
    "1.0".to_string()
}
