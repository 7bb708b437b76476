//! Configuration for statistics aggregation.
//!
//! The defaults reproduce the public dashboard: top 10 cameras, 300 px map
//! thumbnails, links into commons.wikimedia.org.
//!
//! ```rust
//! use stats::AggregateConfig;
//!
//! let config = AggregateConfig {
//!     top_n: 5,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tuning knobs for [`aggregate_with_config`](crate::aggregate_with_config).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Version of the aggregation rules.
    pub version: u32,

    /// Length of capped views: `byCamera` and
    /// [`CategorySummary::top_uploaders`](crate::CategorySummary::top_uploaders).
    ///
    /// Default: `10`
    pub top_n: usize,

    /// Width in pixels requested for geo point thumbnails.
    ///
    /// Default: `300`
    pub thumbnail_width: u32,

    /// Wiki that file links point into, without a trailing slash.
    ///
    /// Default: `"https://commons.wikimedia.org"`
    pub commons_base_url: String,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            version: 1,
            top_n: 10,
            thumbnail_width: 300,
            commons_base_url: "https://commons.wikimedia.org".to_string(),
        }
    }
}

/// Errors returned by [`AggregateConfig::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("aggregate config version must be >= 1")]
    ZeroVersion,

    #[error("top_n must be greater than zero")]
    ZeroTopN,

    #[error("thumbnail_width must be greater than zero")]
    ZeroThumbnailWidth,

    #[error("commons_base_url must be an http(s) URL, got '{0}'")]
    InvalidBaseUrl(String),
}

impl AggregateConfig {
    /// Validates internal consistency of this configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 {
            return Err(ConfigError::ZeroVersion);
        }
        if self.top_n == 0 {
            return Err(ConfigError::ZeroTopN);
        }
        if self.thumbnail_width == 0 {
            return Err(ConfigError::ZeroThumbnailWidth);
        }
        let url = self.commons_base_url.trim();
        let has_host = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .is_some_and(|rest| !rest.trim_end_matches('/').is_empty());
        if !has_host {
            return Err(ConfigError::InvalidBaseUrl(self.commons_base_url.clone()));
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed.
    pub(crate) fn base_url(&self) -> &str {
        self.commons_base_url.trim().trim_end_matches('/')
    }
}
