//! Configuration types for the record normalizer.
//!
//! [`IngestConfig`] controls the few knobs the normalizer exposes: control
//! character stripping, a size ceiling for metadata blobs, and whether a
//! payload with an unrecognized shape is an error or an empty record set.
//! Every field default reproduces the behaviour of the historical dashboard,
//! so `IngestConfig::default()` is what production uses.
//!
//! # Quick Start
//!
//! ```rust
//! use ingest::IngestConfig;
//!
//! let config = IngestConfig::default();
//! config.validate().expect("default config is valid");
//! ```
//!
//! # Stricter Configuration
//!
//! ```rust
//! use ingest::IngestConfig;
//!
//! let config = IngestConfig {
//!     max_metadata_bytes: Some(256 * 1024),
//!     strict_payload_shape: true,
//!     ..Default::default()
//! };
//!
//! assert!(config.validate().is_ok());
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Runtime configuration for record normalization.
///
/// Cheap to clone and serializable, so it can be embedded in a larger
/// configuration file (see the `catstats` umbrella crate).
///
/// ```json
/// {
///   "version": 1,
///   "strip_control_chars": true,
///   "max_metadata_bytes": 1048576,
///   "strict_payload_shape": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Version of the normalization rules.
    ///
    /// Default: `1`
    pub version: u32,

    /// Whether to strip control characters from filenames and uploader names.
    ///
    /// Replica rows occasionally carry stray NUL or newline bytes in
    /// `actor_name`; stripping them keeps grouping keys stable.
    ///
    /// Default: `true`
    pub strip_control_chars: bool,

    /// Largest metadata blob, in bytes, the normalizer will try to decode.
    ///
    /// Larger blobs are treated as absent metadata. Multi-page PDF and DjVu
    /// files can carry megabytes of text layer in `img_metadata`, none of
    /// which contributes GPS or camera information.
    ///
    /// Default: `None` (unlimited)
    pub max_metadata_bytes: Option<usize>,

    /// Reject payloads that carry neither a `data` nor a `rows` array.
    ///
    /// When `false` such payloads are logged and treated as an empty record
    /// set, which yields an all-zero summary.
    ///
    /// Default: `false`
    pub strict_payload_shape: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            version: 1,
            strip_control_chars: true,
            max_metadata_bytes: None,
            strict_payload_shape: false,
        }
    }
}

/// Errors that can occur when validating an [`IngestConfig`].
///
/// These are start-up problems; surface them before serving requests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// `version` was set to zero.
    #[error("ingest config version must be >= 1")]
    ZeroVersion,

    /// `max_metadata_bytes` was set to zero, which would discard every blob.
    #[error("max_metadata_bytes must be greater than zero when set")]
    ZeroMetadataLimit,
}

impl IngestConfig {
    /// Validates internal consistency of this configuration.
    ///
    /// ```rust
    /// use ingest::{ConfigError, IngestConfig};
    ///
    /// let bad = IngestConfig {
    ///     max_metadata_bytes: Some(0),
    ///     ..Default::default()
    /// };
    /// assert_eq!(bad.validate(), Err(ConfigError::ZeroMetadataLimit));
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 {
            return Err(ConfigError::ZeroVersion);
        }
        if self.max_metadata_bytes == Some(0) {
            return Err(ConfigError::ZeroMetadataLimit);
        }
        Ok(())
    }
}
