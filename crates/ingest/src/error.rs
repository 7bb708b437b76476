//! Error types produced by the ingest crate.
//!
//! Record normalization itself never fails: every malformed field degrades to
//! a documented default. Errors exist only at the edges:
//!
//! | Error | Where | Description |
//! |-------|-------|-------------|
//! | [`IngestError::InvalidJson`] | payload | Payload text is not JSON at all |
//! | [`IngestError::UnrecognizedPayload`] | payload | No `data`/`rows` array and strict shape checking is on |
//! | [`MetadataError`] | metadata blob | Why a blob could not be decoded; swallowed by [`normalize`](crate::normalize) |
//!
//! # Examples
//!
//! ```rust
//! use ingest::{IngestConfig, IngestError, RawPayload};
//!
//! let err = RawPayload::from_json_str("not json", &IngestConfig::default()).unwrap_err();
//! assert!(matches!(err, IngestError::InvalidJson(_)));
//! ```
use thiserror::Error;

/// Errors that can occur while reading a raw payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestError {
    /// The payload text could not be parsed as JSON.
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),

    /// The payload carries neither a `data` array nor a `rows` array.
    ///
    /// Only returned when [`IngestConfig::strict_payload_shape`](crate::IngestConfig::strict_payload_shape)
    /// is enabled; otherwise the payload is treated as empty.
    #[error("unrecognized payload shape: {0}")]
    UnrecognizedPayload(String),
}

impl IngestError {
    /// Returns a suggested HTTP status code for this error.
    ///
    /// Both variants mean the upstream fetch layer handed over something the
    /// core cannot read, so they map to 502 Bad Gateway.
    ///
    /// ```rust
    /// use ingest::IngestError;
    ///
    /// assert_eq!(IngestError::InvalidJson("eof".into()).http_status_code(), 502);
    /// ```
    pub fn http_status_code(&self) -> u16 {
        502
    }
}

/// Reasons a metadata blob could not be decoded.
///
/// Offsets are byte offsets into the trimmed blob.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MetadataError {
    /// The legacy serialized blob ended in the middle of a value.
    #[error("legacy metadata truncated at byte {0}")]
    UnexpectedEnd(usize),

    /// A byte that cannot start or continue a legacy value.
    #[error("unexpected {found:?} at byte {pos} in legacy metadata")]
    UnexpectedByte {
        /// Offset of the offending byte.
        pos: usize,
        /// The offending byte, as a character.
        found: char,
    },

    /// A length, count, or number field that does not parse.
    #[error("invalid {what} at byte {pos} in legacy metadata")]
    Malformed {
        /// Which part of the grammar failed.
        what: &'static str,
        /// Offset where the field starts.
        pos: usize,
    },

    /// Arrays nested deeper than the decoder allows.
    #[error("legacy metadata nests deeper than {0} levels")]
    TooDeep(usize),

    /// A complete legacy value followed by unparsed bytes.
    #[error("trailing data after legacy metadata at byte {0}")]
    TrailingData(usize),

    /// Neither the legacy decoder nor the JSON parser accepted the blob.
    #[error("metadata is neither legacy-serialized nor JSON ({legacy}; {json})")]
    Undecodable {
        /// Legacy decoder failure.
        legacy: String,
        /// JSON parser failure.
        json: String,
    },

    /// The blob exceeds [`IngestConfig::max_metadata_bytes`](crate::IngestConfig::max_metadata_bytes).
    #[error("metadata blob of {size} bytes exceeds limit of {limit}")]
    TooLarge {
        /// Blob size in bytes.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// The blob decoded, but not to a key/value mapping.
    #[error("metadata decoded to {0}, expected a mapping")]
    NotAMapping(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        let err = MetadataError::UnexpectedByte { pos: 3, found: '{' };
        assert_eq!(err.to_string(), "unexpected '{' at byte 3 in legacy metadata");

        let err = MetadataError::TooLarge { size: 10, limit: 4 };
        assert!(err.to_string().contains("exceeds limit of 4"));
    }

    #[test]
    fn payload_errors_map_to_bad_gateway() {
        let err = IngestError::UnrecognizedPayload("no rows".into());
        assert_eq!(err.http_status_code(), 502);
        assert!(err.to_string().contains("no rows"));
    }
}
