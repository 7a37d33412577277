//! Error types for the mapping codec

use thiserror::Error;

pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding mappings or map documents
#[derive(Debug, Error)]
pub enum CodecError {
    /// A character outside the base64 alphabet
    #[error("invalid base64 character {character:?} in mappings (line {line})")]
    InvalidCharacter { character: char, line: usize },

    /// A VLQ value ended on a continuation digit
    #[error("unterminated VLQ value in mappings (line {line})")]
    Truncated { line: usize },

    /// A segment with a field count other than 1, 4 or 5
    #[error("segment with {count} fields in mappings (line {line}); expected 1, 4 or 5")]
    FieldCount { count: usize, line: usize },

    /// A relative field accumulated to a negative absolute value
    #[error("negative index or position in mappings (line {line})")]
    NegativeValue { line: usize },

    /// A value that does not fit in 32 bits
    #[error("value out of range in mappings (line {line})")]
    Overflow { line: usize },

    /// A data: URL that is not a base64 JSON payload
    #[error("unsupported source map URL: {0}")]
    UnsupportedUrl(String),

    /// Base64 payload failed to decode
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Map document is not valid JSON
    #[error("invalid source map JSON: {0}")]
    Json(#[from] serde_json::Error),
}
