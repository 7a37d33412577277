//! Error types for chain resolution

use mapchain_codec::CodecError;
use mapchain_runtime::HostError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChainError>;

/// Errors that can occur while loading or resolving a chain
#[derive(Debug, Error)]
pub enum ChainError {
    /// An option that must be a relative path was absolute
    #[error("`{option}` cannot be absolute: {path}")]
    Configuration { option: &'static str, path: String },

    /// A link other than the last one has no source map
    #[error("only the last link of a chain can have no source map (link {index} has none)")]
    ChainIntegrity { index: usize },

    /// No links were supplied
    #[error("cannot resolve an empty chain")]
    EmptyChain,

    /// A source map failed its shape checks
    #[error("invalid source map for {file}: {reason}")]
    InvalidMap {
        file: String,
        #[source]
        reason: MapError,
    },

    /// Hand-built node graph is not a valid chain
    #[error("invalid node graph: {0}")]
    InvalidGraph(String),

    /// Options document could not be parsed
    #[error("invalid options: {0}")]
    Options(#[from] serde_json::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Host hook failures are passed through unchanged
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Shape problems found in a single source map
#[derive(Debug, Error)]
pub enum MapError {
    #[error("unsupported version {0}")]
    UnsupportedVersion(u32),

    #[error("{contents} sourcesContent entries for {sources} sources")]
    ContentLength { contents: usize, sources: usize },

    #[error("line {line} references source {index} but only {count} exist")]
    SourceOutOfRange { line: u32, index: u32, count: usize },

    #[error("line {line} references name {index} but only {count} exist")]
    NameOutOfRange { line: u32, index: u32, count: usize },

    #[error(transparent)]
    Mappings(#[from] CodecError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let err = ChainError::Configuration {
            option: "generatedFile",
            path: "/abs/out.js".to_string(),
        };
        assert_eq!(err.to_string(), "`generatedFile` cannot be absolute: /abs/out.js");
    }

    #[test]
    fn test_invalid_map_display() {
        let err = ChainError::InvalidMap {
            file: "dist/a.js".to_string(),
            reason: MapError::SourceOutOfRange {
                line: 3,
                index: 2,
                count: 1,
            },
        };
        assert_eq!(
            err.to_string(),
            "invalid source map for dist/a.js: line 3 references source 2 but only 1 exist"
        );
    }
}
