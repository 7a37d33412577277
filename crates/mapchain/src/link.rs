//! Caller-facing description of one chain link

use mapchain_codec::RawSourceMap;
use std::path::PathBuf;

/// One link of a chain, outermost (most generated) first.
///
/// Only what the caller knows needs to be filled in: missing content is
/// read through the host, and a missing map is discovered through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainLink {
    /// Generated text and nothing else
    Text(String),
    /// Any combination of file, content and map
    Described {
        file: Option<PathBuf>,
        content: Option<String>,
        map: Option<RawSourceMap>,
    },
}

impl ChainLink {
    /// A link known only by its path
    pub fn file(path: impl Into<PathBuf>) -> Self {
        ChainLink::Described {
            file: Some(path.into()),
            content: None,
            map: None,
        }
    }

    /// A link known only by its text
    pub fn content(content: impl Into<String>) -> Self {
        ChainLink::Text(content.into())
    }

    pub fn with_file(self, path: impl Into<PathBuf>) -> Self {
        let (_, content, map) = self.into_parts();
        ChainLink::Described {
            file: Some(path.into()),
            content,
            map,
        }
    }

    pub fn with_content(self, content: impl Into<String>) -> Self {
        let (file, _, map) = self.into_parts();
        ChainLink::Described {
            file,
            content: Some(content.into()),
            map,
        }
    }

    pub fn with_map(self, map: RawSourceMap) -> Self {
        let (file, content, _) = self.into_parts();
        ChainLink::Described {
            file,
            content,
            map: Some(map),
        }
    }

    pub(crate) fn into_parts(self) -> (Option<PathBuf>, Option<String>, Option<RawSourceMap>) {
        match self {
            ChainLink::Text(content) => (None, Some(content), None),
            ChainLink::Described { file, content, map } => (file, content, map),
        }
    }
}

impl From<String> for ChainLink {
    fn from(content: String) -> Self {
        ChainLink::Text(content)
    }
}

impl From<&str> for ChainLink {
    fn from(content: &str) -> Self {
        ChainLink::Text(content.to_string())
    }
}
