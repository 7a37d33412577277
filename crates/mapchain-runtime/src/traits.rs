/*
 * traits.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Defines the ChainHost trait and supporting types for the host abstraction.
 *
 * A host gives the chain loader everything it cannot do by itself:
 * - read the text of a file named by a chain link or a map's `sources`
 * - discover the source map that belongs to a piece of generated text
 * - anchor relative paths (current working directory)
 */

use async_trait::async_trait;
use mapchain_codec::{CodecError, RawSourceMap};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::discovery;

/// Result type for host operations
pub type HostResult<T> = Result<T, HostError>;

/// Errors that can occur during host operations
#[derive(Debug, Error)]
pub enum HostError {
    /// Reading a file failed for a reason other than it being absent
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A discovered map could not be parsed
    #[error("invalid source map at {location}: {source}")]
    InvalidMap {
        location: String,
        #[source]
        source: CodecError,
    },

    /// The host cannot determine a working directory
    #[error("no working directory available: {0}")]
    NoWorkingDirectory(String),
}

/// Collaborator hooks consumed by the chain loader.
///
/// Only the synchronous methods are required. `read_file_async` defaults to
/// `read_file`, so a purely synchronous host works with both the blocking
/// and the async entry points; hosts backed by a VFS or `fetch()` override
/// `read_file_async` instead. The default `get_map_async` runs discovery on
/// top of `read_file_async`, so a host that replaces `get_map` should
/// replace `get_map_async` as well.
///
/// Missing data is `Ok(None)`, never an error: an unreadable file is simply
/// a source without content, and text without a map is an original source.
#[async_trait]
pub trait ChainHost: Send + Sync {
    /// Read a whole file as UTF-8 text.
    fn read_file(&self, path: &Path) -> HostResult<Option<String>>;

    /// Discover the map that belongs to `content` (the text of `file`).
    ///
    /// Default implementation follows the last `sourceMappingURL` directive
    /// in the content: inline `data:` URLs are decoded, anything else is
    /// read through [`ChainHost::read_file`] relative to `file`.
    fn get_map(
        &self,
        file: Option<&Path>,
        content: Option<&str>,
    ) -> HostResult<Option<RawSourceMap>> {
        discovery::discover_map(self, file, content)
    }

    /// Directory that relative chain paths are resolved against.
    fn cwd(&self) -> HostResult<PathBuf>;

    async fn read_file_async(&self, path: &Path) -> HostResult<Option<String>> {
        self.read_file(path)
    }

    async fn get_map_async(
        &self,
        file: Option<&Path>,
        content: Option<&str>,
    ) -> HostResult<Option<RawSourceMap>> {
        discovery::discover_map_async(self, file, content).await
    }
}

/// A host with no files and no maps.
///
/// Useful when every chain link carries its content and map inline.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

#[async_trait]
impl ChainHost for NoopHost {
    fn read_file(&self, _path: &Path) -> HostResult<Option<String>> {
        Ok(None)
    }

    fn get_map(
        &self,
        _file: Option<&Path>,
        _content: Option<&str>,
    ) -> HostResult<Option<RawSourceMap>> {
        Ok(None)
    }

    fn cwd(&self) -> HostResult<PathBuf> {
        Ok(PathBuf::from("/"))
    }

    async fn get_map_async(
        &self,
        _file: Option<&Path>,
        _content: Option<&str>,
    ) -> HostResult<Option<RawSourceMap>> {
        Ok(None)
    }
}
