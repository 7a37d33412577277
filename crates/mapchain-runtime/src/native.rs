/*
 * native.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * NativeHost: reads chain files straight from the local filesystem.
 */

use std::io;
use std::path::{Path, PathBuf};

use crate::traits::{ChainHost, HostError, HostResult};

/// Host backed by `std::fs`.
///
/// Absent files read as `Ok(None)`; any other I/O failure is propagated.
#[derive(Debug, Clone, Default)]
pub struct NativeHost {
    cwd: Option<PathBuf>,
}

impl NativeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `cwd` instead of the process working directory
    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
        }
    }
}

impl ChainHost for NativeHost {
    fn read_file(&self, path: &Path) -> HostResult<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                tracing::trace!(path = %path.display(), bytes = content.len(), "Read file");
                Ok(Some(content))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(HostError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn cwd(&self) -> HostResult<PathBuf> {
        match &self.cwd {
            Some(cwd) => Ok(cwd.clone()),
            None => std::env::current_dir().map_err(|e| HostError::NoWorkingDirectory(e.to_string())),
        }
    }
}
