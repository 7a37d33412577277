/*
 * memory.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * MemoryHost: an in-memory file table, for tests and for callers that
 * already hold every file of the chain (bundler plugins, WASM builds).
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::paths;
use crate::traits::{ChainHost, HostResult};

/// Host serving files from a path-to-text table.
///
/// Relative keys are anchored at the host's working directory, which
/// defaults to `/`.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    cwd: PathBuf,
    files: HashMap<PathBuf, String>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::with_cwd("/")
    }

    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            files: HashMap::new(),
        }
    }

    /// Add or replace a file
    pub fn insert(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let key = paths::resolve(&self.cwd, path.as_ref());
        self.files.insert(key, content.into());
    }

    /// Builder form of [`MemoryHost::insert`]
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ChainHost for MemoryHost {
    fn read_file(&self, path: &Path) -> HostResult<Option<String>> {
        let key = paths::resolve(&self.cwd, path);
        Ok(self.files.get(&key).cloned())
    }

    fn cwd(&self) -> HostResult<PathBuf> {
        Ok(self.cwd.clone())
    }
}
