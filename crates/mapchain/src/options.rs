//! Options controlling how a composite map is assembled

use mapchain_runtime::{ChainHost, paths};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{ChainError, Result};

/// Options for [`crate::resolve`] and friends.
///
/// Field names deserialize in camelCase (`generatedFile`, `sourceRoot`,
/// `includeContent`, `baseDir`), so the options can come straight from a
/// JSON build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ResolveOptions {
    /// `file` of the composite map; must be relative
    pub generated_file: Option<String>,
    /// `sourceRoot` of the composite map; must be relative
    pub source_root: Option<String>,
    /// Embed `sourcesContent` (default `true`)
    pub include_content: bool,
    /// Directory relative chain paths are resolved against; defaults to the
    /// host's working directory
    pub base_dir: Option<PathBuf>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            generated_file: None,
            source_root: None,
            include_content: true,
            base_dir: None,
        }
    }
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON object
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_generated_file(mut self, file: impl Into<String>) -> Self {
        self.generated_file = Some(file.into());
        self
    }

    pub fn with_source_root(mut self, root: impl Into<String>) -> Self {
        self.source_root = Some(root.into());
        self
    }

    pub fn with_include_content(mut self, include: bool) -> Self {
        self.include_content = include;
        self
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Reject absolute `generated_file` and `source_root`.
    ///
    /// Called by every entry point before any loading or tracing.
    pub fn validate(&self) -> Result<()> {
        if let Some(file) = self.generated_file.as_deref()
            && paths::is_absolute(file)
        {
            return Err(ChainError::Configuration {
                option: "generatedFile",
                path: file.to_string(),
            });
        }
        if let Some(root) = self.source_root.as_deref()
            && paths::is_absolute(root)
        {
            return Err(ChainError::Configuration {
                option: "sourceRoot",
                path: root.to_string(),
            });
        }
        Ok(())
    }

    /// The absolute directory chain paths are anchored at
    pub(crate) fn resolve_base_dir(&self, host: &dyn ChainHost) -> Result<PathBuf> {
        let cwd = host.cwd()?;
        Ok(match &self.base_dir {
            Some(dir) => paths::resolve(&cwd, dir),
            None => paths::normalize(&cwd),
        })
    }

    /// `source_root` with forward slashes, or empty
    pub(crate) fn source_root_slashed(&self) -> String {
        self.source_root.as_deref().map(paths::slash).unwrap_or_default()
    }

    pub(crate) fn generated_file_slashed(&self) -> String {
        self.generated_file
            .as_deref()
            .map(paths::slash)
            .unwrap_or_default()
    }
}

/// Directory that `sources` are made relative to
pub(crate) fn source_root_dir(base_dir: &Path, source_root: &str) -> PathBuf {
    paths::resolve(base_dir, Path::new(source_root))
}
