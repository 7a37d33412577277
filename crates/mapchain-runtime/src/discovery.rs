/*
 * discovery.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Locates the source map belonging to a piece of generated text by
 * following its `sourceMappingURL` directive.
 */

use mapchain_codec::RawSourceMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::paths;
use crate::traits::{ChainHost, HostError, HostResult};

static SOURCE_MAPPING_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)(?://|/\*)[#@][ \t]*sourceMappingURL=([^\s'"]+?)[ \t]*(?:\*/)?[ \t]*\r?$"#)
        .expect("sourceMappingURL pattern is valid")
});

/// The URL of the last `sourceMappingURL` directive in `content`
///
/// Both line (`//# ...`) and block (`/*# ... */`) forms are recognized, as
/// is the legacy `@` marker.
pub fn source_mapping_url(content: &str) -> Option<&str> {
    SOURCE_MAPPING_URL_RE
        .captures_iter(content)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Where a directive's URL points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapLocation {
    /// The map is embedded in the URL itself
    Inline(String),
    /// The map lives in a file
    File(PathBuf),
    /// A remote or otherwise unreadable location
    Unsupported(String),
}

/// Classify a directive URL, resolving file URLs against `file`'s directory
pub fn locate_map(url: &str, file: Option<&Path>, cwd: &Path) -> MapLocation {
    if url.starts_with("data:") {
        return MapLocation::Inline(url.to_string());
    }
    if let Some(rest) = url.strip_prefix("file://") {
        return MapLocation::File(paths::normalize(Path::new(rest)));
    }
    if url.contains("://") {
        return MapLocation::Unsupported(url.to_string());
    }

    let base = file.and_then(Path::parent).unwrap_or(cwd);
    MapLocation::File(paths::resolve(base, Path::new(url)))
}

/// Default [`ChainHost::get_map`] behaviour
pub fn discover_map<H: ChainHost + ?Sized>(
    host: &H,
    file: Option<&Path>,
    content: Option<&str>,
) -> HostResult<Option<RawSourceMap>> {
    match directive_location(host, file, content)? {
        Some(MapLocation::File(map_path)) => {
            let json = host.read_file(&map_path)?;
            parse_map_file(&map_path, json)
        }
        Some(MapLocation::Inline(url)) => parse_inline(&url, file),
        Some(MapLocation::Unsupported(url)) => {
            tracing::warn!(%url, "Ignoring sourceMappingURL that cannot be read locally");
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Default [`ChainHost::get_map_async`] behaviour: like [`discover_map`],
/// but map files are read through [`ChainHost::read_file_async`]
pub async fn discover_map_async<H: ChainHost + ?Sized>(
    host: &H,
    file: Option<&Path>,
    content: Option<&str>,
) -> HostResult<Option<RawSourceMap>> {
    match directive_location(host, file, content)? {
        Some(MapLocation::File(map_path)) => {
            let json = host.read_file_async(&map_path).await?;
            parse_map_file(&map_path, json)
        }
        Some(MapLocation::Inline(url)) => parse_inline(&url, file),
        Some(MapLocation::Unsupported(url)) => {
            tracing::warn!(%url, "Ignoring sourceMappingURL that cannot be read locally");
            Ok(None)
        }
        None => Ok(None),
    }
}

fn directive_location<H: ChainHost + ?Sized>(
    host: &H,
    file: Option<&Path>,
    content: Option<&str>,
) -> HostResult<Option<MapLocation>> {
    let Some(url) = content.and_then(source_mapping_url) else {
        return Ok(None);
    };
    let cwd = host.cwd()?;
    Ok(Some(locate_map(url, file, &cwd)))
}

fn parse_map_file(map_path: &Path, json: Option<String>) -> HostResult<Option<RawSourceMap>> {
    let Some(json) = json else {
        tracing::warn!(map = %map_path.display(), "sourceMappingURL points at a missing file");
        return Ok(None);
    };
    tracing::debug!(map = %map_path.display(), "Loaded source map file");
    RawSourceMap::from_json(&json)
        .map(Some)
        .map_err(|source| HostError::InvalidMap {
            location: map_path.display().to_string(),
            source,
        })
}

fn parse_inline(url: &str, file: Option<&Path>) -> HostResult<Option<RawSourceMap>> {
    RawSourceMap::from_data_url(url)
        .map(Some)
        .map_err(|source| HostError::InvalidMap {
            location: inline_location(file),
            source,
        })
}

fn inline_location(file: Option<&Path>) -> String {
    match file {
        Some(path) => format!("inline map of {}", path.display()),
        None => "inline map".to_string(),
    }
}
