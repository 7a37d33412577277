//! Nodes of a transformation chain

use mapchain_codec::{RawSourceMap, SOURCE_MAP_VERSION, SegmentTable};
use std::path::PathBuf;

use crate::error::MapError;

/// Index of a node in its [`crate::Chain`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// One artifact of the chain: some text, and how it maps to its sources.
///
/// A node without a map is a terminus (an original source).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Absolute path, or None for inline/anonymous text
    pub file: Option<PathBuf>,
    /// The text itself, when known
    pub content: Option<String>,
    /// Mapping to upstream nodes
    pub map: Option<NodeMap>,
}

impl Node {
    /// An original source
    pub fn original(file: Option<PathBuf>, content: Option<String>) -> Self {
        Node {
            file,
            content,
            map: None,
        }
    }

    /// Generated text with a map to its upstream nodes
    pub fn mapped(file: Option<PathBuf>, content: Option<String>, map: NodeMap) -> Self {
        Node {
            file,
            content,
            map: Some(map),
        }
    }

    pub fn is_original(&self) -> bool {
        self.map.is_none()
    }

    /// Identity used when deduplicating origins
    pub(crate) fn source_id(&self, id: NodeId) -> SourceId {
        match &self.file {
            Some(path) => SourceId::Path(path.clone()),
            None => SourceId::Anonymous(id),
        }
    }
}

/// Identity of an origin in a dedup table
///
/// Files are identified by path; text without a path by the node holding it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceId {
    Path(PathBuf),
    Anonymous(NodeId),
}

/// A node's decoded map with its `sources` replaced by node references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeMap {
    table: SegmentTable,
    names: Vec<String>,
    upstream: Vec<NodeId>,
}

impl NodeMap {
    /// Build a map, checking every segment's source and name index
    ///
    /// `upstream[i]` is the node behind the map's `sources[i]`.
    pub fn new(
        table: SegmentTable,
        names: Vec<String>,
        upstream: Vec<NodeId>,
    ) -> Result<Self, MapError> {
        for (line, segment) in table.iter() {
            let Some(origin) = segment.source else {
                continue;
            };
            if origin.source as usize >= upstream.len() {
                return Err(MapError::SourceOutOfRange {
                    line,
                    index: origin.source,
                    count: upstream.len(),
                });
            }
            if let Some(name) = origin.name
                && name as usize >= names.len()
            {
                return Err(MapError::NameOutOfRange {
                    line,
                    index: name,
                    count: names.len(),
                });
            }
        }

        Ok(NodeMap {
            table,
            names,
            upstream,
        })
    }

    pub fn table(&self) -> &SegmentTable {
        &self.table
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn upstream(&self) -> &[NodeId] {
        &self.upstream
    }

    pub(crate) fn name(&self, index: Option<u32>) -> Option<&str> {
        index.map(|i| self.names[i as usize].as_str())
    }

    pub(crate) fn redirect(&mut self, slot: usize, to: NodeId) {
        self.upstream[slot] = to;
    }
}

/// Document-level checks done before a map's mappings are decoded
pub(crate) fn check_document(map: &RawSourceMap) -> Result<(), MapError> {
    if map.version != SOURCE_MAP_VERSION {
        return Err(MapError::UnsupportedVersion(map.version));
    }
    if let Some(contents) = &map.sources_content
        && contents.len() > map.sources.len()
    {
        return Err(MapError::ContentLength {
            contents: contents.len(),
            sources: map.sources.len(),
        });
    }
    Ok(())
}
