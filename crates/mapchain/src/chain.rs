//! The node arena produced by loading a chain

use std::cell::OnceCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ChainError, Result};
use crate::line_index::LineIndex;
use crate::node::{Node, NodeId, SourceId};
use crate::trace::Traced;

/// File contents read during one load, keyed by absolute path.
///
/// `None` records a file the host could not supply, so it is not asked twice.
#[derive(Debug, Clone, Default)]
pub(crate) struct FileCache {
    contents: HashMap<PathBuf, Option<String>>,
}

impl FileCache {
    pub(crate) fn get(&self, path: &Path) -> Option<&Option<String>> {
        self.contents.get(path)
    }

    pub(crate) fn insert(&mut self, path: PathBuf, content: Option<String>) {
        self.contents.insert(path, content);
    }
}

/// A loaded chain: every node reachable from the root, plus per-node
/// tracing results computed on demand.
///
/// Tracing is memoized, so shared ancestors are walked once no matter how
/// many nodes reference them, and repeated calls return identical results.
#[derive(Debug)]
pub struct Chain {
    nodes: Vec<Node>,
    keys: Vec<SourceId>,
    root: NodeId,
    degenerate: bool,
    traced: Vec<OnceCell<Option<Traced>>>,
    line_indexes: Vec<OnceCell<Option<LineIndex>>>,
    pub(crate) files: FileCache,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visit {
    New,
    Active,
    Done,
}

/// Collect `(node, upstream slot)` pairs that close a cycle
pub(crate) fn find_back_edges(
    nodes: &[Node],
    id: NodeId,
    state: &mut [Visit],
    out: &mut Vec<(NodeId, usize)>,
) {
    state[id.0] = Visit::Active;
    if let Some(map) = &nodes[id.0].map {
        for (slot, &up) in map.upstream().iter().enumerate() {
            match state[up.0] {
                Visit::Active => out.push((id, slot)),
                Visit::New => find_back_edges(nodes, up, state, out),
                Visit::Done => {}
            }
        }
    }
    state[id.0] = Visit::Done;
}

impl Chain {
    pub(crate) fn new(nodes: Vec<Node>, root: NodeId, degenerate: bool, files: FileCache) -> Self {
        let keys = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| node.source_id(NodeId(i)))
            .collect();
        let traced = (0..nodes.len()).map(|_| OnceCell::new()).collect();
        let line_indexes = (0..nodes.len()).map(|_| OnceCell::new()).collect();
        Chain {
            nodes,
            keys,
            root,
            degenerate,
            traced,
            line_indexes,
            files,
        }
    }

    /// Build a chain from nodes constructed by hand, without any I/O.
    ///
    /// Upstream references must point inside `nodes` and the graph must be
    /// acyclic. The chain is degenerate only when the root is itself an
    /// original source.
    pub fn from_parts(nodes: Vec<Node>, root: NodeId) -> Result<Self> {
        if root.0 >= nodes.len() {
            return Err(ChainError::InvalidGraph(format!(
                "root {} is not one of {} nodes",
                root.0,
                nodes.len()
            )));
        }
        for (i, node) in nodes.iter().enumerate() {
            if let Some(map) = &node.map
                && let Some(bad) = map.upstream().iter().find(|up| up.0 >= nodes.len())
            {
                return Err(ChainError::InvalidGraph(format!(
                    "node {} references missing node {}",
                    i, bad.0
                )));
            }
        }

        // Every node can be traced on its own, so unreachable ones count too
        let mut state = vec![Visit::New; nodes.len()];
        let mut back_edges = Vec::new();
        for start in 0..nodes.len() {
            if state[start] == Visit::New {
                find_back_edges(&nodes, NodeId(start), &mut state, &mut back_edges);
            }
        }
        if let Some((from, _)) = back_edges.first() {
            return Err(ChainError::InvalidGraph(format!(
                "node {} is part of a cycle",
                from.0
            )));
        }

        let degenerate = nodes[root.0].is_original();
        Ok(Chain::new(nodes, root, degenerate, FileCache::default()))
    }

    /// The outermost (most generated) node
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether there is nothing to merge: the caller gave at most two links
    /// and the last one is an original source. Resolution then yields no
    /// new map and the input can be used unchanged.
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    pub(crate) fn key(&self, id: NodeId) -> &SourceId {
        &self.keys[id.0]
    }

    /// Whether a position exists in a node's text; true when the text is unknown
    pub(crate) fn fits(&self, id: NodeId, line: u32, column: u32) -> bool {
        let index = self.line_indexes[id.0]
            .get_or_init(|| self.node(id).content.as_deref().map(LineIndex::new));
        index.as_ref().is_none_or(|index| index.contains(line, column))
    }

    pub(crate) fn traced_cell(&self, id: NodeId) -> &OnceCell<Option<Traced>> {
        &self.traced[id.0]
    }
}
