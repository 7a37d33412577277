//! Tracing: rewriting a node's mappings so they point at original sources
//!
//! Every mapped node is traced at most once per [`Chain`]. Upstream nodes
//! are traced first, so by the time a node blends its segments, each
//! upstream already has a table that points straight at termini.

use indexmap::{IndexMap, IndexSet};
use mapchain_codec::{Segment, SegmentTable, SourceRef};

use crate::chain::Chain;
use crate::node::{NodeId, NodeMap, SourceId};

/// A node's mappings with every origin resolved to a terminus.
///
/// `sources` and `names` are dedup tables in first-seen order; the indices
/// in `table` refer to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traced {
    table: SegmentTable,
    sources: IndexMap<SourceId, NodeId>,
    names: IndexSet<String>,
}

/// An origin found by looking a position up in a traced table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Lookup<'a> {
    pub key: &'a SourceId,
    pub origin: NodeId,
    pub line: u32,
    pub column: u32,
    pub name: Option<&'a str>,
}

impl Traced {
    pub fn table(&self) -> &SegmentTable {
        &self.table
    }

    /// Terminus nodes referenced by the table, by source index
    pub fn origins(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.sources.values().copied()
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Resolve a generated position through the covering segment.
    ///
    /// The column is offset by the distance from the segment start. A name
    /// is only reported when the position is exactly at the segment start.
    pub(crate) fn lookup(&self, line: u32, column: u32) -> Option<Lookup<'_>> {
        let segment = self.table.segment_at(line, column)?;
        let origin = segment.source?;
        let offset = column - segment.generated_column;
        let (key, &node) = self.sources.get_index(origin.source as usize)?;
        let name = match (offset, origin.name) {
            (0, Some(index)) => self.names.get_index(index as usize).map(String::as_str),
            _ => None,
        };

        Some(Lookup {
            key,
            origin: node,
            line: origin.line,
            column: origin.column.checked_add(offset)?,
            name,
        })
    }
}

impl Chain {
    /// Trace a node, or return its memoized result.
    ///
    /// Returns None for a terminus: there is nothing to trace.
    pub fn trace(&self, id: NodeId) -> Option<&Traced> {
        self.traced_cell(id)
            .get_or_init(|| self.compute_trace(id))
            .as_ref()
    }

    fn compute_trace(&self, id: NodeId) -> Option<Traced> {
        let map = self.node(id).map.as_ref()?;

        let upstream: Vec<Option<&Traced>> =
            map.upstream().iter().map(|&up| self.trace(up)).collect();

        if upstream.iter().all(Option::is_none)
            && let Some(traced) = self.straight_copy(map)
        {
            tracing::trace!(node = id.0, "Upstream nodes are all original; copying mappings");
            return Some(traced);
        }

        Some(self.blend(id, map, &upstream))
    }

    /// The node's own tables, when they are already deduplicated
    fn straight_copy(&self, map: &NodeMap) -> Option<Traced> {
        let mut sources = IndexMap::with_capacity(map.upstream().len());
        for &up in map.upstream() {
            if sources.insert(self.key(up).clone(), up).is_some() {
                return None;
            }
        }

        let names: IndexSet<String> = map.names().iter().cloned().collect();
        if names.len() != map.names().len() {
            return None;
        }

        Some(Traced {
            table: map.table().clone(),
            sources,
            names,
        })
    }

    fn blend(&self, id: NodeId, map: &NodeMap, upstream: &[Option<&Traced>]) -> Traced {
        let mut sources: IndexMap<SourceId, NodeId> = IndexMap::new();
        let mut names: IndexSet<String> = IndexSet::new();
        let mut lines = Vec::with_capacity(map.table().line_count());
        let mut dropped = 0usize;

        for segments in map.table().lines() {
            let mut line = Vec::with_capacity(segments.len());
            for segment in segments {
                let Some(origin) = segment.source else {
                    line.push(*segment);
                    continue;
                };

                let slot = origin.source as usize;
                let own_name = map.name(origin.name);
                let hit = match upstream[slot] {
                    Some(traced) => traced.lookup(origin.line, origin.column).map(|found| Lookup {
                        name: found.name.or(own_name),
                        ..found
                    }),
                    None => {
                        let up = map.upstream()[slot];
                        Some(Lookup {
                            key: self.key(up),
                            origin: up,
                            line: origin.line,
                            column: origin.column,
                            name: own_name,
                        })
                    }
                };

                // An origin past the end of its known text is a gap too
                let Some(hit) = hit.filter(|hit| self.fits(hit.origin, hit.line, hit.column))
                else {
                    dropped += 1;
                    continue;
                };

                let source = match sources.get_index_of(hit.key) {
                    Some(index) => index,
                    None => sources.insert_full(hit.key.clone(), hit.origin).0,
                };
                let name = hit.name.map(|name| match names.get_index_of(name) {
                    Some(index) => index,
                    None => names.insert_full(name.to_string()).0,
                });

                line.push(Segment {
                    generated_column: segment.generated_column,
                    source: Some(SourceRef {
                        source: source as u32,
                        line: hit.line,
                        column: hit.column,
                        name: name.map(|n| n as u32),
                    }),
                });
            }
            lines.push(line);
        }

        if dropped > 0 {
            tracing::debug!(node = id.0, dropped, "Dropped segments with no upstream coverage");
        }
        tracing::trace!(
            node = id.0,
            sources = sources.len(),
            names = names.len(),
            "Blended mappings"
        );

        Traced {
            table: SegmentTable::from_lines(lines),
            sources,
            names,
        }
    }
}
