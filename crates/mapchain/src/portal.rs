//! Point queries against a traced chain

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::chain::Chain;

/// An original position found by [`Portal::resolve_position`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    /// The original file; None when the position is in text with no path
    /// (an inline source, or the generated text itself)
    pub source: Option<PathBuf>,
    /// 0-indexed line
    pub line: u32,
    /// 0-indexed column, in UTF-16 code units
    pub column: u32,
    pub name: Option<String>,
}

impl fmt::Display for Position {
    /// `file:line:column` with 1-indexed line and column, as stack traces
    /// show them
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(path) => write!(f, "{}", path.display())?,
            None => f.write_str("<generated>")?,
        }
        write!(f, ":{}:{}", self.line + 1, self.column + 1)
    }
}

/// Answers `(line, column)` queries on a chain's root without assembling a
/// composite map.
///
/// The root is traced when the portal is built; each query is then a binary
/// search on one line of the traced table.
///
/// A query between two segment boundaries is answered by offsetting from
/// the segment start on the same original line. That is exact for a single
/// token copied verbatim and a best-effort guess otherwise. When the
/// origin's text is known, a guess that lands past the end of the line is
/// rejected.
#[derive(Debug)]
pub struct Portal {
    chain: Chain,
}

impl Portal {
    pub fn new(chain: Chain) -> Self {
        let traced = chain.trace(chain.root()).is_some();
        tracing::debug!(nodes = chain.len(), traced, "Opened portal");
        Portal { chain }
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// The original position of a 0-indexed generated `(line, column)`
    pub fn resolve_position(&self, line: u32, column: u32) -> Option<Position> {
        let root = self.chain.root();
        let Some(traced) = self.chain.trace(root) else {
            // An original root maps onto itself
            return self.chain.fits(root, line, column).then_some(Position {
                source: None,
                line,
                column,
                name: None,
            });
        };

        let found = traced.lookup(line, column)?;
        if !self.chain.fits(found.origin, found.line, found.column) {
            return None;
        }
        Some(Position {
            source: self.chain.node(found.origin).file.clone(),
            line: found.line,
            column: found.column,
            name: found.name.map(str::to_string),
        })
    }

    /// Turn the portal into a plain query function
    pub fn into_fn(self) -> impl Fn(u32, u32) -> Option<Position> {
        move |line, column| self.resolve_position(line, column)
    }
}
