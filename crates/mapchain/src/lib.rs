//! Source map chain resolution
//!
//! A build that runs several source-to-source steps (compile, bundle,
//! minify) leaves one source map per step, each pointing only at the step
//! before it. This crate follows such a chain back to the original sources
//! and produces a single composite map, or answers individual position
//! queries through a [`Portal`].
//!
//! The work happens in three separate stages:
//!
//! - **Loading** ([`load`]): [`ChainLink`] descriptions become a [`Chain`]
//!   of nodes. Missing content and maps are fetched through a
//!   [`mapchain_runtime::ChainHost`], which also discovers the ancestry of
//!   the last link from its `sourceMappingURL`.
//! - **Tracing** ([`Chain::trace`]): each node's segments are rewritten to
//!   point at original sources. Pure and memoized.
//! - **Assembly** ([`Chain::apply`]) or **queries** ([`Portal`]).
//!
//! [`resolve`] and [`open_portal`] run all stages. Each has an `_async`
//! twin for hosts that do real async I/O.
//!
//! # Example
//!
//! ```
//! use mapchain::{ChainLink, ResolveOptions, resolve};
//! use mapchain_runtime::MemoryHost;
//!
//! let host = MemoryHost::new()
//!     .with_file("out.js", "f();\n//# sourceMappingURL=out.js.map")
//!     .with_file(
//!         "out.js.map",
//!         r#"{"version":3,"sources":["in.js"],"names":[],"mappings":"AAAA"}"#,
//!     )
//!     .with_file("in.js", "f();");
//!
//! let options = ResolveOptions::new().with_generated_file("out.js");
//! let map = resolve([ChainLink::file("out.js")], &options, &host)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(map.sources, vec![Some("in.js".to_string())]);
//! assert_eq!(map.mappings, "AAAA");
//! ```

mod assemble;
pub mod chain;
pub mod error;
pub mod line_index;
pub mod link;
mod loader;
pub mod node;
pub mod options;
pub mod portal;
mod resolve;
pub mod trace;

pub use chain::Chain;
pub use error::{ChainError, MapError, Result};
pub use line_index::LineIndex;
pub use link::ChainLink;
pub use node::{Node, NodeId, NodeMap, SourceId};
pub use options::ResolveOptions;
pub use portal::{Portal, Position};
pub use resolve::{load, load_async, open_portal, open_portal_async, resolve, resolve_async};
pub use trace::Traced;
