//! Mapping codec for mapchain
//!
//! This crate owns the decoded representation of a source map's `mappings`
//! field and the wire formats around it:
//!
//! - [`SegmentTable`]: per-line, column-sorted [`Segment`]s
//! - [`decode`] / [`encode`]: base64 VLQ conversion of the `mappings` string
//! - [`RawSourceMap`]: the revision 3 JSON document, with `data:` URL helpers
//!
//! # Example
//!
//! ```rust
//! use mapchain_codec::*;
//!
//! let table = decode("AAAA,SAAS;AACA").unwrap();
//! assert_eq!(table.line_count(), 2);
//! assert_eq!(table.line(0).unwrap()[1], Segment::mapped(9, 0, 0, 9));
//! assert_eq!(encode(&table), "AAAA,SAAS;AACA");
//! ```

pub mod error;
pub mod map;
pub mod types;
pub mod vlq;

pub use error::{CodecError, CodecResult};
pub use map::{RawSourceMap, SOURCE_MAP_VERSION};
pub use types::{Segment, SegmentTable, SourceRef};
pub use vlq::{decode, encode};
