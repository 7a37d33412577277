//! Core types for decoded mappings

use serde::{Deserialize, Serialize};

/// The origin half of a segment (0-indexed line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    /// Index into the owning map's `sources`
    pub source: u32,
    /// Original line (0-indexed)
    pub line: u32,
    /// Original column (0-indexed)
    pub column: u32,
    /// Index into the owning map's `names`
    pub name: Option<u32>,
}

/// One mapped range of a generated line
///
/// A segment without a [`SourceRef`] marks generated code with no known origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    /// Generated column (0-indexed)
    pub generated_column: u32,
    /// Where the range came from, if known
    pub source: Option<SourceRef>,
}

impl Segment {
    /// A segment that maps nowhere
    pub fn unmapped(generated_column: u32) -> Self {
        Segment {
            generated_column,
            source: None,
        }
    }

    /// A segment pointing at `(source, line, column)`
    pub fn mapped(generated_column: u32, source: u32, line: u32, column: u32) -> Self {
        Segment {
            generated_column,
            source: Some(SourceRef {
                source,
                line,
                column,
                name: None,
            }),
        }
    }

    /// Attach a name index; no-op on unmapped segments
    pub fn with_name(mut self, name: u32) -> Self {
        if let Some(source) = self.source.as_mut() {
            source.name = Some(name);
        }
        self
    }

    pub fn is_mapped(&self) -> bool {
        self.source.is_some()
    }
}

/// Decoded mappings: one segment list per generated line
///
/// Segments within a line are kept sorted by `generated_column`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentTable {
    lines: Vec<Vec<Segment>>,
}

impl SegmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from raw lines, sorting each line by generated column
    pub fn from_lines(mut lines: Vec<Vec<Segment>>) -> Self {
        for line in &mut lines {
            if !line.is_sorted_by_key(|s| s.generated_column) {
                line.sort_by_key(|s| s.generated_column);
            }
        }
        SegmentTable { lines }
    }

    /// Segments of a generated line, if the line exists
    pub fn line(&self, index: u32) -> Option<&[Segment]> {
        self.lines.get(index as usize).map(Vec::as_slice)
    }

    pub fn lines(&self) -> &[Vec<Segment>] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total number of segments across all lines
    pub fn segment_count(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }

    /// Iterate `(line, segment)` pairs in generated order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Segment)> {
        self.lines
            .iter()
            .enumerate()
            .flat_map(|(row, line)| line.iter().map(move |seg| (row as u32, seg)))
    }

    /// Rightmost segment on `line` whose generated column is `<= column`
    ///
    /// Returns None when the line is missing or the column precedes its
    /// first segment.
    pub fn segment_at(&self, line: u32, column: u32) -> Option<&Segment> {
        let segments = self.line(line)?;
        let idx = segments.partition_point(|s| s.generated_column <= column);
        idx.checked_sub(1).map(|i| &segments[i])
    }

    pub fn into_lines(self) -> Vec<Vec<Segment>> {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmapped_segment_ignores_name() {
        let seg = Segment::unmapped(4).with_name(2);
        assert_eq!(seg.generated_column, 4);
        assert!(!seg.is_mapped());
    }

    #[test]
    fn test_mapped_segment_with_name() {
        let seg = Segment::mapped(0, 1, 2, 3).with_name(7);
        let source = seg.source.unwrap();
        assert_eq!(source.source, 1);
        assert_eq!(source.line, 2);
        assert_eq!(source.column, 3);
        assert_eq!(source.name, Some(7));
    }

    #[test]
    fn test_from_lines_sorts_each_line() {
        let table = SegmentTable::from_lines(vec![vec![
            Segment::mapped(10, 0, 0, 5),
            Segment::mapped(2, 0, 0, 1),
        ]]);
        let line = table.line(0).unwrap();
        assert_eq!(line[0].generated_column, 2);
        assert_eq!(line[1].generated_column, 10);
    }

    #[test]
    fn test_segment_at() {
        let table = SegmentTable::from_lines(vec![
            vec![
                Segment::mapped(2, 0, 0, 0),
                Segment::mapped(6, 0, 0, 4),
                Segment::unmapped(9),
            ],
            vec![],
        ]);

        // Before the first segment
        assert!(table.segment_at(0, 1).is_none());
        // Exactly on a boundary
        assert_eq!(table.segment_at(0, 2).unwrap().generated_column, 2);
        // Between boundaries
        assert_eq!(table.segment_at(0, 8).unwrap().generated_column, 6);
        // Past the last segment
        assert_eq!(table.segment_at(0, 100).unwrap().generated_column, 9);
        // Empty and missing lines
        assert!(table.segment_at(1, 0).is_none());
        assert!(table.segment_at(5, 0).is_none());
    }

    #[test]
    fn test_iter_and_counts() {
        let table = SegmentTable::from_lines(vec![
            vec![Segment::mapped(0, 0, 0, 0)],
            vec![],
            vec![Segment::unmapped(0), Segment::mapped(3, 0, 1, 0)],
        ]);
        assert_eq!(table.line_count(), 3);
        assert_eq!(table.segment_count(), 3);

        let rows: Vec<u32> = table.iter().map(|(row, _)| row).collect();
        assert_eq!(rows, vec![0, 2, 2]);
    }
}
