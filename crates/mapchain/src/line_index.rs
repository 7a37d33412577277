//! Line lengths of a text, for bounds checks on traced positions

/// Per-line lengths of some content, in UTF-16 code units
///
/// Source map columns count UTF-16 code units, so that is the unit stored
/// here. Line terminators (`\n`, and a `\r` before it) are not counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    lengths: Vec<u32>,
}

impl LineIndex {
    /// Scan `content` once, recording the length of every line
    ///
    /// # Example
    ///
    /// ```
    /// use mapchain::LineIndex;
    ///
    /// let index = LineIndex::new("let a;\r\ncafé\n");
    /// assert_eq!(index.line_count(), 3);
    /// assert_eq!(index.line_length(0), Some(6));
    /// assert_eq!(index.line_length(1), Some(4));
    /// assert_eq!(index.line_length(2), Some(0));
    /// ```
    pub fn new(content: &str) -> Self {
        let lengths = content
            .split('\n')
            .map(|line| {
                let line = line.strip_suffix('\r').unwrap_or(line);
                line.encode_utf16().count() as u32
            })
            .collect();
        LineIndex { lengths }
    }

    /// Number of lines; an empty text has one empty line
    pub fn line_count(&self) -> usize {
        self.lengths.len()
    }

    /// Length of a line, or None if the text has no such line
    pub fn line_length(&self, row: u32) -> Option<u32> {
        self.lengths.get(row as usize).copied()
    }

    /// Whether `(row, column)` lies on a line and not past its end
    pub fn contains(&self, row: u32, column: u32) -> bool {
        self.line_length(row).is_some_and(|len| column <= len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content() {
        let index = LineIndex::new("");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_length(0), Some(0));
        assert!(index.contains(0, 0));
        assert!(!index.contains(0, 1));
    }

    #[test]
    fn test_multiple_lines() {
        let index = LineIndex::new("line 1\nline two\nx");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_length(1), Some(8));
        assert_eq!(index.line_length(3), None);
        assert!(index.contains(2, 1));
        assert!(!index.contains(3, 0));
    }

    #[test]
    fn test_utf16_units() {
        // U+1F600 is two UTF-16 code units and four UTF-8 bytes
        let index = LineIndex::new("a\u{1F600}b");
        assert_eq!(index.line_length(0), Some(4));
    }
}
