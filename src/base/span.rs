//! Byte-offset ranges and their conversion to line/column positions.

pub use text_size::{TextRange, TextSize};

use super::Position;

/// A 0-indexed line/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl From<LineCol> for Position {
    fn from(lc: LineCol) -> Self {
        Position::new(lc.line as usize, lc.col as usize)
    }
}

/// Maps byte offsets of one text to line/column pairs.
///
/// Columns count characters, not bytes, so a non-ASCII identifier moves the
/// column by one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    text: String,
    /// Byte offset of the first character of every line.
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (offset, c) in text.char_indices() {
            if c == '\n' {
                line_starts.push(TextSize::new((offset + 1) as u32));
            }
        }
        Self {
            text: text.to_string(),
            line_starts,
        }
    }

    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = usize::from(self.line_starts[line]);
        let end = usize::from(offset).min(self.text.len());
        let col = self
            .text
            .get(start..end)
            .map(|s| s.chars().count())
            .unwrap_or(end - start);
        LineCol {
            line: line as u32,
            col: col as u32,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_first_line() {
        let index = LineIndex::new("class A {}");
        assert_eq!(index.line_col(TextSize::new(6)), LineCol { line: 0, col: 6 });
    }

    #[test]
    fn test_line_col_after_newline() {
        let index = LineIndex::new("class A {\n  int x;\n}");
        assert_eq!(index.line_col(TextSize::new(10)), LineCol { line: 1, col: 0 });
        assert_eq!(index.line_col(TextSize::new(16)), LineCol { line: 1, col: 6 });
        assert_eq!(index.line_count(), 3);
    }

    #[test]
    fn test_line_col_counts_chars() {
        let index = LineIndex::new("é x");
        // 'é' is two bytes
        assert_eq!(index.line_col(TextSize::new(3)), LineCol { line: 0, col: 2 });
    }
}
