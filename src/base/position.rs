//! Position tracking for grammar nodes
//!
//! Stores the source location (line/column) of tokens and AST nodes for
//! diagnostics. Both coordinates are 1-indexed, the way they are printed.
use std::fmt;

use text_size::TextSize;

/// A range in the grammar source, from the first character of a node to
/// the character just past its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// A position in the grammar source (1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a range from line/column coordinates
    pub fn from_coords(
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Self {
        Self {
            start: Position::new(start_line, start_col),
            end: Position::new(end_line, end_col),
        }
    }

    /// The smallest range covering both `self` and `other`
    pub fn cover(self, other: Range) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}C{}", self.line, self.column)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Maps byte offsets of a source text to line/column positions.
///
/// Columns count characters, not bytes.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    /// Byte offset of the first character of every line
    line_starts: Vec<TextSize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::new(offset as u32 + 1));
            }
        }
        Self { text, line_starts }
    }

    pub fn position(&self, offset: TextSize) -> Position {
        let line = self
            .line_starts
            .partition_point(|start| *start <= offset)
            .saturating_sub(1);
        let line_start = usize::from(self.line_starts[line]);
        let end = usize::from(offset).min(self.text.len());
        let column = self
            .text
            .get(line_start..end)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(end - line_start);
        Position::new(line + 1, column + 1)
    }

    pub fn range(&self, start: TextSize, end: TextSize) -> Range {
        Range::new(self.position(start), self.position(end))
    }
}
