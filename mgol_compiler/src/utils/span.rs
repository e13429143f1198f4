//! Source locations
//!
//! Columns count bytes on the current line, which is what the scanner reads.

use serde::{Deserialize, Serialize};
use std::cmp::{max_by_key, min_by_key};
use std::fmt;
use std::iter;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset, 0-based
    pub offset: usize,
    /// 1-based
    pub line: u32,
    /// 1-based
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// First byte of the input
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Position of the byte that follows `byte`
    pub fn advance(self, byte: u8) -> Self {
        if byte == b'\n' {
            Self::new(self.offset + 1, self.line + 1, 1)
        } else {
            Self::new(self.offset + 1, self.line, self.column + 1)
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open byte range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start.offset <= end.offset, "span ends before it starts");
        Self { start, end }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    pub fn single(at: Position) -> Self {
        Self::new(at, Position::new(at.offset + 1, at.line, at.column + 1))
    }

    /// Zero-width; end of input and empty reductions use these
    pub fn empty(at: Position) -> Self {
        Self::new(at, at)
    }

    /// Smallest span covering both
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: min_by_key(self.start, other.start, |p| p.offset),
            end: max_by_key(self.end, other.end, |p| p.offset),
        }
    }
}

/// A value tagged with where it came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }
}

/// Source text indexed by line, for showing a diagnostic in place
#[derive(Debug, Clone)]
pub struct SourceMap {
    source: String,
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: String) -> Self {
        let line_starts = iter::once(0)
            .chain(source.match_indices('\n').map(|(at, _)| at + 1))
            .collect();
        Self {
            source,
            line_starts,
        }
    }

    /// 1-based line without its terminator
    pub fn get_line(&self, line: u32) -> Option<&str> {
        let index = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(index)?;
        let rest = self.source.get(start..)?;
        let text = rest.split('\n').next().unwrap_or_default();
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    /// Message and location, then the source line with a caret under `at`
    pub fn format_error(&self, at: Position, message: &str) -> String {
        let mut out = format!("error: {}\n  --> {}\n", message, at);

        if let Some(text) = self.get_line(at.line) {
            let number = at.line.to_string();
            let gutter = " ".repeat(number.len());
            let indent = " ".repeat(at.column.saturating_sub(1) as usize);
            out.push_str(&format!("{gutter} |\n{number} | {text}\n{gutter} | {indent}^\n"));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_counts_bytes_and_lines() {
        let pos = b"ab\ncd"
            .iter()
            .fold(Position::start(), |pos, &byte| pos.advance(byte));
        assert_eq!(pos, Position::new(5, 2, 3));
    }

    #[test]
    fn test_span_merge() {
        let a = Span::single(Position::new(2, 1, 3));
        let b = Span::single(Position::new(7, 1, 8));

        let merged = b.merge(a);
        assert_eq!(merged.start(), Position::new(2, 1, 3));
        assert_eq!(merged.end(), Position::new(8, 1, 9));
    }

    #[test]
    fn test_source_map_lines() {
        let map = SourceMap::new("inicio\r\n  fim\n".to_string());
        assert_eq!(map.get_line(1), Some("inicio"));
        assert_eq!(map.get_line(2), Some("  fim"));
        assert_eq!(map.get_line(3), Some(""));
        assert_eq!(map.get_line(0), None);
        assert_eq!(map.get_line(9), None);
    }

    #[test]
    fn test_format_error_places_caret() {
        let map = SourceMap::new("A<-B+C\n".to_string());
        let rendered = map.format_error(Position::new(4, 1, 5), "Operand types differ");

        assert!(rendered.contains("--> 1:5"));
        assert!(rendered.contains("1 | A<-B+C"));
        assert!(rendered.ends_with("  |     ^\n"));
    }
}
