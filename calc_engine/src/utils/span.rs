//! Source location tracking for expressions
//!
//! Positions count characters, not bytes, for the column; the byte offset is
//! kept alongside so spans can slice the original text.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based, one per character)
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

    /// Offset 0, line 1, column 1
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Advance position past one character
    pub fn advance(self, ch: char) -> Self {
        match ch {
            '\n' => Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            },
            _ => Self {
                offset: self.offset + ch.len_utf8(),
                line: self.line,
                column: self.column + 1,
            },
        }
    }

    pub fn advance_str(self, s: &str) -> Self {
        s.chars().fold(self, |pos, ch| pos.advance(ch))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start (inclusive) to end (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Span covering exactly one character starting at `pos`
    pub fn single(pos: Position, ch: char) -> Self {
        Self {
            start: pos,
            end: pos.advance(ch),
        }
    }

    /// Empty span at a position (used for end-of-input)
    pub fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Merge two spans into one covering both
    pub fn merge(self, other: Self) -> Self {
        let start = if self.start.offset <= other.start.offset {
            self.start
        } else {
            other.start
        };

        let end = if self.end.offset >= other.end.offset {
            self.end
        } else {
            other.end
        };

        Self { start, end }
    }

    /// Byte length of this span
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.offset >= self.start.offset && pos.offset < self.end.offset
    }

    /// Source text for this span; empty when the span does not fit `input`
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        input.get(self.start.offset..self.end.offset).unwrap_or("")
    }

    pub fn dummy() -> Self {
        Self::point(Position::start())
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A value with its source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    /// Map the value while preserving the span
    pub fn map<U, F>(self, f: F) -> Spanned<U>
    where
        F: FnOnce(T) -> U,
    {
        Spanned {
            value: f(self.value),
            span: self.span,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: fmt::Display> fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Line index over an expression, used to render caret diagnostics
#[derive(Debug, Clone)]
pub struct SourceMap {
    pub source: String,
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut line_starts = vec![0];
        for (offset, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            source,
            line_starts,
        }
    }

    /// Line and column for a byte offset
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };

        let line_start = self.line_starts[line];
        let column = self
            .source
            .get(line_start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(0);

        Position::new(offset, (line + 1) as u32, (column + 1) as u32)
    }

    /// A line of text by line number (1-based)
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        if line_num == 0 {
            return None;
        }

        let line_idx = (line_num - 1) as usize;
        let start = *self.line_starts.get(line_idx)?;
        let end = self
            .line_starts
            .get(line_idx + 1)
            .map(|next| next - 1)
            .unwrap_or(self.source.len());

        self.source.get(start..end).map(|l| l.trim_end_matches('\r'))
    }

    pub fn span_text(&self, span: &Span) -> &str {
        span.slice(&self.source)
    }

    /// Format an error message with the offending line and a caret underline
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        let mut result = String::new();

        result.push_str(&format!("error: {}\n", message));
        result.push_str(&format!(
            "  --> {}:{}\n",
            span.start.line, span.start.column
        ));

        if let Some(line) = self.get_line(span.start.line) {
            let line_num_str = span.start.line.to_string();
            let padding = " ".repeat(line_num_str.len());

            result.push_str(&format!("{} |\n", padding));
            result.push_str(&format!("{} | {}\n", line_num_str, line));

            let caret_count = if span.start.line == span.end.line {
                span.end.column.saturating_sub(span.start.column) as usize
            } else {
                line.chars().count() + 1 - span.start.column as usize
            };

            result.push_str(&format!(
                "{} | {}{}\n",
                padding,
                " ".repeat(span.start.column.saturating_sub(1) as usize),
                "^".repeat(caret_count.max(1))
            ));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance_counts_characters() {
        let pos = Position::start().advance('2').advance('\u{00D7}');
        assert_eq!(pos.column, 3);
        assert_eq!(pos.offset, 1 + '\u{00D7}'.len_utf8());

        let wrapped = pos.advance('\n');
        assert_eq!(wrapped.line, 2);
        assert_eq!(wrapped.column, 1);
    }

    #[test]
    fn test_span_merge_and_slice() {
        let source = "12 + 3";
        let left = Span::new(Position::start(), Position::start().advance_str("12"));
        let right = Span::single(Position::start().advance_str("12 + "), '3');
        let merged = left.merge(right);

        assert_eq!(merged.slice(source), source);
        assert_eq!(merged.len(), source.len());
        assert!(Span::point(Position::start()).is_empty());
    }

    #[test]
    fn test_source_map_positions() {
        let map = SourceMap::new("1 +\n2");
        let pos = map.position_at(4);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 1);
        assert_eq!(map.get_line(1), Some("1 +"));
        assert_eq!(map.get_line(3), None);
    }

    #[test]
    fn test_format_error_underlines_span() {
        let map = SourceMap::new("4 / 0");
        let at = Position::start().advance_str("4 ");
        let rendered = map.format_error(&Span::single(at, '/'), "Division by zero");

        assert!(rendered.contains("error: Division by zero"));
        assert!(rendered.contains("--> 1:3"));
        assert!(rendered.contains("1 | 4 / 0"));
        assert!(rendered.contains(" |   ^\n"));
    }
}
