use serde::{Deserialize, Serialize};
use std::fmt;

/// Source location of a token or expression node.
///
/// `offset` and `len` are byte positions into the expression source;
/// `line` and `col` are 1-based and locate the first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub offset: u32,
    pub len: u32,
    pub line: u32,
    #[serde(rename = "column")]
    pub col: u32,
}

impl Span {
    pub fn new(offset: u32, len: u32, line: u32, col: u32) -> Self {
        Self {
            offset,
            len,
            line,
            col,
        }
    }

    /// A zero-width span, used for end-of-input.
    pub fn point(offset: u32, line: u32, col: u32) -> Self {
        Self::new(offset, 0, line, col)
    }

    /// Byte offset one past the last byte covered.
    pub fn end(&self) -> u32 {
        self.offset + self.len
    }

    /// Smallest span covering both `self` and `other`.
    ///
    /// The line/column of the result is that of whichever span starts first.
    pub fn merge(self, other: Span) -> Span {
        let (first, _) = if self.offset <= other.offset {
            (self, other)
        } else {
            (other, self)
        };
        let end = self.end().max(other.end());
        Span::new(first.offset, end - first.offset, first.line, first.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Expression source text with a line index, for error context.
#[derive(Debug, Clone)]
pub struct SourceText {
    text: String,
    line_starts: Vec<usize>,
}

impl SourceText {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { text, line_starts }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The 1-based source line, without its terminator.
    pub fn line(&self, line_number: u32) -> Option<&str> {
        let idx = line_number.checked_sub(1)? as usize;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&next| next - 1)
            .unwrap_or(self.text.len());
        Some(self.text[start..end].trim_end_matches('\r'))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// The text covered by `span`, or `None` if it is out of bounds or
    /// splits a UTF-8 character.
    pub fn slice(&self, span: Span) -> Option<&str> {
        self.text.get(span.offset as usize..span.end() as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge_orders_by_offset() {
        let a = Span::new(4, 3, 1, 5);
        let b = Span::new(0, 2, 1, 1);
        let merged = a.merge(b);
        assert_eq!(merged, Span::new(0, 7, 1, 1));
        assert_eq!(b.merge(a), merged);
    }

    #[test]
    fn test_span_merge_contained() {
        let outer = Span::new(0, 10, 1, 1);
        let inner = Span::new(2, 3, 1, 3);
        assert_eq!(outer.merge(inner), outer);
    }

    #[test]
    fn test_span_display() {
        assert_eq!(Span::new(12, 4, 2, 7).to_string(), "2:7");
    }

    #[test]
    fn test_span_serializes_column() {
        let json = serde_json::to_string(&Span::new(0, 1, 1, 1)).unwrap();
        assert!(json.contains("\"column\":1"));
    }

    #[test]
    fn test_source_lines() {
        let src = SourceText::new("a.b\r\n| upcase\nc");
        assert_eq!(src.line_count(), 3);
        assert_eq!(src.line(1), Some("a.b"));
        assert_eq!(src.line(2), Some("| upcase"));
        assert_eq!(src.line(3), Some("c"));
        assert_eq!(src.line(0), None);
        assert_eq!(src.line(4), None);
    }

    #[test]
    fn test_source_slice() {
        let src = SourceText::new("product.title");
        assert_eq!(src.slice(Span::new(7, 6, 1, 8)), Some(".title"));
        assert_eq!(src.slice(Span::new(10, 6, 1, 11)), None);
    }
}
