//! Span and match result types.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Half-open character range `[start, end)` into a source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of characters covered
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert to a UTF-8 byte range into `source`.
    ///
    /// Returns `None` if the span runs past the end of the text.
    pub fn byte_range(&self, source: &str) -> Option<Range<usize>> {
        if self.start > self.end {
            return None;
        }

        let mut start = None;
        let mut end = None;
        let mut count = 0;

        for (byte_idx, _) in source.char_indices() {
            if count == self.start {
                start = Some(byte_idx);
            }
            if count == self.end {
                end = Some(byte_idx);
                break;
            }
            count += 1;
        }

        // Offsets equal to the char count point at the end of the text
        if start.is_none() && count == self.start {
            start = Some(source.len());
        }
        if end.is_none() && count == self.end {
            end = Some(source.len());
        }

        Some(start?..end?)
    }

    /// The text covered by this span
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        self.byte_range(source).map(|range| &source[range])
    }
}

/// How a span was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Case-insensitive substring match of the whole query
    Exact,
    /// Word-level alignment, possibly across omission markers
    Fuzzy,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::Exact => "exact",
            MatchMethod::Fuzzy => "fuzzy",
        }
    }
}

/// A located span with details on how it was found
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpanMatch {
    pub span: Span,
    pub method: MatchMethod,
    /// Average word distance (0.0 for exact matches)
    pub score: f64,
    /// Number of query chunks that were aligned
    pub chunk_count: usize,
}
