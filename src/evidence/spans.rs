//! Span utilities for grounding records
//!
//! Hashing, anchor text and line/column conversion for located spans.
//! Offsets taken here are UTF-8 byte offsets; use
//! [`Span::byte_range`](crate::locate::Span::byte_range) to get them from
//! character spans.

use std::ops::Range;

use sha2::{Digest, Sha256};

/// Compute SHA256 hash of a byte slice, returning hex string with prefix
///
/// # Returns
/// * String in format "sha256:abc123..."
pub fn compute_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    format!("sha256:{}", hex::encode(result))
}

/// Compute the hash of a byte range of the source
///
/// Returns `None` if the range is out of bounds or splits a char.
pub fn compute_slice_hash(source: &str, range: Range<usize>) -> Option<String> {
    source.get(range).map(|slice| compute_hash(slice.as_bytes()))
}

/// Extract anchor text around a span
///
/// Returns about `window` bytes of context centred on the span, widened to
/// char boundaries, with "..." where the source was cut.
///
/// # Arguments
/// * `source` - The full source text
/// * `start` - Start byte offset of span
/// * `end` - End byte offset of span
/// * `window` - Total bytes of context (default 80)
pub fn extract_anchor_text(source: &str, start: usize, end: usize, window: usize) -> String {
    let len = source.len();
    let start = start.min(len);
    let end = end.clamp(start, len);

    let span_len = end - start;
    let remaining = window.saturating_sub(span_len);
    let each_side = remaining / 2;

    let mut anchor_start = start.saturating_sub(each_side);
    while anchor_start > 0 && !source.is_char_boundary(anchor_start) {
        anchor_start -= 1;
    }

    let mut anchor_end = (end + each_side).min(len);
    while anchor_end < len && !source.is_char_boundary(anchor_end) {
        anchor_end += 1;
    }

    let prefix = if anchor_start > 0 { "..." } else { "" };
    let suffix = if anchor_end < len { "..." } else { "" };

    // Newlines would break single-line display
    let anchor = source[anchor_start..anchor_end].replace(|c: char| c == '\n' || c == '\r', " ");

    format!("{}{}{}", prefix, anchor, suffix)
}

/// Line and column position (1-indexed for editor compatibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub col: usize,
}

/// Convert byte offset to line/column position
///
/// The column counts chars, not bytes, from the start of the line.
pub fn offset_to_line_col(source: &str, offset: usize) -> LineCol {
    let mut offset = offset.min(source.len());
    while offset > 0 && !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let prefix = &source[..offset];

    let line = prefix.matches('\n').count() + 1;
    let line_start = prefix.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let col = source[line_start..offset].chars().count() + 1;

    LineCol { line, col }
}

/// Compute deterministic grounding ID
///
/// Two-tier strategy:
/// - Unresolved: sha256(kind + quote_sha256 + source_sha256)[0:16]
/// - Resolved: sha256(kind + quote_sha256 + source_sha256 + start + end)[0:16]
///
/// `span` is the character span, if one was found.
pub fn compute_grounding_id(
    kind: &str,
    quote_sha256: &str,
    source_sha256: &str,
    span: Option<(usize, usize)>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_bytes());
    hasher.update(quote_sha256.as_bytes());
    hasher.update(source_sha256.as_bytes());

    if let Some((start, end)) = span {
        hasher.update(start.to_string().as_bytes());
        hasher.update(end.to_string().as_bytes());
    }

    let result = hasher.finalize();
    hex::encode(&result[..8]) // 16 hex chars = 8 bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_hash() {
        let hash = compute_hash(b"hello");
        assert!(hash.starts_with("sha256:"));
        assert_eq!(hash.len(), 7 + 64); // "sha256:" + 64 hex chars
    }

    #[test]
    fn test_slice_hash_matches_whole_hash() {
        let source = "Hello world";
        assert_eq!(
            compute_slice_hash(source, 6..11),
            Some(compute_hash(b"world"))
        );
    }

    #[test]
    fn test_slice_hash_out_of_bounds() {
        assert_eq!(compute_slice_hash("short", 2..20), None);
        // Inside a multibyte char
        assert_eq!(compute_slice_hash("é", 1..2), None);
    }

    #[test]
    fn test_offset_to_line_col() {
        let source = "line1\nline2\nline3";

        assert_eq!(offset_to_line_col(source, 0), LineCol { line: 1, col: 1 });
        assert_eq!(offset_to_line_col(source, 6), LineCol { line: 2, col: 1 });
        assert_eq!(offset_to_line_col(source, 8), LineCol { line: 2, col: 3 });
    }

    #[test]
    fn test_offset_to_line_col_counts_chars() {
        let source = "héllo wörld";
        // "wörld" starts at byte 7 (é is two bytes)
        assert_eq!(offset_to_line_col(source, 7), LineCol { line: 1, col: 7 });
    }

    #[test]
    fn test_grounding_id_deterministic() {
        let id1 = compute_grounding_id("name", "sha256:q", "sha256:s", Some((10, 20)));
        let id2 = compute_grounding_id("name", "sha256:q", "sha256:s", Some((10, 20)));
        assert_eq!(id1, id2);
        assert_eq!(id1.len(), 16);
    }

    #[test]
    fn test_grounding_id_differs_by_span() {
        let id1 = compute_grounding_id("name", "sha256:q", "sha256:s", Some((10, 20)));
        let id2 = compute_grounding_id("name", "sha256:q", "sha256:s", Some((30, 40)));
        let id3 = compute_grounding_id("name", "sha256:q", "sha256:s", None);
        assert_ne!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_extract_anchor_text() {
        let source = "This is a long article body with many words and content for testing.";
        let anchor = extract_anchor_text(source, 10, 22, 40);
        assert!(anchor.len() <= 46); // 40 + two ellipses
        assert!(anchor.contains("long article"));
        assert!(anchor.ends_with("..."));
    }

    #[test]
    fn test_extract_anchor_text_whole_source() {
        let anchor = extract_anchor_text("short\ntext", 0, 5, 80);
        assert_eq!(anchor, "short text");
    }

    #[test]
    fn test_extract_anchor_text_utf8_boundaries() {
        let source = "ééééé target ééééé";
        let start = source.find("target").unwrap();
        let anchor = extract_anchor_text(source, start, start + 6, 9);
        assert!(anchor.contains("target"));
    }
}
