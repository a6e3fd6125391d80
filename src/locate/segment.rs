//! Query segmentation at omission markers.
//!
//! Extracted quotes often elide text with "..." (or longer runs of dots).
//! Each side of such a marker is located separately.

/// Minimum run of periods that counts as an omission marker
pub const MIN_MARKER_DOTS: usize = 3;

/// Split a query into ordered, trimmed, non-empty chunks.
///
/// Runs of [`MIN_MARKER_DOTS`] or more `.` separate chunks; shorter runs
/// stay part of the text. A query with no marker comes back as a single
/// chunk. Every chunk holds some non-whitespace text, so empty or
/// whitespace-only input yields no chunks; the locator only reaches this
/// after the literal search for such a query has failed.
pub fn split_chunks(query: &str) -> Vec<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut piece_start = 0;
    let mut run_start: Option<usize> = None;
    let mut run_len = 0;

    for (idx, c) in query.char_indices() {
        if c == '.' {
            if run_start.is_none() {
                run_start = Some(idx);
            }
            run_len += 1;
            continue;
        }

        if let Some(start) = run_start.take() {
            if run_len >= MIN_MARKER_DOTS {
                push_chunk(&mut chunks, &query[piece_start..start]);
                piece_start = idx;
            }
        }
        run_len = 0;
    }

    match run_start {
        Some(start) if run_len >= MIN_MARKER_DOTS => {
            push_chunk(&mut chunks, &query[piece_start..start]);
        }
        _ => push_chunk(&mut chunks, &query[piece_start..]),
    }

    // A query made only of markers has nothing left to split
    if chunks.is_empty() {
        chunks.push(trimmed);
    }

    chunks
}

fn push_chunk<'a>(chunks: &mut Vec<&'a str>, piece: &'a str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        chunks.push(piece);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_marker_single_chunk() {
        assert_eq!(split_chunks("  Barack Obama  "), vec!["Barack Obama"]);
    }

    #[test]
    fn test_split_on_ellipsis() {
        assert_eq!(
            split_chunks("spoke today... concluded the summit"),
            vec!["spoke today", "concluded the summit"]
        );
    }

    #[test]
    fn test_longer_runs_and_order() {
        assert_eq!(
            split_chunks("first ..... second.......third"),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn test_short_runs_are_text() {
        assert_eq!(split_chunks("U.S. policy.. shift"), vec!["U.S. policy.. shift"]);
    }

    #[test]
    fn test_leading_and_trailing_markers_dropped() {
        assert_eq!(split_chunks("...he said ... done..."), vec!["he said", "done"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_chunks("").is_empty());
        assert!(split_chunks("   ").is_empty());
    }

    #[test]
    fn test_markers_only_never_empty() {
        assert_eq!(split_chunks(" ...... "), vec!["......"]);
    }
}
