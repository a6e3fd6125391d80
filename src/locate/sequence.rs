//! Gap-tolerant alignment of query words against source tokens.
//!
//! Every source token is tried as an anchor. From an anchor, query words
//! are matched greedily in order; source tokens that don't match are
//! skipped as filler, up to a gap budget. The anchor with the lowest
//! average distance wins, earliest anchor on ties.

use tracing::trace;

use super::similarity::similarity;
use super::tokenizer::Token;
use super::types::Span;

/// Result of a successful alignment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    /// Character span from the first to the last matched token
    pub span: Span,
    /// Average per-word distance of the matched words
    pub score: f64,
}

/// An in-progress alignment from one anchor
struct MatchCandidate {
    anchor: usize,
    matched: Vec<usize>,
    score: f64,
}

impl MatchCandidate {
    fn new(anchor: usize, capacity: usize) -> Self {
        Self {
            anchor,
            matched: Vec::with_capacity(capacity),
            score: 0.0,
        }
    }

    /// Walk forward from the anchor, returning true if every query word matched
    fn run(&mut self, query: &[String], tokens: &[Token], threshold: f64, budget: usize) -> bool {
        let mut query_idx = 0;
        let mut text_idx = self.anchor;

        while query_idx < query.len() && text_idx < tokens.len() {
            if text_idx - self.anchor > budget {
                return false;
            }

            let sim = similarity(&query[query_idx], &tokens[text_idx].text);
            if sim >= threshold {
                self.matched.push(text_idx);
                self.score += 1.0 - sim;
                query_idx += 1;
            }
            text_idx += 1;
        }

        query_idx == query.len()
    }

    fn into_alignment(self, query_len: usize, tokens: &[Token]) -> Option<Alignment> {
        let first = *self.matched.first()?;
        let last = *self.matched.last()?;
        Some(Alignment {
            span: Span::new(tokens[first].start, tokens[last].end),
            score: self.score / query_len as f64,
        })
    }
}

/// Find the best in-order alignment of `query` words within `tokens`.
///
/// `threshold` is the per-word minimum similarity and `gap_factor` scales
/// the number of source tokens an anchor may span (`gap_factor * query.len()`).
/// Returns `None` when no anchor aligns every query word.
pub fn find_sequence(
    query: &[String],
    tokens: &[Token],
    threshold: f64,
    gap_factor: usize,
) -> Option<Alignment> {
    if query.is_empty() || tokens.is_empty() {
        return None;
    }

    let budget = gap_factor.saturating_mul(query.len());
    let mut best: Option<Alignment> = None;

    for anchor in 0..tokens.len() {
        let mut candidate = MatchCandidate::new(anchor, query.len());
        if !candidate.run(query, tokens, threshold, budget) {
            continue;
        }

        let Some(alignment) = candidate.into_alignment(query.len(), tokens) else {
            continue;
        };

        trace!(anchor, score = alignment.score, "Candidate alignment");

        if best.map_or(true, |current| alignment.score < current.score) {
            best = Some(alignment);
        }
    }

    best
}
