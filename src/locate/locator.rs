//! Public entry point for locating a quote in its source.
//!
//! Decision sequence:
//! 1. Empty query or source: not found
//! 2. Case-insensitive substring of the source: exact span
//! 3. Otherwise split at omission markers and align each chunk's words
//!    against the source tokens; every chunk must align

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::segment::split_chunks;
use super::sequence::{find_sequence, Alignment};
use super::tokenizer::{fold, tokenize, words, Token};
use super::types::{MatchMethod, Span, SpanMatch};

/// Default per-word similarity threshold
pub const DEFAULT_TYPO_THRESHOLD: f64 = 0.8;

/// Default gap budget multiplier
pub const DEFAULT_GAP_FACTOR: usize = 3;

/// Tunable locator settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocateOptions {
    /// Minimum similarity for a query word to match a source word
    #[serde(default = "default_typo_threshold")]
    pub typo_threshold: f64,

    /// Source tokens an alignment may span, per query word
    #[serde(default = "default_gap_factor")]
    pub gap_factor: usize,

    /// Chunks with fewer words than this never take the fuzzy path
    #[serde(default = "default_min_fuzzy_words")]
    pub min_fuzzy_words: usize,

    /// Reject sources longer than this many characters
    #[serde(default)]
    pub max_source_chars: Option<usize>,
}

fn default_typo_threshold() -> f64 {
    DEFAULT_TYPO_THRESHOLD
}
fn default_gap_factor() -> usize {
    DEFAULT_GAP_FACTOR
}
fn default_min_fuzzy_words() -> usize {
    1
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self {
            typo_threshold: default_typo_threshold(),
            gap_factor: default_gap_factor(),
            min_fuzzy_words: default_min_fuzzy_words(),
            max_source_chars: None,
        }
    }
}

impl LocateOptions {
    /// Default options with a different threshold
    pub fn with_threshold(typo_threshold: f64) -> Self {
        Self {
            typo_threshold,
            ..Default::default()
        }
    }

    /// Check that every setting is usable
    pub fn validate(&self) -> Result<(), LocateError> {
        if !self.typo_threshold.is_finite() || !(0.0..=1.0).contains(&self.typo_threshold) {
            return Err(LocateError::InvalidThreshold(self.typo_threshold));
        }
        if self.gap_factor == 0 {
            return Err(LocateError::InvalidGapFactor);
        }
        if self.min_fuzzy_words == 0 {
            return Err(LocateError::InvalidMinFuzzyWords);
        }
        Ok(())
    }
}

/// Invalid locator input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocateError {
    #[error("Typo threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("Gap factor must be at least 1")]
    InvalidGapFactor,

    #[error("Minimum fuzzy word count must be at least 1")]
    InvalidMinFuzzyWords,

    #[error("Source too large: {actual} chars > {limit}")]
    SourceTooLarge { actual: usize, limit: usize },
}

/// Locates quotes in source documents with a fixed set of options.
///
/// Stateless between calls, so one locator can be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Locator {
    options: LocateOptions,
}

impl Locator {
    /// Create a locator, rejecting unusable options up front
    pub fn new(options: LocateOptions) -> Result<Self, LocateError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &LocateOptions {
        &self.options
    }

    /// Find the span `query` occupies in `source`.
    ///
    /// `Ok(None)` means no span met the criteria; it is not an error.
    pub fn find(&self, query: &str, source: &str) -> Result<Option<SpanMatch>, LocateError> {
        if let Some(limit) = self.options.max_source_chars {
            let actual = source.chars().count();
            if actual > limit {
                return Err(LocateError::SourceTooLarge { actual, limit });
            }
        }

        if query.is_empty() || source.is_empty() {
            return Ok(None);
        }

        if let Some(span) = find_exact(query, source) {
            debug!(start = span.start, end = span.end, "Exact match");
            return Ok(Some(SpanMatch {
                span,
                method: MatchMethod::Exact,
                score: 0.0,
                chunk_count: 1,
            }));
        }

        let chunks = split_chunks(query);
        if chunks.is_empty() {
            debug!("Query has no text to align");
            return Ok(None);
        }

        let tokens = tokenize(source);
        let mut alignments = Vec::with_capacity(chunks.len());

        for chunk in &chunks {
            match self.align_chunk(chunk, &tokens) {
                Some(alignment) => alignments.push(alignment),
                None => {
                    debug!(chunk, "Chunk not found");
                    return Ok(None);
                }
            }
        }

        Ok(merge(&alignments).map(|(span, score)| SpanMatch {
            span,
            method: MatchMethod::Fuzzy,
            score,
            chunk_count: alignments.len(),
        }))
    }

    fn align_chunk(&self, chunk: &str, tokens: &[Token]) -> Option<Alignment> {
        let query = words(chunk);
        if query.len() < self.options.min_fuzzy_words {
            debug!(chunk, words = query.len(), "Chunk too short for fuzzy matching");
            return None;
        }

        find_sequence(
            &query,
            tokens,
            self.options.typo_threshold,
            self.options.gap_factor,
        )
    }
}

/// Locate `query` in `source` with default settings and the given threshold.
///
/// Returns `Ok(None)` when not found, `Err` only for an invalid threshold.
pub fn locate(query: &str, source: &str, typo_threshold: f64) -> Result<Option<Span>, LocateError> {
    let locator = Locator::new(LocateOptions::with_threshold(typo_threshold))?;
    Ok(locator.find(query, source)?.map(|m| m.span))
}

/// First case-insensitive occurrence of `query` in `source`, in chars
fn find_exact(query: &str, source: &str) -> Option<Span> {
    let folded_source = fold(source);
    let folded_query = fold(query);

    let byte_idx = folded_source.find(&folded_query)?;
    let start = folded_source[..byte_idx].chars().count();
    Some(Span::new(start, start + query.chars().count()))
}

/// Combine per-chunk alignments from the first chunk's start to the last's end.
///
/// Chunk order is reading order, so positions are not re-sorted. Returns
/// `None` if the last chunk ends before the first one starts.
fn merge(alignments: &[Alignment]) -> Option<(Span, f64)> {
    let first = alignments.first()?;
    let last = alignments.last()?;

    if last.span.end < first.span.start {
        debug!(
            first_start = first.span.start,
            last_end = last.span.end,
            "Chunks aligned out of order"
        );
        return None;
    }

    let score = alignments.iter().map(|a| a.score).sum::<f64>() / alignments.len() as f64;
    Some((Span::new(first.span.start, last.span.end), score))
}
