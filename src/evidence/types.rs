//! Grounding record types
//!
//! These types are the JSON-lines schemas read and written by the
//! `ground` and `verify` commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::locate::MatchMethod;

/// What kind of item the extraction pipeline pulled out of the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionKind {
    /// A person or organisation name
    Name,
    /// A quote giving job context
    JobContext,
    /// A quote giving event context
    EventContext,
    #[default]
    Other,
}

impl ExtractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionKind::Name => "name",
            ExtractionKind::JobContext => "job_context",
            ExtractionKind::EventContext => "event_context",
            ExtractionKind::Other => "other",
        }
    }
}

/// An extracted item awaiting grounding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    /// Caller-supplied ID (derived from content if absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub kind: ExtractionKind,
    /// Text produced by the extractor
    pub quote: String,
}

/// Resolution status for a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// A span was located
    Resolved,
    /// No span met the criteria, nothing to highlight
    Unresolved,
}

/// Method used to resolve the quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    /// Case-insensitive substring match
    Exact,
    /// Word alignment with typo and gap tolerance
    Fuzzy,
    /// No match found
    None,
}

impl From<MatchMethod> for ResolutionMethod {
    fn from(method: MatchMethod) -> Self {
        match method {
            MatchMethod::Exact => ResolutionMethod::Exact,
            MatchMethod::Fuzzy => ResolutionMethod::Fuzzy,
        }
    }
}

/// Resolution details for a quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub method: ResolutionMethod,
    /// Average word distance of the match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Number of "..."-separated chunks aligned
    pub chunk_count: usize,
}

/// A located span in the source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanRecord {
    /// Character offset range [start, end)
    pub char_offset: [usize; 2],
    /// UTF-8 byte offset range [start, end)
    pub utf8_byte_offset: [usize; 2],
    /// SHA256 hash of the slice bytes
    pub slice_sha256: String,
    /// Context around the span
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_text: Option<String>,
}

/// A grounding line in the output JSONL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundedExtraction {
    /// Caller-supplied or deterministic ID
    pub id: String,
    pub kind: ExtractionKind,
    /// Quote as produced by the extractor
    pub quote: String,
    /// SHA256 hash of the quote
    pub quote_sha256: String,
    /// SHA256 hash of the whole source at grounding time
    pub source_sha256: String,
    pub status: Status,
    pub resolution: Resolution,
    /// Present only when resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<SpanRecord>,
    /// Timestamp when the record was created
    pub ts: DateTime<Utc>,
}

impl GroundedExtraction {
    /// Create a resolved record
    #[allow(clippy::too_many_arguments)]
    pub fn new_resolved(
        id: String,
        kind: ExtractionKind,
        quote: String,
        quote_sha256: String,
        source_sha256: String,
        method: MatchMethod,
        score: f64,
        chunk_count: usize,
        span: SpanRecord,
        ts: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind,
            quote,
            quote_sha256,
            source_sha256,
            status: Status::Resolved,
            resolution: Resolution {
                method: method.into(),
                score: Some(score),
                chunk_count,
            },
            span: Some(span),
            ts,
        }
    }

    /// Create an unresolved record
    pub fn new_unresolved(
        id: String,
        kind: ExtractionKind,
        quote: String,
        quote_sha256: String,
        source_sha256: String,
        ts: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind,
            quote,
            quote_sha256,
            source_sha256,
            status: Status::Unresolved,
            resolution: Resolution {
                method: ResolutionMethod::None,
                score: None,
                chunk_count: 0,
            },
            span: None,
            ts,
        }
    }
}
