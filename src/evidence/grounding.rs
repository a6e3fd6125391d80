//! Build and re-check grounding records.

use chrono::Utc;
use tracing::debug;

use super::spans::{compute_grounding_id, compute_hash, compute_slice_hash, extract_anchor_text};
use super::types::{Extraction, GroundedExtraction, SpanRecord, Status};
use crate::locate::{LocateError, Locator};

/// Default context window for anchor text, in bytes
pub const DEFAULT_ANCHOR_WINDOW: usize = 80;

/// Locate an extraction's quote in `source` and build its record.
///
/// A quote that cannot be located yields an unresolved record, not an error.
pub fn ground(
    extraction: &Extraction,
    source: &str,
    locator: &Locator,
    anchor_window: usize,
) -> Result<GroundedExtraction, LocateError> {
    let source_sha256 = compute_hash(source.as_bytes());
    ground_with_digest(extraction, source, &source_sha256, locator, anchor_window)
}

/// Same as [`ground`], reusing a precomputed source hash
pub fn ground_with_digest(
    extraction: &Extraction,
    source: &str,
    source_sha256: &str,
    locator: &Locator,
    anchor_window: usize,
) -> Result<GroundedExtraction, LocateError> {
    let quote_sha256 = compute_hash(extraction.quote.as_bytes());
    let kind = extraction.kind.as_str();
    let ts = Utc::now();

    let found = locator.find(&extraction.quote, source)?;

    // Spans always lie within the source, but stay unresolved rather than panic
    let located = found.and_then(|m| {
        let range = m.span.byte_range(source)?;
        let slice_sha256 = compute_slice_hash(source, range.clone())?;
        Some((m, range, slice_sha256))
    });

    let Some((found, range, slice_sha256)) = located else {
        debug!(kind, quote = %extraction.quote, "Quote unresolved");
        let id = extraction
            .id
            .clone()
            .unwrap_or_else(|| compute_grounding_id(kind, &quote_sha256, source_sha256, None));
        return Ok(GroundedExtraction::new_unresolved(
            id,
            extraction.kind,
            extraction.quote.clone(),
            quote_sha256,
            source_sha256.to_string(),
            ts,
        ));
    };

    let span = found.span;
    let id = extraction.id.clone().unwrap_or_else(|| {
        compute_grounding_id(kind, &quote_sha256, source_sha256, Some((span.start, span.end)))
    });

    let span_record = SpanRecord {
        char_offset: [span.start, span.end],
        utf8_byte_offset: [range.start, range.end],
        slice_sha256,
        anchor_text: (anchor_window > 0)
            .then(|| extract_anchor_text(source, range.start, range.end, anchor_window)),
    };

    Ok(GroundedExtraction::new_resolved(
        id,
        extraction.kind,
        extraction.quote.clone(),
        quote_sha256,
        source_sha256.to_string(),
        found.method,
        found.score,
        found.chunk_count,
        span_record,
        ts,
    ))
}

/// Outcome of re-checking a persisted span against the current source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanCheck {
    /// Slice hash still matches
    Valid,
    /// Offsets are in bounds but the text changed
    Stale,
    /// Offsets run past the end of the source
    OutOfBounds,
    /// Record has no span to check
    Unresolved,
}

impl SpanCheck {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanCheck::Valid => "valid",
            SpanCheck::Stale => "stale",
            SpanCheck::OutOfBounds => "out_of_bounds",
            SpanCheck::Unresolved => "unresolved",
        }
    }
}

/// Check a record's span against the current source text.
///
/// If the whole source is unchanged, every resolved span is valid without
/// per-span hashing.
pub fn verify(record: &GroundedExtraction, source: &str, source_sha256: &str) -> SpanCheck {
    let span = match (&record.status, &record.span) {
        (Status::Resolved, Some(span)) => span,
        _ => return SpanCheck::Unresolved,
    };

    if record.source_sha256 == source_sha256 {
        return SpanCheck::Valid;
    }

    let [start, end] = span.utf8_byte_offset;
    if start > end || end > source.len() {
        return SpanCheck::OutOfBounds;
    }

    match compute_slice_hash(source, start..end) {
        Some(hash) if hash == span.slice_sha256 => SpanCheck::Valid,
        _ => SpanCheck::Stale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::types::{ExtractionKind, ResolutionMethod};

    const SOURCE: &str = "Former president Barack Obama spoke today.";

    fn extraction(quote: &str) -> Extraction {
        Extraction {
            id: None,
            kind: ExtractionKind::Name,
            quote: quote.to_string(),
        }
    }

    #[test]
    fn test_ground_exact() {
        let record = ground(&extraction("Barack Obama"), SOURCE, &Locator::default(), 80).unwrap();
        assert_eq!(record.status, Status::Resolved);
        assert_eq!(record.resolution.method, ResolutionMethod::Exact);

        let span = record.span.unwrap();
        assert_eq!(span.char_offset, [17, 29]);
        assert_eq!(span.utf8_byte_offset, [17, 29]);
        assert_eq!(span.slice_sha256, compute_hash(b"Barack Obama"));
        assert_eq!(span.anchor_text.as_deref(), Some(SOURCE));
        assert_eq!(record.id.len(), 16);
    }

    #[test]
    fn test_ground_unresolved() {
        let record = ground(
            &extraction("xyz nonexistent phrase"),
            SOURCE,
            &Locator::default(),
            80,
        )
        .unwrap();
        assert_eq!(record.status, Status::Unresolved);
        assert_eq!(record.resolution.method, ResolutionMethod::None);
        assert!(record.span.is_none());
    }

    #[test]
    fn test_ground_keeps_caller_id() {
        let mut item = extraction("Baracq Obama");
        item.id = Some("job-42".to_string());
        let record = ground(&item, SOURCE, &Locator::default(), 0).unwrap();
        assert_eq!(record.id, "job-42");
        assert_eq!(record.resolution.method, ResolutionMethod::Fuzzy);
        assert!(record.span.unwrap().anchor_text.is_none());
    }

    #[test]
    fn test_ground_multibyte_offsets() {
        let source = "Le président Müller a parlé.";
        let record = ground(&extraction("Müller"), source, &Locator::default(), 80).unwrap();
        let span = record.span.unwrap();
        assert_eq!(span.char_offset, [13, 19]);
        let [start, end] = span.utf8_byte_offset;
        assert_eq!(&source[start..end], "Müller");
    }

    #[test]
    fn test_verify_states() {
        let locator = Locator::default();
        let record = ground(&extraction("Barack Obama"), SOURCE, &locator, 80).unwrap();
        let digest = compute_hash(SOURCE.as_bytes());
        assert_eq!(verify(&record, SOURCE, &digest), SpanCheck::Valid);

        // Edited after the span: span still valid
        let edited = format!("{} More text.", SOURCE);
        let edited_digest = compute_hash(edited.as_bytes());
        assert_eq!(verify(&record, &edited, &edited_digest), SpanCheck::Valid);

        // Edited before the span: text shifted under the offsets
        let shifted = format!("Yes. {}", SOURCE);
        let shifted_digest = compute_hash(shifted.as_bytes());
        assert_eq!(verify(&record, &shifted, &shifted_digest), SpanCheck::Stale);

        let truncated = "Former";
        let truncated_digest = compute_hash(truncated.as_bytes());
        assert_eq!(
            verify(&record, truncated, &truncated_digest),
            SpanCheck::OutOfBounds
        );

        let missing = ground(&extraction("nowhere to be seen"), SOURCE, &locator, 80).unwrap();
        assert_eq!(verify(&missing, SOURCE, &digest), SpanCheck::Unresolved);
    }
}
