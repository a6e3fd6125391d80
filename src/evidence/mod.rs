//! Grounding records for extracted items
//!
//! The extraction pipeline persists each located span next to the item it
//! grounds, so the presentation layer can highlight it later. This module
//! defines those records and the checks that keep them honest.
//!
//! # Design Principles
//!
//! - **Honest unresolved**: If no span is found, record unresolved. Absence
//!   only suppresses highlighting for that item.
//! - **Append-only**: Records are written as JSON lines, never modified.
//! - **Hash verification**: Each span includes slice_sha256 for drift detection.
//! - **Deterministic IDs**: Same input always produces same record ID.
//!
//! # Example
//!
//! ```
//! use quote_anchor::evidence::{ground, Extraction, ExtractionKind, Status};
//! use quote_anchor::locate::Locator;
//!
//! let source = "Former president Barack Obama spoke today.";
//! let item = Extraction {
//!     id: None,
//!     kind: ExtractionKind::Name,
//!     quote: "Barack Obama".to_string(),
//! };
//! let record = ground(&item, source, &Locator::default(), 80).unwrap();
//! assert_eq!(record.status, Status::Resolved);
//! ```

pub mod grounding;
pub mod spans;
pub mod types;

pub use grounding::{ground, ground_with_digest, verify, SpanCheck, DEFAULT_ANCHOR_WINDOW};
pub use spans::{
    compute_grounding_id, compute_hash, compute_slice_hash, extract_anchor_text,
    offset_to_line_col, LineCol,
};
pub use types::{
    Extraction, ExtractionKind, GroundedExtraction, Resolution, ResolutionMethod, SpanRecord,
    Status,
};
