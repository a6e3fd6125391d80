//! quote-anchor - locate extracted quotes in their source documents
//!
//! Language-model extraction (names, job and event context quotes) rarely
//! reproduces its source verbatim. This crate recovers the character span
//! an extracted snippet occupies in the original document so it can be
//! highlighted, cited or audited.
//!
//! # Modules
//!
//! - `locate`: The span-location engine (tokenizer, similarity, segmenter,
//!   gap-tolerant aligner, locator)
//! - `evidence`: Grounding records that persist located spans
//! - `config`: Layered configuration (env, config file, defaults)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Locate one quote
//! quote-anchor locate "Baracq Obama" --source article.txt
//!
//! # Ground a batch of extractions
//! quote-anchor ground --source article.txt --input extractions.jsonl --output grounded.jsonl
//!
//! # Check persisted spans after the article changed
//! quote-anchor verify --source article.txt --input grounded.jsonl
//! ```

pub mod cli;
pub mod config;
pub mod evidence;
pub mod locate;

// Re-export main types at crate root for convenience
pub use evidence::{Extraction, ExtractionKind, GroundedExtraction, SpanCheck, Status};
pub use locate::{locate, LocateError, LocateOptions, Locator, MatchMethod, Span, SpanMatch};
