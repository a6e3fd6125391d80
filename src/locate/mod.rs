//! Fuzzy span location for extracted quotes
//!
//! Extraction output rarely reproduces its source verbatim: whitespace,
//! punctuation and case drift, words get paraphrased or elided with "...",
//! and characters get mistyped. This module recovers the character span a
//! quote occupies in its source despite those differences.
//!
//! # Design
//!
//! - **Exact first**: a case-insensitive substring match wins outright
//! - **Word alignment**: otherwise query words are aligned in order against
//!   source words, skipping filler words within a gap budget
//! - **Per-word tolerance**: words match when their Ratcliff/Obershelp
//!   similarity reaches the typo threshold
//! - **All or nothing**: an elided quote is found only if every chunk is
//! - **Character offsets**: spans are half-open `[start, end)` char ranges
//!   into the original source
//!
//! Everything here is pure and synchronous; calls may run in parallel.
//!
//! # Example
//!
//! ```
//! use quote_anchor::locate::{locate, Span};
//!
//! let source = "Former president Barack Obama spoke today.";
//! let span = locate("Baracq Obama", source, 0.8).unwrap();
//! assert_eq!(span, Some(Span::new(17, 29)));
//! ```

pub mod locator;
pub mod segment;
pub mod sequence;
pub mod similarity;
pub mod tokenizer;
pub mod types;

pub use locator::{
    locate, LocateError, LocateOptions, Locator, DEFAULT_GAP_FACTOR, DEFAULT_TYPO_THRESHOLD,
};
pub use segment::split_chunks;
pub use sequence::{find_sequence, Alignment};
pub use similarity::{distance, similarity};
pub use tokenizer::{tokenize, Token};
pub use types::{MatchMethod, Span, SpanMatch};
