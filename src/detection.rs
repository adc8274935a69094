//! Error span detection.
//!
//! A detector finds byte ranges of a text that are likely misspelled. The
//! corrector aligns these ranges with tokens before generating candidates.

pub mod lexicon;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use lexicon::{Lexicon, LexiconDetector};

/// Label of spelling errors.
pub const SPELLING_LABEL: &str = "Spelling";

/// A suspected error at the byte range `[start_char, end_char)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSpan {
    pub start_char: usize,
    pub end_char: usize,
    pub label: String,
}

impl ErrorSpan {
    /// Create a new error span.
    pub fn new(start_char: usize, end_char: usize, label: &str) -> Self {
        ErrorSpan {
            start_char,
            end_char,
            label: label.to_string(),
        }
    }
}

/// Trait for error span detectors.
pub trait ErrorDetector: Send + Sync {
    /// Find suspected errors in the text, ordered by position.
    fn detect(&self, text: &str) -> Result<Vec<ErrorSpan>>;

    /// Get the name of this detector.
    fn name(&self) -> &'static str;
}
