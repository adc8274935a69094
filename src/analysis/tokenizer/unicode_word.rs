//! Unicode word tokenizer implementation.
//!
//! Splits text using Unicode word boundary rules (UAX #29) and keeps every
//! segment that is not whitespace, so punctuation marks become tokens of their
//! own. Apostrophes between letters do not break a word (`м'ясо`, `п’ять`),
//! while hyphens do (`5ти-поверхівка` → `5ти`, `-`, `поверхівка`).
//!
//! # Examples
//!
//! ```
//! use speliuk::analysis::tokenizer::Tokenizer;
//! use speliuk::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
//!
//! let tokenizer = UnicodeWordTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("Привіт, світе!").unwrap().collect();
//!
//! assert_eq!(tokens[0].text, "Привіт");
//! assert_eq!(tokens[1].text, ",");
//! assert_eq!(tokens[2].text, "світе");
//! assert_eq!(tokens[3].text, "!");
//! ```

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// A tokenizer that splits text on Unicode word boundaries.
#[derive(Clone, Debug, Default)]
pub struct UnicodeWordTokenizer;

impl UnicodeWordTokenizer {
    /// Create a new Unicode word tokenizer.
    pub fn new() -> Self {
        UnicodeWordTokenizer
    }

    /// Tokenize into a vector directly.
    pub fn tokens(&self, text: &str) -> Vec<Token> {
        text.split_word_bound_indices()
            .filter(|(_, segment)| !segment.chars().all(char::is_whitespace))
            .enumerate()
            .map(|(position, (start, segment))| {
                Token::with_offsets(segment, position, start, start + segment.len())
            })
            .collect()
    }
}

impl Tokenizer for UnicodeWordTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        Ok(Box::new(self.tokens(text).into_iter()))
    }

    fn name(&self) -> &'static str {
        "unicode_word"
    }
}
