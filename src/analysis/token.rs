//! Token types and utilities for text analysis.
//!
//! A [`Token`] is a slice of the source text with its position in the token
//! sequence and its byte offsets, so that edits found on tokens can be mapped
//! back onto the original text.
//!
//! # Examples
//!
//! ```
//! use speliuk::analysis::token::{Token, TokenType};
//!
//! let token = Token::with_offsets("слово", 1, 6, 16).with_token_type(TokenType::Alphanum);
//! assert_eq!(token.text, "слово");
//! assert_eq!(token.start_offset, 6);
//! assert_eq!(token.end_offset, 16);
//! assert_eq!(token.token_type, TokenType::Alphanum);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A token represents a single unit of text after tokenization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the token sequence (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the original text
    pub start_offset: usize,

    /// The byte offset where this token ends in the original text
    pub end_offset: usize,

    /// Coarse classification of the token content
    pub token_type: TokenType,
}

/// Token type classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// Words: at least one letter, possibly with digits and apostrophes
    Alphanum,
    /// Numeric values
    Num,
    /// Punctuation marks
    Punctuation,
    /// Other/unknown token types (symbols, emoji, ...)
    Other,
}

impl TokenType {
    /// Classify a piece of text.
    ///
    /// - All numeric → Num
    /// - Contains a letter → Alphanum
    /// - All punctuation → Punctuation
    /// - Otherwise → Other
    pub fn detect(text: &str) -> TokenType {
        if text.is_empty() {
            return TokenType::Other;
        }

        if text.chars().all(|c| c.is_numeric()) {
            return TokenType::Num;
        }

        if text.chars().any(|c| c.is_alphabetic()) {
            return TokenType::Alphanum;
        }

        if text
            .chars()
            .all(|c| c.is_ascii_punctuation() || is_unicode_punctuation(c))
        {
            return TokenType::Punctuation;
        }

        TokenType::Other
    }
}

fn is_unicode_punctuation(c: char) -> bool {
    matches!(
        c,
        '«' | '»' | '„' | '“' | '”' | '‘' | '’' | '—' | '–' | '…' | '•' | '·' | '№'
    )
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        let text = text.into();
        let token_type = TokenType::detect(&text);
        Token {
            text,
            position,
            start_offset: 0,
            end_offset: 0,
            token_type,
        }
    }

    /// Create a new token with text, position, and byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        let text = text.into();
        let token_type = TokenType::detect(&text);
        Token {
            text,
            position,
            start_offset,
            end_offset,
            token_type,
        }
    }

    /// Get the length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Override the detected token type.
    pub fn with_token_type(mut self, token_type: TokenType) -> Self {
        self.token_type = token_type;
        self
    }

    /// Whether the token is a word (contains at least one letter).
    pub fn is_word(&self) -> bool {
        self.token_type == TokenType::Alphanum
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A token stream represents a sequence of tokens from a tokenizer.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

/// Trait for types that can produce a token stream.
pub trait IntoTokenStream {
    /// Convert this type into a token stream.
    fn into_token_stream(self) -> TokenStream;
}

impl IntoTokenStream for Vec<Token> {
    fn into_token_stream(self) -> TokenStream {
        Box::new(self.into_iter())
    }
}
