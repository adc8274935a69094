//! Tokenizer implementations for text analysis.
//!
//! # Available Tokenizers
//!
//! - [`unicode_word::UnicodeWordTokenizer`] - Unicode word boundaries, keeps punctuation
//! - [`whitespace::WhitespaceTokenizer`] - Splits on whitespace characters
//!
//! # Examples
//!
//! ```
//! use speliuk::analysis::tokenizer::Tokenizer;
//! use speliuk::analysis::tokenizer::whitespace::WhitespaceTokenizer;
//!
//! let tokenizer = WhitespaceTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("добрий день").unwrap().collect();
//! assert_eq!(tokens.len(), 2);
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` so a corrector holding a tokenizer can be
/// shared across threads.
///
/// # Examples
///
/// Implementing a custom tokenizer:
///
/// ```
/// use speliuk::analysis::token::{Token, TokenStream};
/// use speliuk::analysis::tokenizer::Tokenizer;
/// use speliuk::error::Result;
///
/// struct CommaTokenizer;
///
/// impl Tokenizer for CommaTokenizer {
///     fn tokenize(&self, text: &str) -> Result<TokenStream> {
///         let tokens: Vec<Token> = text
///             .split(',')
///             .enumerate()
///             .map(|(i, s)| Token::new(s.trim(), i))
///             .collect();
///         Ok(Box::new(tokens.into_iter()))
///     }
///
///     fn name(&self) -> &'static str {
///         "comma"
///     }
/// }
/// ```
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod unicode_word;
pub mod whitespace;

pub use unicode_word::UnicodeWordTokenizer;
pub use whitespace::WhitespaceTokenizer;
