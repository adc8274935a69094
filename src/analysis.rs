//! Text analysis module for Speliuk.
//!
//! Tokenization and the [`Doc`](document::Doc) type the correction pipeline
//! works on.

pub mod document;
pub mod token;
pub mod tokenizer;

pub use document::{Doc, Span};
pub use token::{Token, TokenStream, TokenType};
pub use tokenizer::{Tokenizer, UnicodeWordTokenizer, WhitespaceTokenizer};
