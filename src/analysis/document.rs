//! Tokenized documents with entity labels and named span groups.
//!
//! A [`Doc`] keeps the source text next to its tokens so that byte ranges
//! reported by detectors can be aligned with whole tokens, and token windows
//! can be taken around a span.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::token::Token;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// A contiguous range of tokens in a [`Doc`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Index of the first token.
    pub start: usize,
    /// Index one past the last token.
    pub end: usize,
    /// Byte offset of the first token in the source text.
    pub start_char: usize,
    /// Byte offset where the last token ends.
    pub end_char: usize,
    /// Label attached by whoever produced the span.
    pub label: String,
}

impl Span {
    /// Number of tokens covered by the span.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span covers no tokens.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A tokenized text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Doc {
    text: String,
    tokens: Vec<Token>,
    ent_types: Vec<Option<String>>,
    spans: BTreeMap<String, Vec<Span>>,
    corrected: Option<String>,
}

impl Doc {
    /// Tokenize `text` into a new document.
    pub fn new(text: &str, tokenizer: &dyn Tokenizer) -> Result<Self> {
        let tokens: Vec<Token> = tokenizer.tokenize(text)?.collect();
        Ok(Self::from_tokens(text, tokens))
    }

    /// Build a document from pre-computed tokens.
    pub fn from_tokens(text: &str, tokens: Vec<Token>) -> Self {
        let ent_types = vec![None; tokens.len()];
        Doc {
            text: text.to_string(),
            tokens,
            ent_types,
            spans: BTreeMap::new(),
            corrected: None,
        }
    }

    /// The source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All tokens in order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the document has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Entity label of the token at `index`, if any.
    pub fn ent_type(&self, index: usize) -> Option<&str> {
        self.ent_types.get(index).and_then(|e| e.as_deref())
    }

    /// Label every token of each span with the span's entity label.
    ///
    /// Spans are applied in order, later spans overwrite earlier labels.
    pub fn set_entities(&mut self, entities: &[(usize, usize, String)]) {
        for (start, end, label) in entities {
            let end = (*end).min(self.tokens.len());
            for i in *start..end {
                self.ent_types[i] = Some(label.clone());
            }
        }
    }

    /// Align a byte range with whole tokens.
    ///
    /// Every token overlapping `[start_char, end_char)` is included, so the
    /// resulting span may be wider than the requested range. Returns `None`
    /// when no token overlaps the range.
    pub fn char_span(&self, start_char: usize, end_char: usize, label: &str) -> Option<Span> {
        if start_char >= end_char {
            return None;
        }

        let first = self
            .tokens
            .iter()
            .position(|t| t.end_offset > start_char && t.start_offset < end_char)?;
        let last = self
            .tokens
            .iter()
            .rposition(|t| t.end_offset > start_char && t.start_offset < end_char)?;

        Some(self.token_span(first, last + 1, label))
    }

    /// Build a span over the token range `[start, end)`.
    pub fn token_span(&self, start: usize, end: usize, label: &str) -> Span {
        Span {
            start,
            end,
            start_char: self.tokens[start].start_offset,
            end_char: self.tokens[end - 1].end_offset,
            label: label.to_string(),
        }
    }

    /// The source text covered by a span.
    pub fn span_text(&self, span: &Span) -> &str {
        &self.text[span.start_char..span.end_char]
    }

    /// Texts of the tokens in `[start, end)`, clamped to the document.
    pub fn token_texts(&self, start: usize, end: usize) -> Vec<&str> {
        let end = end.min(self.tokens.len());
        let start = start.min(end);
        self.tokens[start..end]
            .iter()
            .map(|t| t.text.as_str())
            .collect()
    }

    /// Replace the span group stored under `key`.
    pub fn set_spans(&mut self, key: &str, spans: Vec<Span>) {
        self.spans.insert(key.to_string(), spans);
    }

    /// Get the span group stored under `key`.
    pub fn spans(&self, key: &str) -> &[Span] {
        self.spans.get(key).map(|s| s.as_slice()).unwrap_or(&[])
    }

    /// The corrected text, once a corrector has processed the document.
    pub fn corrected(&self) -> Option<&str> {
        self.corrected.as_deref()
    }

    /// Store the corrected text.
    pub fn set_corrected(&mut self, corrected: String) {
        self.corrected = Some(corrected);
    }
}
