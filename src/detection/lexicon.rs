//! Lexicon based error detection.
//!
//! Word tokens whose lower-cased form is missing from a lexicon are reported
//! as spelling errors.

use std::sync::Arc;

use ahash::AHashSet;

use crate::analysis::tokenizer::{Tokenizer, UnicodeWordTokenizer};
use crate::config::DetectionSettings;
use crate::detection::{ErrorDetector, ErrorSpan, SPELLING_LABEL};
use crate::error::Result;
use crate::spelling::{SpellingDictionary, SymSpell};

/// A set of known words.
pub trait Lexicon: Send + Sync {
    /// Check if the word is known.
    fn contains_word(&self, word: &str) -> bool;
}

impl Lexicon for SpellingDictionary {
    fn contains_word(&self, word: &str) -> bool {
        self.contains(word)
    }
}

impl Lexicon for SymSpell {
    fn contains_word(&self, word: &str) -> bool {
        self.contains(word)
    }
}

impl Lexicon for AHashSet<String> {
    fn contains_word(&self, word: &str) -> bool {
        self.contains(&word.to_lowercase())
    }
}

impl<L: Lexicon + ?Sized> Lexicon for Arc<L> {
    fn contains_word(&self, word: &str) -> bool {
        (**self).contains_word(word)
    }
}

/// Map the apostrophe variants used in Ukrainian text to `'`.
pub fn normalize_apostrophes(word: &str) -> String {
    word.chars()
        .map(|c| match c {
            '’' | 'ʼ' | '`' | '‘' | '′' => '\'',
            other => other,
        })
        .collect()
}

fn is_cyrillic(c: char) -> bool {
    matches!(c, '\u{0400}'..='\u{052F}' | '\u{2DE0}'..='\u{2DFF}' | '\u{A640}'..='\u{A69F}')
}

/// Flags word tokens that are not in the lexicon.
pub struct LexiconDetector<L: Lexicon> {
    lexicon: L,
    tokenizer: Box<dyn Tokenizer>,
    settings: DetectionSettings,
}

impl<L: Lexicon> LexiconDetector<L> {
    /// Create a detector with default settings.
    pub fn new(lexicon: L) -> Self {
        LexiconDetector {
            lexicon,
            tokenizer: Box::new(UnicodeWordTokenizer::new()),
            settings: DetectionSettings::default(),
        }
    }

    /// Replace the detection settings.
    pub fn with_settings(mut self, settings: DetectionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the tokenizer.
    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    fn is_known(&self, word: &str) -> bool {
        if self.lexicon.contains_word(word) {
            return true;
        }
        let normalized = normalize_apostrophes(word);
        normalized != word && self.lexicon.contains_word(&normalized)
    }

    fn is_candidate(&self, word: &str) -> bool {
        if !word.chars().any(char::is_alphabetic) {
            return false;
        }
        if self.settings.cyrillic_only && !word.chars().any(is_cyrillic) {
            return false;
        }
        word.chars().count() >= self.settings.min_token_length
    }
}

impl<L: Lexicon> ErrorDetector for LexiconDetector<L> {
    fn detect(&self, text: &str) -> Result<Vec<ErrorSpan>> {
        Ok(self
            .tokenizer
            .tokenize(text)?
            .filter(|t| self.is_candidate(&t.text) && !self.is_known(&t.text))
            .map(|t| ErrorSpan::new(t.start_offset, t.end_offset, SPELLING_LABEL))
            .collect())
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}
