//! Spelling candidate generation for Speliuk.
//!
//! This module provides the frequency dictionary, the edit distance functions
//! and the symmetric delete index the corrector draws candidate corrections
//! from.

pub mod dictionary;
pub mod levenshtein;
pub mod suggest;
pub mod symspell;

pub use dictionary::SpellingDictionary;
pub use suggest::{Suggestion, Verbosity};
pub use self::symspell::SymSpell;
