//! Symmetric delete spelling correction.
//!
//! The index itself is the `symspell` crate. This wrapper keeps the term
//! counts the corrector and the detector query, validates lookup distances
//! before they reach the engine, and restores the letter case of the input
//! on the returned terms.

use std::fmt;
use std::path::Path;

use ::symspell::{SymSpellBuilder, UnicodeStringStrategy};
use ahash::AHashMap;
use log::info;

use crate::error::{Result, SpeliukError};
use crate::spelling::dictionary::SpellingDictionary;
use crate::spelling::suggest::{Suggestion, Verbosity};

/// Default maximum edit distance the index is built for.
pub const DEFAULT_MAX_EDIT_DISTANCE: usize = 2;
/// Default length of the prefix deletes are generated from.
pub const DEFAULT_PREFIX_LENGTH: usize = 7;
/// Default minimum count for a term to be suggested.
pub const DEFAULT_COUNT_THRESHOLD: u64 = 1;

/// A symmetric delete index over a frequency dictionary.
pub struct SymSpell {
    engine: ::symspell::SymSpell<UnicodeStringStrategy>,
    max_dictionary_edit_distance: usize,
    prefix_length: usize,
    count_threshold: u64,
    words: AHashMap<String, u64>,
}

impl fmt::Debug for SymSpell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymSpell")
            .field("max_dictionary_edit_distance", &self.max_dictionary_edit_distance)
            .field("prefix_length", &self.prefix_length)
            .field("count_threshold", &self.count_threshold)
            .field("words", &self.words.len())
            .finish()
    }
}

impl SymSpell {
    /// Create an empty index.
    ///
    /// `prefix_length` must be greater than `max_dictionary_edit_distance`.
    pub fn new(
        max_dictionary_edit_distance: usize,
        prefix_length: usize,
        count_threshold: u64,
    ) -> Result<Self> {
        if prefix_length == 0 || prefix_length <= max_dictionary_edit_distance {
            return Err(SpeliukError::invalid_argument(format!(
                "prefix_length ({prefix_length}) must be greater than max_dictionary_edit_distance ({max_dictionary_edit_distance})"
            )));
        }

        let engine: ::symspell::SymSpell<UnicodeStringStrategy> = SymSpellBuilder::default()
            .max_dictionary_edit_distance(max_dictionary_edit_distance as i64)
            .prefix_length(prefix_length as i64)
            .count_threshold(count_threshold.min(i64::MAX as u64) as i64)
            .build()
            .map_err(|e| SpeliukError::dictionary(format!("Failed to build SymSpell: {e}")))?;

        Ok(SymSpell {
            engine,
            max_dictionary_edit_distance,
            prefix_length,
            count_threshold,
            words: AHashMap::new(),
        })
    }

    /// Build an index from every entry of a dictionary.
    pub fn from_dictionary(
        dictionary: &SpellingDictionary,
        max_dictionary_edit_distance: usize,
        prefix_length: usize,
        count_threshold: u64,
    ) -> Result<Self> {
        let mut symspell = Self::new(max_dictionary_edit_distance, prefix_length, count_threshold)?;
        for (term, count) in dictionary.iter() {
            symspell.create_dictionary_entry(term, count);
        }
        Ok(symspell)
    }

    /// Load a `term count` frequency file into the index.
    ///
    /// Returns the number of terms indexed after the load.
    pub fn load_dictionary<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let dictionary = SpellingDictionary::load_from_frequency_file(path.as_ref())?;
        for (term, count) in dictionary.iter() {
            self.create_dictionary_entry(term, count);
        }

        info!(
            "Indexed {} dictionary terms from {}",
            self.words.len(),
            path.as_ref().display()
        );
        Ok(self.words.len())
    }

    /// Add a term or increase the count of an existing one.
    ///
    /// Returns `true` if the term was newly indexed. Terms below the count
    /// threshold are ignored.
    pub fn create_dictionary_entry(&mut self, term: &str, count: u64) -> bool {
        if count < self.count_threshold {
            return false;
        }

        let term = term.to_lowercase();
        if term.is_empty() || term.contains('\t') {
            return false;
        }

        let count = count.min(i64::MAX as u64);
        self.engine
            .load_dictionary_line(&format!("{term}\t{count}"), 0, 1, "\t");

        match self.words.get_mut(&term) {
            Some(existing) => {
                *existing = existing.saturating_add(count).min(i64::MAX as u64);
                false
            }
            None => {
                self.words.insert(term, count);
                true
            }
        }
    }

    /// Number of indexed terms.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Check if a term is indexed.
    pub fn contains(&self, term: &str) -> bool {
        self.words.contains_key(&term.to_lowercase())
    }

    /// Dictionary count of a term, zero when absent.
    pub fn frequency(&self, term: &str) -> u64 {
        self.words.get(&term.to_lowercase()).copied().unwrap_or(0)
    }

    /// The maximum edit distance the index supports.
    pub fn max_dictionary_edit_distance(&self) -> usize {
        self.max_dictionary_edit_distance
    }

    /// The length of the prefix deletes are generated from.
    pub fn prefix_length(&self) -> usize {
        self.prefix_length
    }

    /// Find dictionary terms within `max_edit_distance` of `input`.
    ///
    /// Results are sorted by distance, then by descending count. With
    /// `transfer_casing` the input is lower-cased for the lookup and its
    /// letter case is copied onto every returned term.
    pub fn lookup(
        &self,
        input: &str,
        verbosity: Verbosity,
        max_edit_distance: usize,
        transfer_casing: bool,
    ) -> Result<Vec<Suggestion>> {
        if max_edit_distance > self.max_dictionary_edit_distance {
            return Err(SpeliukError::dictionary(format!(
                "max_edit_distance {max_edit_distance} exceeds the dictionary edit distance {}",
                self.max_dictionary_edit_distance
            )));
        }
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let lowered;
        let query = if transfer_casing {
            lowered = input.to_lowercase();
            lowered.as_str()
        } else {
            input
        };

        let verbosity = match verbosity {
            Verbosity::Top => ::symspell::Verbosity::Top,
            Verbosity::Closest => ::symspell::Verbosity::Closest,
            Verbosity::All => ::symspell::Verbosity::All,
        };

        let mut suggestions: Vec<Suggestion> = self
            .engine
            .lookup(query, verbosity, max_edit_distance as i64)
            .into_iter()
            .map(|s| {
                let count = self.words.get(&s.term).copied().unwrap_or(s.count as u64);
                Suggestion::new(s.term, s.distance as usize, count)
            })
            .collect();

        if suggestions.len() > 1 {
            suggestions.sort();
        }
        if transfer_casing {
            for suggestion in &mut suggestions {
                suggestion.term = transfer_case(input, &suggestion.term);
            }
        }

        Ok(suggestions)
    }
}

/// Copy the letter case of `source` onto `target` character by character.
///
/// Characters of `target` beyond the end of `source` take the case of the
/// last cased character of `source`.
pub fn transfer_case(source: &str, target: &str) -> String {
    let mut result = String::with_capacity(target.len());
    let mut source_chars = source.chars();
    let mut last_upper = false;

    for t in target.chars() {
        let upper = match source_chars.next() {
            Some(s) if s.is_uppercase() => {
                last_upper = true;
                true
            }
            Some(s) if s.is_lowercase() => {
                last_upper = false;
                false
            }
            Some(_) => false,
            None => last_upper,
        };

        if upper {
            result.extend(t.to_uppercase());
        } else {
            result.push(t);
        }
    }

    result
}
