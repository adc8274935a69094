//! Morphological lexicon lookups.
//!
//! The lexicon lists one parse per line as `word<TAB>GRAMMEME,GRAMMEME,...`
//! using OpenCorpora style grammemes (`NOUN`, `anim`, `Name`, `Surn`, ...).
//! A word may appear on several lines when it has several parses.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::AHashMap;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpeliukError};

/// Grammemes marking first names, patronymics and surnames.
pub const PERSON_GRAMMEMES: [&str; 3] = ["Name", "Patr", "Surn"];

/// One morphological reading of a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parse {
    pub word: String,
    pub grammemes: Vec<String>,
}

impl Parse {
    /// Check if the parse carries a grammeme.
    pub fn has(&self, grammeme: &str) -> bool {
        self.grammemes.iter().any(|g| g == grammeme)
    }
}

/// Check whether a parse is a person name.
pub fn is_person(parse: &Parse) -> bool {
    PERSON_GRAMMEMES.iter().any(|g| parse.has(g))
}

/// A lexicon of word parses keyed by lower-cased word.
#[derive(Debug, Clone, Default)]
pub struct MorphAnalyzer {
    lexicon: AHashMap<String, Vec<Vec<String>>>,
}

impl MorphAnalyzer {
    /// Create an empty analyzer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parse for a word.
    pub fn add(&mut self, word: &str, grammemes: &[&str]) {
        self.lexicon
            .entry(word.to_lowercase())
            .or_default()
            .push(grammemes.iter().map(|g| g.to_string()).collect());
    }

    /// Load a lexicon file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let mut analyzer = Self::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let (word, tags) = line.split_once('\t').ok_or_else(|| {
                SpeliukError::analysis(format!(
                    "Line {}: expected 'word<TAB>GRAMMEMES' in lexicon",
                    line_no + 1
                ))
            })?;
            let grammemes: Vec<&str> = tags
                .split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .collect();
            analyzer.add(word.trim(), &grammemes);
        }

        info!(
            "Loaded morphological lexicon with {} words from {}",
            analyzer.len(),
            path.as_ref().display()
        );
        Ok(analyzer)
    }

    /// All parses of a word, empty when the word is unknown.
    pub fn parse(&self, word: &str) -> Vec<Parse> {
        let normalized = word.to_lowercase();
        self.lexicon
            .get(&normalized)
            .map(|parses| {
                parses
                    .iter()
                    .map(|grammemes| Parse {
                        word: normalized.clone(),
                        grammemes: grammemes.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check whether any parse of the word is a person name.
    pub fn is_person_name(&self, word: &str) -> bool {
        self.parse(word).iter().any(is_person)
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.lexicon.len()
    }

    /// Check if the lexicon is empty.
    pub fn is_empty(&self) -> bool {
        self.lexicon.is_empty()
    }
}
