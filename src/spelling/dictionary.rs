//! Frequency dictionary for spelling correction.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use ahash::AHashMap;
use log::debug;

use crate::error::{Result, SpeliukError};

/// A dictionary that stores lower-cased words and their corpus counts.
#[derive(Debug, Clone, Default)]
pub struct SpellingDictionary {
    /// Words and their frequencies
    words: AHashMap<String, u64>,
    /// Total word count for probability calculations
    total_count: u64,
}

impl SpellingDictionary {
    /// Create a new empty dictionary.
    pub fn new() -> Self {
        SpellingDictionary {
            words: AHashMap::new(),
            total_count: 0,
        }
    }

    /// Add a word to the dictionary with the given frequency.
    ///
    /// An existing entry is overwritten.
    pub fn add_word(&mut self, word: &str, frequency: u64) {
        let normalized = word.to_lowercase();
        let old_freq = self.words.insert(normalized, frequency).unwrap_or(0);
        self.total_count = self.total_count - old_freq + frequency;
    }

    /// Increment the frequency of a word by 1.
    pub fn increment_word(&mut self, word: &str) {
        let current = self.frequency(word);
        self.add_word(word, current + 1);
    }

    /// Check if a word exists in the dictionary.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(&word.to_lowercase())
    }

    /// Get the frequency of a word.
    pub fn frequency(&self, word: &str) -> u64 {
        self.words.get(&word.to_lowercase()).copied().unwrap_or(0)
    }

    /// Get the probability of a word (frequency / total_count).
    pub fn probability(&self, word: &str) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        self.frequency(word) as f64 / self.total_count as f64
    }

    /// Iterate over all words and their frequencies.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.words.iter().map(|(w, f)| (w.as_str(), *f))
    }

    /// Get the total number of unique words.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Get the total frequency count.
    pub fn total_frequency(&self) -> u64 {
        self.total_count
    }

    /// Load a word list with one word per line.
    ///
    /// Repeated words increase the frequency, blank lines and lines starting
    /// with `#` are ignored.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut dictionary = SpellingDictionary::new();
        let reader = BufReader::new(File::open(path.as_ref())?);

        for line in reader.lines() {
            let line = line?;
            let word = line.trim();
            if !word.is_empty() && !word.starts_with('#') {
                dictionary.increment_word(word);
            }
        }

        debug!(
            "Loaded {} words from {}",
            dictionary.word_count(),
            path.as_ref().display()
        );
        Ok(dictionary)
    }

    /// Load a frequency file with a `term count` pair per line.
    ///
    /// Counts of duplicated terms are summed. Lines that do not end with a
    /// valid count are rejected with their line number.
    pub fn load_from_frequency_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let mut dictionary = SpellingDictionary::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (term, count) = line
                .rsplit_once(char::is_whitespace)
                .map(|(t, c)| (t.trim(), c))
                .ok_or_else(|| {
                    SpeliukError::dictionary(format!(
                        "Line {}: expected 'term count', got '{line}'",
                        line_no + 1
                    ))
                })?;
            let count: u64 = count.parse().map_err(|_| {
                SpeliukError::dictionary(format!("Line {}: invalid count '{count}'", line_no + 1))
            })?;

            let current = dictionary.frequency(term);
            dictionary.add_word(term, current + count);
        }

        debug!(
            "Loaded {} terms from {}",
            dictionary.word_count(),
            path.as_ref().display()
        );
        Ok(dictionary)
    }

    /// Create a dictionary by counting the words of a corpus.
    pub fn from_corpus(text: &str) -> Self {
        let mut dictionary = SpellingDictionary::new();

        let words = text
            .split(|c: char| !(c.is_alphabetic() || c == '\'' || c == '’'))
            .map(|w| w.trim_matches(|c| c == '\'' || c == '’'))
            .filter(|w| !w.is_empty());

        for word in words {
            dictionary.increment_word(word);
        }

        dictionary
    }

    /// Get the most frequent words in the dictionary.
    pub fn most_frequent_words(&self, limit: usize) -> Vec<(String, u64)> {
        let mut word_freq: Vec<(String, u64)> = self
            .words
            .iter()
            .map(|(word, freq)| (word.clone(), *freq))
            .collect();

        word_freq.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        word_freq.truncate(limit);
        word_freq
    }

    /// Merge another dictionary into this one.
    pub fn merge(&mut self, other: &SpellingDictionary) {
        for (word, frequency) in &other.words {
            let current = self.frequency(word);
            self.add_word(word, current + frequency);
        }
    }

    /// Remove words with frequency below the threshold.
    pub fn prune_low_frequency(&mut self, min_frequency: u64) {
        let mut removed = 0;
        self.words.retain(|_, freq| {
            let keep = *freq >= min_frequency;
            if !keep {
                removed += *freq;
            }
            keep
        });
        self.total_count -= removed;
    }

    /// Save dictionary as a frequency file, most frequent words first.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);

        for (word, frequency) in self.most_frequent_words(self.words.len()) {
            writeln!(writer, "{word} {frequency}")?;
        }
        writer.flush()?;

        Ok(())
    }
}
