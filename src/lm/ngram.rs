//! Backoff n-gram language model.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use ahash::AHashMap;
use log::{debug, info};
use memmap2::MmapOptions;
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::WhitespaceTokenizer;
use crate::error::{Result, SpeliukError};
use crate::lm::arpa;

/// Sentence start marker.
pub const BOS: &str = "<s>";
/// Sentence end marker.
pub const EOS: &str = "</s>";
/// Unknown word marker.
pub const UNK: &str = "<unk>";

/// Log10 probability assigned to unknown words when the model has no `<unk>`.
pub const UNKNOWN_LOGPROB: f32 = -100.0;

/// Leading bytes of the compiled binary format.
pub const BINARY_MAGIC: &[u8; 8] = b"SPLKLM01";

/// Id used for words absent from the vocabulary of a model without `<unk>`.
const OOV_ID: u32 = u32::MAX;

/// Log probability and backoff weight of one n-gram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NgramWeights {
    pub logprob: f32,
    pub backoff: f32,
}

/// Score of a single word within a sentence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WordScore {
    /// Log10 probability of the word given its context.
    pub logprob: f64,
    /// Length of the longest n-gram that matched.
    pub ngram_length: usize,
    /// Whether the word is out of vocabulary.
    pub oov: bool,
}

/// A Katz backoff n-gram model with log10 weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NgramModel {
    order: usize,
    vocab: AHashMap<String, u32>,
    /// `ngrams[n - 1]` holds every n-gram of length `n`.
    ngrams: Vec<AHashMap<Box<[u32]>, NgramWeights>>,
}

impl NgramModel {
    /// Create an empty model of the given order.
    pub fn new(order: usize) -> Result<Self> {
        if order == 0 {
            return Err(SpeliukError::language_model("Model order must be at least 1"));
        }
        Ok(NgramModel {
            order,
            vocab: AHashMap::new(),
            ngrams: vec![AHashMap::new(); order],
        })
    }

    /// Intern a word and return its id.
    pub fn word_id(&mut self, word: &str) -> u32 {
        let next = self.vocab.len() as u32;
        *self.vocab.entry(word.to_string()).or_insert(next)
    }

    /// Add an n-gram with its weights.
    pub fn insert(&mut self, words: &[&str], logprob: f32, backoff: f32) -> Result<()> {
        if words.is_empty() || words.len() > self.order {
            return Err(SpeliukError::language_model(format!(
                "Cannot add a {}-gram to a model of order {}",
                words.len(),
                self.order
            )));
        }

        let ids: Box<[u32]> = words.iter().map(|w| self.word_id(w)).collect();
        self.ngrams[words.len() - 1].insert(ids, NgramWeights { logprob, backoff });
        Ok(())
    }

    /// The model order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of distinct words.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Number of n-grams of each length, starting with unigrams.
    pub fn counts(&self) -> Vec<usize> {
        self.ngrams.iter().map(|n| n.len()).collect()
    }

    /// Check if a word is a unigram of the model.
    pub fn contains(&self, word: &str) -> bool {
        self.vocab
            .get(word)
            .is_some_and(|id| self.ngrams[0].contains_key([*id].as_slice()))
    }

    /// Load a model from an ARPA file or the compiled binary format.
    ///
    /// The format is detected from the first bytes of the file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| {
            SpeliukError::language_model(format!("Failed to open {}: {e}", path.display()))
        })?;

        let mut magic = [0u8; 8];
        let is_binary = match file.read_exact(&mut magic) {
            Ok(()) => &magic == BINARY_MAGIC,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => false,
            Err(e) => return Err(e.into()),
        };

        let model = if is_binary {
            Self::load_binary(&file)?
        } else {
            let file = File::open(path)?;
            arpa::read_arpa(BufReader::new(file))?
        };

        info!(
            "Loaded {}-gram model with {} words from {}",
            model.order,
            model.vocab.len(),
            path.display()
        );
        Ok(model)
    }

    fn load_binary(file: &File) -> Result<Self> {
        let mmap = unsafe {
            MmapOptions::new().map(file).map_err(|e| {
                SpeliukError::language_model(format!("Failed to mmap model file: {e}"))
            })?
        };

        let model: NgramModel = bincode::deserialize(&mmap[BINARY_MAGIC.len()..])?;
        if model.ngrams.len() != model.order {
            return Err(SpeliukError::language_model(
                "Corrupted binary model: order does not match n-gram tables",
            ));
        }
        Ok(model)
    }

    /// Write the model in the compiled binary format.
    pub fn save_binary<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        writer.write_all(BINARY_MAGIC)?;
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;

        debug!("Wrote binary model to {}", path.as_ref().display());
        Ok(())
    }

    /// Total log10 probability of a whitespace-separated sentence.
    pub fn score(&self, sentence: &str, bos: bool, eos: bool) -> f64 {
        self.full_scores(sentence, bos, eos)
            .iter()
            .map(|s| s.logprob)
            .sum()
    }

    /// Per-word scores, including the sentence end marker when `eos` is set.
    pub fn full_scores(&self, sentence: &str, bos: bool, eos: bool) -> Vec<WordScore> {
        let unk = self.vocab.get(UNK).copied();
        let mut words: Vec<(u32, bool)> = WhitespaceTokenizer::new()
            .tokens(sentence)
            .iter()
            .map(|t| match self.vocab.get(t.text.as_str()) {
                Some(id) => (*id, false),
                None => (unk.unwrap_or(OOV_ID), true),
            })
            .collect();
        if eos {
            let id = self.vocab.get(EOS).copied().unwrap_or(OOV_ID);
            words.push((id, false));
        }

        let mut context: Vec<u32> = Vec::with_capacity(self.order);
        if bos && let Some(id) = self.vocab.get(BOS) {
            context.push(*id);
        }

        let mut scores = Vec::with_capacity(words.len());
        for (id, oov) in words {
            let (logprob, ngram_length) = self.word_logprob(&context, id);
            scores.push(WordScore {
                logprob,
                ngram_length,
                oov,
            });

            context.push(id);
            if context.len() >= self.order {
                context.remove(0);
            }
        }

        scores
    }

    /// Perplexity of a sentence scored with both sentence markers.
    pub fn perplexity(&self, sentence: &str) -> f64 {
        let words = WhitespaceTokenizer::new().tokens(sentence).len() + 1;
        10f64.powf(-self.score(sentence, true, true) / words as f64)
    }

    /// Log10 probability of `word` after `context`, with the matched length.
    fn word_logprob(&self, context: &[u32], word: u32) -> (f64, usize) {
        let mut backoff = 0.0f64;
        let mut key: Vec<u32> = Vec::with_capacity(context.len() + 1);

        for start in 0..=context.len() {
            let history = &context[start..];
            let n = history.len() + 1;
            if n > self.order {
                continue;
            }

            key.clear();
            key.extend_from_slice(history);
            key.push(word);

            if let Some(weights) = self.ngrams[n - 1].get(key.as_slice()) {
                return (backoff + weights.logprob as f64, n);
            }

            if !history.is_empty()
                && let Some(weights) = self.ngrams[history.len() - 1].get(history)
            {
                backoff += weights.backoff as f64;
            }
        }

        (backoff + UNKNOWN_LOGPROB as f64, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn bigram_model() -> NgramModel {
        let mut model = NgramModel::new(2).unwrap();
        model.insert(&["<s>"], -99.0, -0.5).unwrap();
        model.insert(&["</s>"], -1.0, 0.0).unwrap();
        model.insert(&["<unk>"], -3.0, 0.0).unwrap();
        model.insert(&["я"], -1.2, -0.4).unwrap();
        model.insert(&["живу"], -2.0, -0.3).unwrap();
        model.insert(&["<s>", "я"], -0.5, 0.0).unwrap();
        model.insert(&["я", "живу"], -0.7, 0.0).unwrap();
        model
    }

    #[test]
    fn test_full_scores_with_backoff() {
        let model = bigram_model();
        let scores = model.full_scores("я живу", true, true);

        assert_eq!(scores.len(), 3);
        assert!((scores[0].logprob - -0.5).abs() < 1e-6);
        assert_eq!(scores[0].ngram_length, 2);
        assert!((scores[1].logprob - -0.7).abs() < 1e-6);
        // "живу </s>" is not a bigram: bo(живу) + p(</s>)
        assert!((scores[2].logprob - (-0.3 + -1.0)).abs() < 1e-6);
        assert_eq!(scores[2].ngram_length, 1);
    }

    #[test]
    fn test_unknown_words() {
        let model = bigram_model();
        let scores = model.full_scores("я жеву", false, false);

        assert!(scores[1].oov);
        assert!((scores[1].logprob - (-0.4 + -3.0)).abs() < 1e-6);

        let mut no_unk = NgramModel::new(1).unwrap();
        no_unk.insert(&["я"], -1.0, 0.0).unwrap();
        let score = no_unk.score("ти", false, false);
        assert!((score - -100.0).abs() < 1e-6);
    }

    #[test]
    fn test_bos_changes_score() {
        let model = bigram_model();
        let with_bos = model.score("я", true, false);
        let without_bos = model.score("я", false, false);

        assert!((with_bos - -0.5).abs() < 1e-6);
        assert!((without_bos - -1.2).abs() < 1e-6);
    }

    #[test]
    fn test_perplexity() {
        let model = bigram_model();
        let expected = 10f64.powf(-(-0.5 + -0.7 + -1.3) / 3.0);
        assert!((model.perplexity("я живу") - expected).abs() < 1e-6);
    }

    #[test]
    fn test_binary_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("model.bin");

        let model = bigram_model();
        model.save_binary(&path).unwrap();

        let loaded = NgramModel::load(&path).unwrap();
        assert_eq!(loaded.order(), 2);
        assert_eq!(loaded.counts(), model.counts());
        assert!(
            (loaded.score("я живу", true, true) - model.score("я живу", true, true)).abs() < 1e-9
        );
    }

    #[test]
    fn test_insert_rejects_long_ngrams() {
        let mut model = NgramModel::new(1).unwrap();
        assert!(model.insert(&["а", "б"], -1.0, 0.0).is_err());
        assert!(NgramModel::new(0).is_err());
    }
}
