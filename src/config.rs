//! Configuration for the correction pipeline.
//!
//! A [`SpeliukConfig`] names the model artifacts to load and carries the
//! tunable settings of every stage. It is stored as JSON; missing fields take
//! their default values.
//!
//! # Examples
//!
//! ```
//! use speliuk::config::SpeliukConfig;
//!
//! let config: SpeliukConfig = serde_json::from_str(r#"{
//!     "model_dir": "/opt/speliuk",
//!     "correction": { "window": 3 }
//! }"#).unwrap();
//!
//! assert_eq!(config.correction.window, 3);
//! assert_eq!(config.correction.max_candidates, 5);
//! assert!(config.symspell_path().ends_with("symspell_uk.txt"));
//! ```

use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpeliukError};

/// Environment variable consulted when `model_dir` is not set.
pub const MODEL_DIR_ENV: &str = "SPELIUK_MODEL_DIR";

/// Default file name of the symmetric delete frequency dictionary.
pub const DEFAULT_SYMSPELL_DICTIONARY: &str = "symspell_uk.txt";

/// Default file name of the n-gram language model.
pub const DEFAULT_LANGUAGE_MODEL: &str = "kenlm_ubertext.arpa";

/// Settings of the correction stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionSettings {
    /// Number of context tokens taken on each side of an error.
    pub window: usize,
    /// Maximum edit distance of candidate corrections.
    pub max_edit_distance: usize,
    /// Maximum number of dictionary candidates per error.
    pub max_candidates: usize,
    /// Prefix length of the symmetric delete index.
    pub prefix_length: usize,
    /// Minimum dictionary count for a term to be suggested.
    pub count_threshold: u64,
    /// Annotate errors whose best correction is the original token.
    pub report_unchanged: bool,
    /// Leave words the morphological lexicon knows as names untouched.
    pub suppress_person_names: bool,
    /// Score candidates with a sentence start marker.
    pub bos: bool,
    /// Score candidates with a sentence end marker.
    pub eos: bool,
}

impl Default for CorrectionSettings {
    fn default() -> Self {
        CorrectionSettings {
            window: 5,
            max_edit_distance: 2,
            max_candidates: 5,
            prefix_length: 7,
            count_threshold: 1,
            report_unchanged: false,
            suppress_person_names: true,
            bos: true,
            eos: true,
        }
    }
}

/// Settings of the lexicon error detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Only flag tokens containing Cyrillic letters.
    pub cyrillic_only: bool,
    /// Minimum token length in characters.
    pub min_token_length: usize,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        DetectionSettings {
            cyrillic_only: true,
            min_token_length: 1,
        }
    }
}

/// Artifact locations and settings of a [`Speliuk`](crate::corrector::Speliuk) corrector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeliukConfig {
    /// Directory relative artifact paths are resolved against.
    pub model_dir: Option<PathBuf>,
    /// Frequency dictionary with `term count` lines.
    pub symspell_dictionary: PathBuf,
    /// ARPA or compiled binary n-gram model.
    pub language_model: PathBuf,
    /// Gazetteer with `entity<TAB>LABEL` lines.
    pub entity_gazetteer: Option<PathBuf>,
    /// Morphological lexicon with `word<TAB>GRAMMEMES` lines.
    pub morph_lexicon: Option<PathBuf>,
    /// Word list for error detection. The frequency dictionary is used when unset.
    pub known_words: Option<PathBuf>,
    pub correction: CorrectionSettings,
    pub detection: DetectionSettings,
}

impl Default for SpeliukConfig {
    fn default() -> Self {
        SpeliukConfig {
            model_dir: None,
            symspell_dictionary: PathBuf::from(DEFAULT_SYMSPELL_DICTIONARY),
            language_model: PathBuf::from(DEFAULT_LANGUAGE_MODEL),
            entity_gazetteer: None,
            morph_lexicon: None,
            known_words: None,
            correction: CorrectionSettings::default(),
            detection: DetectionSettings::default(),
        }
    }
}

impl SpeliukConfig {
    /// Read a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            SpeliukError::config(format!(
                "Failed to open config {}: {e}",
                path.as_ref().display()
            ))
        })?;
        let config: SpeliukConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Check that the settings are consistent.
    pub fn validate(&self) -> Result<()> {
        let c = &self.correction;
        if c.max_candidates == 0 {
            return Err(SpeliukError::config("max_candidates must be at least 1"));
        }
        if c.prefix_length <= c.max_edit_distance {
            return Err(SpeliukError::config(format!(
                "prefix_length ({}) must be greater than max_edit_distance ({})",
                c.prefix_length, c.max_edit_distance
            )));
        }
        if self.detection.min_token_length == 0 {
            return Err(SpeliukError::config("min_token_length must be at least 1"));
        }
        Ok(())
    }

    /// The directory relative artifact paths are resolved against.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.model_dir
            .clone()
            .or_else(|| env::var_os(MODEL_DIR_ENV).map(PathBuf::from))
    }

    /// Resolve an artifact path against the model directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match self.base_dir() {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Resolved path of the frequency dictionary.
    pub fn symspell_path(&self) -> PathBuf {
        self.resolve(&self.symspell_dictionary)
    }

    /// Resolved path of the language model.
    pub fn language_model_path(&self) -> PathBuf {
        self.resolve(&self.language_model)
    }

    /// Resolved path of the gazetteer, if configured.
    pub fn gazetteer_path(&self) -> Option<PathBuf> {
        self.entity_gazetteer.as_deref().map(|p| self.resolve(p))
    }

    /// Resolved path of the morphological lexicon, if configured.
    pub fn morph_lexicon_path(&self) -> Option<PathBuf> {
        self.morph_lexicon.as_deref().map(|p| self.resolve(p))
    }

    /// Resolved path of the detection word list, if configured.
    pub fn known_words_path(&self) -> Option<PathBuf> {
        self.known_words.as_deref().map(|p| self.resolve(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SpeliukConfig::default();
        assert_eq!(config.correction.window, 5);
        assert_eq!(config.correction.max_edit_distance, 2);
        assert_eq!(config.correction.max_candidates, 5);
        assert!(!config.correction.report_unchanged);
        assert!(config.correction.bos && config.correction.eos);
        assert!(config.detection.cyrillic_only);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_against_model_dir() {
        let config = SpeliukConfig {
            model_dir: Some(PathBuf::from("/models")),
            entity_gazetteer: Some(PathBuf::from("ner.tsv")),
            known_words: Some(PathBuf::from("/abs/words.txt")),
            ..Default::default()
        };

        assert_eq!(config.symspell_path(), PathBuf::from("/models/symspell_uk.txt"));
        assert_eq!(
            config.language_model_path(),
            PathBuf::from("/models/kenlm_ubertext.arpa")
        );
        assert_eq!(config.gazetteer_path(), Some(PathBuf::from("/models/ner.tsv")));
        assert_eq!(config.known_words_path(), Some(PathBuf::from("/abs/words.txt")));
        assert_eq!(config.morph_lexicon_path(), None);
    }

    #[test]
    fn test_validate_rejects_inconsistent_settings() {
        let mut config = SpeliukConfig::default();
        config.correction.prefix_length = 2;
        assert!(config.validate().is_err());

        let mut config = SpeliukConfig::default();
        config.correction.max_candidates = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("speliuk.json");

        let mut config = SpeliukConfig::default();
        config.model_dir = Some(temp_dir.path().to_path_buf());
        config.correction.report_unchanged = true;
        config.save(&path).unwrap();

        let loaded = SpeliukConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SpeliukConfig =
            serde_json::from_str(r#"{"detection": {"min_token_length": 3}}"#).unwrap();
        assert_eq!(config.detection.min_token_length, 3);
        assert!(config.detection.cyrillic_only);
        assert_eq!(config.language_model, PathBuf::from(DEFAULT_LANGUAGE_MODEL));
    }
}
