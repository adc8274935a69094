//! Gazetteer based entity recognition.
//!
//! A gazetteer file lists one entity per line as `entity<TAB>LABEL`, for
//! example `Тарас Шевченко\tPER`. Entities are matched on whole tokens,
//! longest match first.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::AHashMap;
use log::info;

use crate::analysis::document::Doc;
use crate::analysis::tokenizer::UnicodeWordTokenizer;
use crate::error::{Result, SpeliukError};
use crate::ner::{EntityRecognizer, EntitySpan};

/// Recognizes entities listed in a gazetteer.
#[derive(Debug, Clone, Default)]
pub struct GazetteerRecognizer {
    entries: AHashMap<Vec<String>, String>,
    max_tokens: usize,
}

impl GazetteerRecognizer {
    /// Create an empty gazetteer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity with its label.
    pub fn add(&mut self, entity: &str, label: &str) {
        let tokens: Vec<String> = UnicodeWordTokenizer::new()
            .tokens(entity)
            .into_iter()
            .map(|t| t.text)
            .collect();
        if tokens.is_empty() {
            return;
        }

        self.max_tokens = self.max_tokens.max(tokens.len());
        self.entries.insert(tokens, label.to_string());
    }

    /// Load a gazetteer file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let mut gazetteer = Self::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let (entity, label) = line.split_once('\t').ok_or_else(|| {
                SpeliukError::analysis(format!(
                    "Line {}: expected 'entity<TAB>LABEL' in gazetteer",
                    line_no + 1
                ))
            })?;
            gazetteer.add(entity.trim(), label.trim());
        }

        info!(
            "Loaded {} gazetteer entries from {}",
            gazetteer.len(),
            path.as_ref().display()
        );
        Ok(gazetteer)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the gazetteer is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EntityRecognizer for GazetteerRecognizer {
    fn recognize(&self, doc: &Doc) -> Result<Vec<EntitySpan>> {
        let texts: Vec<&str> = doc.tokens().iter().map(|t| t.text.as_str()).collect();
        let mut entities = Vec::new();
        let mut key: Vec<String> = Vec::with_capacity(self.max_tokens);
        let mut i = 0;

        while i < texts.len() {
            let longest = self.max_tokens.min(texts.len() - i);
            let matched = (1..=longest).rev().find_map(|len| {
                key.clear();
                key.extend(texts[i..i + len].iter().map(|s| s.to_string()));
                self.entries.get(&key).map(|label| (len, label))
            });

            match matched {
                Some((len, label)) => {
                    entities.push(EntitySpan {
                        start: i,
                        end: i + len,
                        label: label.clone(),
                    });
                    i += len;
                }
                None => i += 1,
            }
        }

        Ok(entities)
    }

    fn name(&self) -> &'static str {
        "gazetteer"
    }
}
