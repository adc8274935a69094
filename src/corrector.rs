//! The spelling correction pipeline.
//!
//! Correcting a text runs these stages:
//!
//! 1. tokenize the text into a [`Doc`] and label entities,
//! 2. detect error spans and align them with whole tokens,
//! 3. drop spans that should not be edited (numbers, names),
//! 4. look up close dictionary terms for each remaining span,
//! 5. score each candidate in its context with the language model,
//! 6. record the best candidate as an annotation.

pub mod pipe;

use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::document::{Doc, Span};
use crate::analysis::tokenizer::{Tokenizer, UnicodeWordTokenizer};
use crate::annotated::{AnnotatedText, Annotation, spelling_meta};
use crate::config::{CorrectionSettings, SpeliukConfig};
use crate::detection::{ErrorDetector, LexiconDetector};
use crate::error::{Result, SpeliukError};
use crate::lm::NgramModel;
use crate::morph::MorphAnalyzer;
use crate::ner::{EntityRecognizer, GazetteerRecognizer};
use crate::spelling::{SpellingDictionary, SymSpell, Verbosity};

pub use pipe::CorrectionPipe;

/// Placeholder for the corrected word in a masked context.
pub const MASK: &str = "<mask>";

/// Name of the span group holding detected errors.
pub const ERROR_SPANS_KEY: &str = "speliuk_errors";

/// The result of correcting a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub corrected_text: String,
    pub annotations: Vec<Annotation>,
}

/// Words around an error, without the error itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedContext {
    pub left: String,
    pub right: String,
}

impl MaskedContext {
    /// Put a candidate in place of the mask.
    pub fn fill(&self, candidate: &str) -> String {
        format!("{} {candidate} {}", self.left, self.right)
    }
}

impl std::fmt::Display for MaskedContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {MASK} {}", self.left, self.right)
    }
}

/// A spelling corrector for Ukrainian text.
pub struct Speliuk {
    tokenizer: Box<dyn Tokenizer>,
    detector: Box<dyn ErrorDetector>,
    symspell: Arc<SymSpell>,
    lm: Arc<NgramModel>,
    entity_recognizer: Option<Box<dyn EntityRecognizer>>,
    morph: Option<MorphAnalyzer>,
    settings: CorrectionSettings,
}

impl std::fmt::Debug for Speliuk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Speliuk")
            .field("tokenizer", &self.tokenizer.name())
            .field("detector", &self.detector.name())
            .field("dictionary_terms", &self.symspell.word_count())
            .field("lm_order", &self.lm.order())
            .field(
                "entity_recognizer",
                &self.entity_recognizer.as_ref().map(|r| r.name()),
            )
            .field("morph", &self.morph.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}

fn require_artifact(path: &Path, what: &str) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(SpeliukError::config(format!(
            "{what} not found at {}",
            path.display()
        )))
    }
}

impl Speliuk {
    /// Assemble a corrector from its components with default settings.
    pub fn new(
        tokenizer: Box<dyn Tokenizer>,
        detector: Box<dyn ErrorDetector>,
        symspell: Arc<SymSpell>,
        lm: Arc<NgramModel>,
    ) -> Self {
        Speliuk {
            tokenizer,
            detector,
            symspell,
            lm,
            entity_recognizer: None,
            morph: None,
            settings: CorrectionSettings::default(),
        }
    }

    /// Load every artifact named by the configuration.
    pub fn from_config(config: &SpeliukConfig) -> Result<Self> {
        config.validate()?;
        let settings = config.correction.clone();

        let symspell_path = config.symspell_path();
        require_artifact(&symspell_path, "Frequency dictionary")?;
        let mut symspell = SymSpell::new(
            settings.max_edit_distance,
            settings.prefix_length,
            settings.count_threshold,
        )?;
        symspell.load_dictionary(&symspell_path)?;
        let symspell = Arc::new(symspell);

        let lm_path = config.language_model_path();
        require_artifact(&lm_path, "Language model")?;
        let lm = Arc::new(NgramModel::load(&lm_path)?);

        let detector: Box<dyn ErrorDetector> = match config.known_words_path() {
            Some(path) => {
                require_artifact(&path, "Known words list")?;
                Box::new(
                    LexiconDetector::new(SpellingDictionary::load_from_file(&path)?)
                        .with_settings(config.detection.clone()),
                )
            }
            None => Box::new(
                LexiconDetector::new(Arc::clone(&symspell)).with_settings(config.detection.clone()),
            ),
        };

        let mut speliuk = Speliuk::new(
            Box::new(UnicodeWordTokenizer::new()),
            detector,
            symspell,
            lm,
        )
        .with_settings(settings);

        if let Some(path) = config.gazetteer_path() {
            require_artifact(&path, "Entity gazetteer")?;
            speliuk = speliuk.with_entity_recognizer(Box::new(GazetteerRecognizer::load(&path)?));
        }
        if let Some(path) = config.morph_lexicon_path() {
            require_artifact(&path, "Morphological lexicon")?;
            speliuk = speliuk.with_morph_analyzer(MorphAnalyzer::load(&path)?);
        }

        info!("Speliuk corrector ready: {speliuk:?}");
        Ok(speliuk)
    }

    /// Use an entity recognizer to protect names from edits.
    pub fn with_entity_recognizer(mut self, recognizer: Box<dyn EntityRecognizer>) -> Self {
        self.entity_recognizer = Some(recognizer);
        self
    }

    /// Use a morphological lexicon to protect person names from edits.
    pub fn with_morph_analyzer(mut self, morph: MorphAnalyzer) -> Self {
        self.morph = Some(morph);
        self
    }

    /// Replace the correction settings.
    pub fn with_settings(mut self, settings: CorrectionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The correction settings.
    pub fn settings(&self) -> &CorrectionSettings {
        &self.settings
    }

    /// The symmetric delete index candidates are drawn from.
    pub fn symspell(&self) -> &SymSpell {
        &self.symspell
    }

    /// The language model candidates are scored with.
    pub fn language_model(&self) -> &NgramModel {
        &self.lm
    }

    /// Tokenize the text, label entities and collect error spans.
    ///
    /// Detected errors are stored in the [`ERROR_SPANS_KEY`] span group.
    pub fn detect(&self, text: &str) -> Result<Doc> {
        let mut doc = Doc::new(text, self.tokenizer.as_ref())?;

        if let Some(recognizer) = &self.entity_recognizer {
            let found = recognizer.annotate(&mut doc)?;
            debug!("{} found {found} entities", recognizer.name());
        }

        let mut spans = Vec::new();
        for error in self.detector.detect(text)? {
            match doc.char_span(error.start_char, error.end_char, &error.label) {
                Some(span) => spans.push(span),
                None => warn!(
                    "Dropping error span {}..{} that covers no token",
                    error.start_char, error.end_char
                ),
            }
        }
        doc.set_spans(ERROR_SPANS_KEY, spans);

        Ok(doc)
    }

    /// Dictionary terms closest to the token, best first.
    pub fn symspell_candidates(&self, token: &str) -> Result<Vec<String>> {
        let suggestions = self.symspell.lookup(
            token,
            Verbosity::Closest,
            self.settings.max_edit_distance,
            true,
        )?;

        let mut candidates: Vec<String> = Vec::with_capacity(self.settings.max_candidates);
        for suggestion in suggestions.into_iter().take(self.settings.max_candidates) {
            if !candidates.contains(&suggestion.term) {
                candidates.push(suggestion.term);
            }
        }
        Ok(candidates)
    }

    /// Score each candidate in context, highest log probability first.
    ///
    /// Candidates with equal scores keep their input order.
    pub fn rerank(&self, context: &MaskedContext, candidates: &[String]) -> Vec<(String, f64)> {
        let mut scored: Vec<(String, f64)> = candidates
            .iter()
            .map(|candidate| {
                let text = context.fill(candidate).to_lowercase();
                let score = self.lm.score(&text, self.settings.bos, self.settings.eos);
                (candidate.clone(), score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored
    }

    /// The best correction of `token` in the given context.
    ///
    /// The token itself is always a candidate and wins ties with the best
    /// dictionary term.
    pub fn top_candidate(&self, context: &MaskedContext, token: &str) -> Result<String> {
        let mut candidates = self.symspell_candidates(token)?;
        if !candidates.iter().any(|c| c == token) {
            candidates.push(token.to_string());
        }

        let ranked = self.rerank(context, &candidates);
        let Some((top, top_score)) = ranked.first() else {
            return Ok(token.to_string());
        };
        let token_score = ranked
            .iter()
            .find(|(candidate, _)| candidate == token)
            .map(|(_, score)| *score);

        debug!("Candidates for '{token}' in '{context}': {ranked:?}");

        if token_score == Some(*top_score) {
            Ok(token.to_string())
        } else {
            Ok(top.clone())
        }
    }

    /// The words around a span with the span replaced by [`MASK`].
    pub fn masked_context(&self, doc: &Doc, span: &Span) -> MaskedContext {
        let window = self.settings.window;
        MaskedContext {
            left: doc
                .token_texts(span.start.saturating_sub(window), span.start)
                .join(" "),
            right: doc
                .token_texts(span.end, span.end.saturating_add(window))
                .join(" "),
        }
    }

    /// Check whether a detected span may be edited.
    ///
    /// Spans starting with a decimal digit and spans on persons, organizations and
    /// geopolitical entities are left alone.
    pub fn valid_edit(&self, doc: &Doc, span: &Span) -> bool {
        let text = doc.span_text(span);
        if text.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return false;
        }

        if let Some(label) = doc.ent_type(span.start)
            && (label.starts_with("PER") || label == "GPE" || label == "ORG")
        {
            return false;
        }

        if self.settings.suppress_person_names
            && let Some(morph) = &self.morph
            && morph.is_person_name(text)
        {
            return false;
        }

        true
    }

    /// Correct a text.
    pub fn correct(&self, text: &str) -> Result<Correction> {
        let doc = self.detect(text)?;
        let mut annotated = AnnotatedText::new(text);

        for span in doc.spans(ERROR_SPANS_KEY) {
            if !self.valid_edit(&doc, span) {
                debug!("Skipping protected span '{}'", doc.span_text(span));
                continue;
            }

            let token = doc.span_text(span);
            let context = self.masked_context(&doc, span);
            let correction = self.top_candidate(&context, token)?;

            if correction == token && !self.settings.report_unchanged {
                continue;
            }

            if let Err(e) =
                annotated.annotate(span.start_char, span.end_char, &correction, spelling_meta())
            {
                warn!("Skipping edit '{token}' => '{correction}': {e}");
            }
        }

        Ok(Correction {
            corrected_text: annotated.get_corrected_text(),
            annotations: annotated.get_annotations().to_vec(),
        })
    }

    /// Correct many texts in parallel, keeping their order.
    pub fn correct_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Result<Vec<Correction>> {
        texts
            .par_iter()
            .map(|text| self.correct(text.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ner::GazetteerRecognizer;

    pub(crate) fn test_corrector() -> Speliuk {
        let mut dictionary = SpellingDictionary::new();
        for (word, count) in [
            ("я", 1000),
            ("живу", 500),
            ("живе", 400),
            ("в", 5000),
            ("києві", 100),
            ("він", 900),
            ("олена", 50),
        ] {
            dictionary.add_word(word, count);
        }
        let symspell = Arc::new(SymSpell::from_dictionary(&dictionary, 2, 7, 1).unwrap());

        let mut lm = NgramModel::new(2).unwrap();
        for (words, logprob, backoff) in [
            (&["<s>"][..], -99.0, -0.5),
            (&["</s>"][..], -1.0, 0.0),
            (&["<unk>"][..], -5.0, 0.0),
            (&["я"][..], -1.5, -0.3),
            (&["живу"][..], -2.0, -0.3),
            (&["живе"][..], -2.0, -0.3),
            (&["в"][..], -1.0, -0.3),
            (&["києві"][..], -2.5, -0.3),
            (&["він"][..], -1.5, -0.3),
            (&["я", "живу"][..], -0.3, 0.0),
            (&["він", "живе"][..], -0.3, 0.0),
            (&["живу", "в"][..], -0.4, 0.0),
            (&["живе", "в"][..], -0.4, 0.0),
            (&["в", "києві"][..], -0.5, 0.0),
        ] {
            lm.insert(words, logprob, backoff).unwrap();
        }

        let detector = LexiconDetector::new(Arc::clone(&symspell));
        Speliuk::new(
            Box::new(UnicodeWordTokenizer::new()),
            Box::new(detector),
            symspell,
            Arc::new(lm),
        )
    }

    #[test]
    fn test_correct_uses_context() {
        let speliuk = test_corrector();

        let correction = speliuk.correct("Я живк в Києві.").unwrap();
        assert_eq!(correction.corrected_text, "Я живу в Києві.");
        assert_eq!(correction.annotations.len(), 1);
        assert_eq!(correction.annotations[0].source_text, "живк");
        assert_eq!(correction.annotations[0].top_suggestion(), "живу");
        assert_eq!(
            correction.annotations[0].meta.get("error_type").map(String::as_str),
            Some("Spelling")
        );

        let correction = speliuk.correct("Він живк в Києві.").unwrap();
        assert_eq!(correction.corrected_text, "Він живе в Києві.");
    }

    #[test]
    fn test_masked_context_window() {
        let speliuk = test_corrector().with_settings(CorrectionSettings {
            window: 2,
            ..Default::default()
        });
        let doc = Doc::new("раз два три помилка чотири п'ять шість", &UnicodeWordTokenizer::new())
            .unwrap();
        let span = doc.token_span(3, 4, "Spelling");

        let context = speliuk.masked_context(&doc, &span);
        assert_eq!(context.left, "два три");
        assert_eq!(context.right, "чотири п'ять");
        assert_eq!(context.to_string(), "два три <mask> чотири п'ять");
        assert_eq!(context.fill("слово"), "два три слово чотири п'ять");

        let edge = doc.token_span(0, 1, "Spelling");
        let context = speliuk.masked_context(&doc, &edge);
        assert_eq!(context.to_string(), " <mask> два три");
    }

    #[test]
    fn test_top_candidate_keeps_token_on_tie() {
        let speliuk = test_corrector();
        let context = MaskedContext {
            left: String::new(),
            right: String::new(),
        };

        // Without context both words score the same
        let candidates = vec!["живу".to_string(), "живе".to_string()];
        let ranked = speliuk.rerank(&context, &candidates);
        assert_eq!(ranked[0].0, "живу");
        assert_eq!(ranked[0].1, ranked[1].1);

        assert_eq!(speliuk.top_candidate(&context, "живе").unwrap(), "живе");
    }

    #[test]
    fn test_symspell_candidates_transfer_casing() {
        let speliuk = test_corrector();
        let candidates = speliuk.symspell_candidates("Живк").unwrap();
        assert_eq!(candidates, vec!["Живу", "Живе"]);
    }

    #[test]
    fn test_valid_edit_rules() {
        let speliuk = test_corrector();
        let mut doc = Doc::new(
            "5ти Олена працює в Укрзалізниця",
            &UnicodeWordTokenizer::new(),
        )
        .unwrap();

        let mut gazetteer = GazetteerRecognizer::new();
        gazetteer.add("Укрзалізниця", "ORG");
        gazetteer.annotate(&mut doc).unwrap();

        assert!(!speliuk.valid_edit(&doc, &doc.token_span(0, 1, "Spelling")));
        assert!(!speliuk.valid_edit(&doc, &doc.token_span(4, 5, "Spelling")));
        assert!(speliuk.valid_edit(&doc, &doc.token_span(1, 2, "Spelling")));

        let mut morph = MorphAnalyzer::new();
        morph.add("олена", &["NOUN", "anim", "femn", "Name"]);
        let speliuk = speliuk.with_morph_analyzer(morph);
        assert!(!speliuk.valid_edit(&doc, &doc.token_span(1, 2, "Spelling")));
        assert!(speliuk.valid_edit(&doc, &doc.token_span(2, 3, "Spelling")));
    }

    #[test]
    fn test_only_decimal_digits_block_edits() {
        let speliuk = test_corrector();
        let doc = Doc::new("5ти ½ложки Ⅻстоліття", &crate::analysis::WhitespaceTokenizer::new()).unwrap();

        assert!(!speliuk.valid_edit(&doc, &doc.token_span(0, 1, "Spelling")));
        assert!(speliuk.valid_edit(&doc, &doc.token_span(1, 2, "Spelling")));
        assert!(speliuk.valid_edit(&doc, &doc.token_span(2, 3, "Spelling")));
    }

    #[test]
    fn test_entities_suppress_corrections() {
        let mut gazetteer = GazetteerRecognizer::new();
        gazetteer.add("Живк", "PER");
        let speliuk = test_corrector().with_entity_recognizer(Box::new(gazetteer));

        let correction = speliuk.correct("Я Живк в Києві").unwrap();
        assert!(correction.annotations.is_empty());
        assert_eq!(correction.corrected_text, "Я Живк в Києві");
    }

    #[test]
    fn test_report_unchanged() {
        let text = "Я абракадабра";
        let speliuk = test_corrector();
        assert!(speliuk.correct(text).unwrap().annotations.is_empty());

        let speliuk = test_corrector().with_settings(CorrectionSettings {
            report_unchanged: true,
            ..Default::default()
        });
        let correction = speliuk.correct(text).unwrap();
        assert_eq!(correction.annotations.len(), 1);
        assert_eq!(correction.annotations[0].top_suggestion(), "абракадабра");
        assert_eq!(correction.corrected_text, text);
    }

    #[test]
    fn test_correct_batch_keeps_order() {
        let speliuk = test_corrector();
        let texts = vec!["Я живк".to_string(), "Все гаразд".to_string(), "в Кеєві".to_string()];

        let corrections = speliuk.correct_batch(&texts).unwrap();
        assert_eq!(corrections.len(), 3);
        assert_eq!(corrections[0].corrected_text, "Я живу");
        assert_eq!(corrections[2].corrected_text, "в Києві");
    }
}
