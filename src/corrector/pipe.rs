//! Applying the corrector to an existing document.

use std::sync::Arc;

use log::warn;

use crate::analysis::document::Doc;
use crate::analysis::tokenizer::Tokenizer;
use crate::corrector::{Correction, ERROR_SPANS_KEY, Speliuk};
use crate::error::Result;

/// Runs a [`Speliuk`] corrector over documents tokenized elsewhere.
///
/// The corrected text is stored on the document and the
/// [`ERROR_SPANS_KEY`] span group is replaced with one span per edit,
/// labeled with the chosen correction.
#[derive(Debug, Clone)]
pub struct CorrectionPipe {
    speliuk: Arc<Speliuk>,
}

impl CorrectionPipe {
    pub fn new(speliuk: Arc<Speliuk>) -> Self {
        CorrectionPipe { speliuk }
    }

    /// Correct the document in place and return the correction.
    pub fn process(&self, doc: &mut Doc) -> Result<Correction> {
        let correction = self.speliuk.correct(doc.text())?;
        doc.set_corrected(correction.corrected_text.clone());

        let mut spans = Vec::with_capacity(correction.annotations.len());
        for annotation in &correction.annotations {
            match doc.char_span(annotation.start, annotation.end, annotation.top_suggestion()) {
                Some(span) => spans.push(span),
                None => warn!(
                    "Edit {}..{} does not align with the document tokens",
                    annotation.start, annotation.end
                ),
            }
        }
        doc.set_spans(ERROR_SPANS_KEY, spans);

        Ok(correction)
    }

    /// Tokenize a text and correct it.
    pub fn call(&self, text: &str, tokenizer: &dyn Tokenizer) -> Result<Doc> {
        let mut doc = Doc::new(text, tokenizer)?;
        self.process(&mut doc)?;
        Ok(doc)
    }
}
