//! Named entity recognition.
//!
//! Entity labels are used by the corrector to leave names of people,
//! organizations and places untouched.

pub mod gazetteer;

use serde::{Deserialize, Serialize};

use crate::analysis::document::Doc;
use crate::error::Result;

pub use gazetteer::GazetteerRecognizer;

/// An entity over the token range `[start, end)` of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

/// Trait for components that find entities in a tokenized document.
pub trait EntityRecognizer: Send + Sync {
    /// Find entities in the document.
    fn recognize(&self, doc: &Doc) -> Result<Vec<EntitySpan>>;

    /// Get the name of this recognizer.
    fn name(&self) -> &'static str;

    /// Recognize entities and store their labels on the document tokens.
    fn annotate(&self, doc: &mut Doc) -> Result<usize> {
        let entities: Vec<(usize, usize, String)> = self
            .recognize(doc)?
            .into_iter()
            .map(|e| (e.start, e.end, e.label))
            .collect();
        doc.set_entities(&entities);
        Ok(entities.len())
    }
}
