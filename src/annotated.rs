//! Text with inline correction annotations.
//!
//! Annotations are rendered in the UA-GEC markup, where each edit is written
//! in braces next to the text it replaces:
//!
//! ```text
//! Я {жеву=>живу:::error_type=Spelling} в Києві.
//! ```
//!
//! Several suggestions are separated by `|`, and every `:::key=value` suffix
//! adds an entry to the annotation metadata. Offsets are byte offsets into
//! the original text.
//!
//! # Examples
//!
//! ```
//! use speliuk::annotated::AnnotatedText;
//!
//! let mut text = AnnotatedText::new("Я жеву в Києві.");
//! text.annotate(3, 11, "живу", Default::default()).unwrap();
//!
//! assert_eq!(text.get_corrected_text(), "Я живу в Києві.");
//! assert_eq!(text.to_string(), "Я {жеву=>живу} в Києві.");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpeliukError};

lazy_static! {
    static ref ANNOTATION: Regex =
        Regex::new(r"\{([^{}]*?)=>([^{}]*?)((?::::[^{}:=]+=[^{}:]*)*)\}").unwrap();
    /// An opening brace and an arrow with no annotation closing them.
    static ref UNCLOSED: Regex = Regex::new(r"\{[^{}]*=>").unwrap();
}

/// A single edit over the byte range `[start, end)` of the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub start: usize,
    pub end: usize,
    pub source_text: String,
    pub suggestions: Vec<String>,
    pub meta: BTreeMap<String, String>,
}

impl Annotation {
    /// The preferred suggestion, or an empty string when there is none.
    pub fn top_suggestion(&self) -> &str {
        self.suggestions.first().map(String::as_str).unwrap_or("")
    }

    fn overlaps(&self, start: usize, end: usize) -> bool {
        (self.start < end && start < self.end)
            || (start == end && self.start == start && self.end == end)
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}=>{}", self.source_text, self.suggestions.join("|"))?;
        for (key, value) in &self.meta {
            write!(f, ":::{key}={value}")?;
        }
        write!(f, "}}")
    }
}

/// A text together with non-overlapping annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedText {
    original: String,
    /// Sorted by start offset.
    annotations: Vec<Annotation>,
}

impl AnnotatedText {
    /// Create an annotated text without annotations.
    pub fn new(text: &str) -> Self {
        AnnotatedText {
            original: text.to_string(),
            annotations: Vec::new(),
        }
    }

    /// Parse text written in the annotation markup.
    pub fn parse(markup: &str) -> Result<Self> {
        let mut original = String::with_capacity(markup.len());
        let mut annotations = Vec::new();
        let mut last = 0;

        for caps in ANNOTATION.captures_iter(markup) {
            let (Some(whole), Some(source), Some(target)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };

            push_plain(&mut original, &markup[last..whole.start()], markup)?;
            let start = original.len();
            original.push_str(source.as_str());

            let meta = caps
                .get(3)
                .map(|m| parse_meta(m.as_str()))
                .unwrap_or_default();

            annotations.push(Annotation {
                start,
                end: original.len(),
                source_text: source.as_str().to_string(),
                suggestions: target.as_str().split('|').map(str::to_string).collect(),
                meta,
            });
            last = whole.end();
        }
        push_plain(&mut original, &markup[last..], markup)?;

        Ok(AnnotatedText {
            original,
            annotations,
        })
    }

    /// Annotate the range `[start, end)` with a correction.
    ///
    /// Fails if the range is out of bounds, does not fall on character
    /// boundaries, or overlaps an existing annotation.
    pub fn annotate(
        &mut self,
        start: usize,
        end: usize,
        correct_value: &str,
        meta: BTreeMap<String, String>,
    ) -> Result<&Annotation> {
        self.annotate_with_suggestions(start, end, vec![correct_value.to_string()], meta)
    }

    /// Annotate a range with several suggestions, best first.
    pub fn annotate_with_suggestions(
        &mut self,
        start: usize,
        end: usize,
        suggestions: Vec<String>,
        meta: BTreeMap<String, String>,
    ) -> Result<&Annotation> {
        if start > end || end > self.original.len() {
            return Err(SpeliukError::annotation(format!(
                "Range {start}..{end} is out of bounds for text of length {}",
                self.original.len()
            )));
        }
        if !self.original.is_char_boundary(start) || !self.original.is_char_boundary(end) {
            return Err(SpeliukError::annotation(format!(
                "Range {start}..{end} does not fall on character boundaries"
            )));
        }
        if let Some(existing) = self.annotations.iter().find(|a| a.overlaps(start, end)) {
            return Err(SpeliukError::annotation(format!(
                "Range {start}..{end} overlaps annotation {existing}"
            )));
        }

        // Insertions go before a replacement starting at the same offset
        let index = self
            .annotations
            .partition_point(|a| (a.start, a.end) <= (start, end));
        self.annotations.insert(
            index,
            Annotation {
                start,
                end,
                source_text: self.original[start..end].to_string(),
                suggestions,
                meta,
            },
        );
        Ok(&self.annotations[index])
    }

    /// Remove an annotation. Returns `false` if it was not found.
    pub fn remove(&mut self, annotation: &Annotation) -> bool {
        match self.annotations.iter().position(|a| a == annotation) {
            Some(i) => {
                self.annotations.remove(i);
                true
            }
            None => false,
        }
    }

    /// All annotations ordered by position.
    pub fn get_annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// The text without any corrections applied.
    pub fn get_original_text(&self) -> &str {
        &self.original
    }

    /// The text with the top suggestion of every annotation applied.
    pub fn get_corrected_text(&self) -> String {
        let mut corrected = String::with_capacity(self.original.len());
        let mut last = 0;

        for annotation in &self.annotations {
            corrected.push_str(&self.original[last..annotation.start]);
            corrected.push_str(annotation.top_suggestion());
            last = annotation.end;
        }
        corrected.push_str(&self.original[last..]);

        corrected
    }
}

impl fmt::Display for AnnotatedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut last = 0;
        for annotation in &self.annotations {
            f.write_str(&self.original[last..annotation.start])?;
            write!(f, "{annotation}")?;
            last = annotation.end;
        }
        f.write_str(&self.original[last..])
    }
}

/// Append text found between annotations, rejecting unclosed ones.
fn push_plain(original: &mut String, segment: &str, markup: &str) -> Result<()> {
    if UNCLOSED.is_match(segment) {
        return Err(SpeliukError::annotation(format!(
            "Malformed annotation markup: '{markup}'"
        )));
    }
    original.push_str(segment);
    Ok(())
}

/// `:::error_type=Spelling:::id=3` -> {error_type: Spelling, id: 3}
fn parse_meta(raw: &str) -> BTreeMap<String, String> {
    raw.split(":::")
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Metadata marking an edit as a spelling correction.
pub fn spelling_meta() -> BTreeMap<String, String> {
    BTreeMap::from([("error_type".to_string(), "Spelling".to_string())])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_and_correct() {
        let text = "Я жеву в Кеєві.";
        let mut annotated = AnnotatedText::new(text);

        let second = text.find("Кеєві").unwrap();
        annotated
            .annotate(second, second + "Кеєві".len(), "Києві", spelling_meta())
            .unwrap();
        let first = text.find("жеву").unwrap();
        annotated
            .annotate(first, first + "жеву".len(), "живу", spelling_meta())
            .unwrap();

        let annotations = annotated.get_annotations();
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].source_text, "жеву");
        assert_eq!(annotations[1].top_suggestion(), "Києві");

        assert_eq!(annotated.get_corrected_text(), "Я живу в Києві.");
        assert_eq!(annotated.get_original_text(), text);
    }

    #[test]
    fn test_annotate_rejects_bad_ranges() {
        let mut annotated = AnnotatedText::new("Я жеву");
        let meta = BTreeMap::new();

        assert!(annotated.annotate(3, 100, "x", meta.clone()).is_err());
        // Inside a two-byte letter
        assert!(annotated.annotate(4, 5, "x", meta.clone()).is_err());

        annotated.annotate(3, 11, "живу", meta.clone()).unwrap();
        let err = annotated.annotate(5, 11, "иву", meta).unwrap_err();
        assert!(err.to_string().contains("overlaps"));
    }

    #[test]
    fn test_display_markup() {
        let mut annotated = AnnotatedText::new("Я жеву тут");
        annotated.annotate(3, 11, "живу", spelling_meta()).unwrap();

        assert_eq!(
            annotated.to_string(),
            "Я {жеву=>живу:::error_type=Spelling} тут"
        );
    }

    #[test]
    fn test_parse_markup() {
        let annotated =
            AnnotatedText::parse("Я {жеву=>живу|живе:::error_type=Spelling} в {Кеєві=>Києві}.")
                .unwrap();

        assert_eq!(annotated.get_original_text(), "Я жеву в Кеєві.");
        assert_eq!(annotated.get_corrected_text(), "Я живу в Києві.");

        let first = &annotated.get_annotations()[0];
        assert_eq!(first.suggestions, vec!["живу", "живе"]);
        assert_eq!(first.meta.get("error_type").map(String::as_str), Some("Spelling"));
        assert_eq!(&annotated.get_original_text()[first.start..first.end], "жеву");
        assert!(annotated.get_annotations()[1].meta.is_empty());
    }

    #[test]
    fn test_parse_plain_text_and_insertions() {
        let plain = AnnotatedText::parse("Без помилок.").unwrap();
        assert!(plain.get_annotations().is_empty());

        let inserted = AnnotatedText::parse("Привіт{=>,} друже").unwrap();
        assert_eq!(inserted.get_original_text(), "Привіт друже");
        assert_eq!(inserted.get_corrected_text(), "Привіт, друже");
    }

    #[test]
    fn test_parse_rejects_broken_markup() {
        assert!(AnnotatedText::parse("Я {жеву=>живу в Києві.").is_err());
    }

    #[test]
    fn test_parse_plain_braces_and_arrows() {
        let plain = AnnotatedText::parse("код {x} і a=>b").unwrap();
        assert!(plain.get_annotations().is_empty());
        assert_eq!(plain.get_original_text(), "код {x} і a=>b");

        let mixed = AnnotatedText::parse("{x} {а=>б} і a=>b").unwrap();
        assert_eq!(mixed.get_original_text(), "{x} а і a=>b");
        assert_eq!(mixed.get_corrected_text(), "{x} б і a=>b");

        assert!(AnnotatedText::parse("{а=>б} і {x=>y").is_err());
    }

    #[test]
    fn test_insertion_before_replacement_at_same_offset() {
        let mut annotated = AnnotatedText::new("абв где");
        annotated.annotate(0, 6, "аб", BTreeMap::new()).unwrap();
        annotated.annotate(0, 0, "«", BTreeMap::new()).unwrap();

        let ranges: Vec<(usize, usize)> = annotated
            .get_annotations()
            .iter()
            .map(|a| (a.start, a.end))
            .collect();
        assert_eq!(ranges, vec![(0, 0), (0, 6)]);
        assert_eq!(annotated.get_corrected_text(), "«аб где");
        assert_eq!(annotated.to_string(), "{=>«}{абв=>аб} где");

        // An insertion at the end of the replacement goes after it
        annotated.annotate(6, 6, "»", BTreeMap::new()).unwrap();
        assert_eq!(annotated.get_corrected_text(), "«аб» где");
    }

    #[test]
    fn test_remove() {
        let mut annotated = AnnotatedText::parse("{А=>Б} і {В=>Г}").unwrap();
        let first = annotated.get_annotations()[0].clone();

        assert!(annotated.remove(&first));
        assert!(!annotated.remove(&first));
        assert_eq!(annotated.get_corrected_text(), "А і Г");
    }
}
