//! The M2 format of grammatical error correction corpora.
//!
//! Each sentence block starts with the tokenized source sentence, followed by
//! one line per edit, and ends with a blank line:
//!
//! ```text
//! S Я жеву в Києві .
//! A 1 2|||Spelling|||живу|||REQUIRED|||-NONE-|||0
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpeliukError};

lazy_static! {
    static ref EDIT_LINE: Regex =
        Regex::new(r"^A (-?\d+) (-?\d+)\|\|\|([^|]*)\|\|\|(.*?)\|\|\|([^|]*)\|\|\|([^|]*)\|\|\|(\d+)$")
            .unwrap();
}

/// Correction value of edits that delete tokens.
pub const NONE: &str = "-NONE-";

/// One annotated edit of a source sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct M2Edit {
    /// Token range of the edit, `None` for `-1 -1` no-op edits.
    pub span: Option<(usize, usize)>,
    pub error_type: String,
    pub correction: String,
    pub annotator: usize,
}

impl M2Edit {
    /// Check whether this is a no-op edit.
    pub fn is_noop(&self) -> bool {
        self.span.is_none()
    }
}

/// A source sentence with its edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct M2Sentence {
    pub source: String,
    pub edits: Vec<M2Edit>,
}

impl M2Sentence {
    /// Apply the edits of one annotator to the source tokens.
    pub fn corrected(&self, annotator: usize) -> String {
        let tokens: Vec<&str> = self.source.split(' ').collect();
        let mut edits: Vec<&M2Edit> = self
            .edits
            .iter()
            .filter(|e| e.annotator == annotator && !e.is_noop())
            .collect();
        edits.sort_by_key(|e| e.span);

        let mut out: Vec<&str> = Vec::with_capacity(tokens.len());
        let mut next = 0;
        for edit in edits {
            let Some((start, end)) = edit.span else { continue };
            if start < next || end > tokens.len() {
                continue;
            }
            out.extend(&tokens[next..start]);
            if edit.correction != NONE && !edit.correction.is_empty() {
                out.extend(edit.correction.split(' '));
            }
            next = end;
        }
        out.extend(&tokens[next.min(tokens.len())..]);

        out.join(" ")
    }
}

/// A parsed M2 file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct M2Document {
    pub sentences: Vec<M2Sentence>,
}

impl M2Document {
    /// Parse M2 text.
    pub fn parse(text: &str) -> Result<Self> {
        let mut sentences: Vec<M2Sentence> = Vec::new();
        let mut current: Option<M2Sentence> = None;

        for (line_no, line) in text.lines().enumerate() {
            let line_no = line_no + 1;

            if let Some(source) = line.strip_prefix("S ") {
                if let Some(sentence) = current.take() {
                    sentences.push(sentence);
                }
                current = Some(M2Sentence {
                    source: source.to_string(),
                    edits: Vec::new(),
                });
            } else if line.starts_with("A ") {
                let sentence = current.as_mut().ok_or_else(|| {
                    SpeliukError::evaluation(format!("Line {line_no}: edit before any sentence"))
                })?;
                sentence.edits.push(parse_edit(line).ok_or_else(|| {
                    SpeliukError::evaluation(format!("Line {line_no}: malformed edit '{line}'"))
                })?);
            } else if line.trim().is_empty() {
                if let Some(sentence) = current.take() {
                    sentences.push(sentence);
                }
            } else {
                return Err(SpeliukError::evaluation(format!(
                    "Line {line_no}: unexpected line '{line}'"
                )));
            }
        }
        if let Some(sentence) = current {
            sentences.push(sentence);
        }

        Ok(M2Document { sentences })
    }

    /// Read and parse an M2 file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// The tokenized source sentences.
    pub fn source_sentences(&self) -> Vec<&str> {
        self.sentences.iter().map(|s| s.source.as_str()).collect()
    }
}

fn parse_edit(line: &str) -> Option<M2Edit> {
    let caps = EDIT_LINE.captures(line)?;
    let start: i64 = caps.get(1)?.as_str().parse().ok()?;
    let end: i64 = caps.get(2)?.as_str().parse().ok()?;

    let span = if start < 0 || end < 0 {
        None
    } else if start <= end {
        Some((start as usize, end as usize))
    } else {
        return None;
    };

    Some(M2Edit {
        span,
        error_type: caps.get(3)?.as_str().to_string(),
        correction: caps.get(4)?.as_str().to_string(),
        annotator: caps.get(7)?.as_str().parse().ok()?,
    })
}

/// Copy the source sentences of an M2 file into a text file, one per line.
///
/// Returns the number of sentences written.
pub fn extract_source<P: AsRef<Path>, Q: AsRef<Path>>(m2_path: P, out_path: Q) -> Result<usize> {
    let reader = BufReader::new(File::open(m2_path.as_ref())?);
    let mut writer = BufWriter::new(File::create(out_path.as_ref())?);
    let mut count = 0;

    for line in reader.lines() {
        let line = line?;
        if let Some(source) = line.strip_prefix("S ") {
            writeln!(writer, "{source}")?;
            count += 1;
        }
    }
    writer.flush()?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const M2: &str = "\
S Я жеву в Кеєві .
A 1 2|||Spelling|||живу|||REQUIRED|||-NONE-|||0
A 3 4|||Spelling|||Києві|||REQUIRED|||-NONE-|||0

S Все добре .
A -1 -1|||noop|||-NONE-|||REQUIRED|||-NONE-|||0

S Він прийшов вчора вчора .
A 3 4|||Other|||-NONE-|||REQUIRED|||-NONE-|||0
A 1 2|||Spelling|||прийшла|||REQUIRED|||-NONE-|||1
";

    #[test]
    fn test_parse_m2() {
        let doc = M2Document::parse(M2).unwrap();

        assert_eq!(doc.sentences.len(), 3);
        assert_eq!(doc.source_sentences()[0], "Я жеву в Кеєві .");
        assert_eq!(doc.sentences[0].edits[0].span, Some((1, 2)));
        assert_eq!(doc.sentences[0].edits[0].correction, "живу");
        assert!(doc.sentences[1].edits[0].is_noop());
        assert_eq!(doc.sentences[2].edits[1].annotator, 1);
    }

    #[test]
    fn test_corrected_sentences() {
        let doc = M2Document::parse(M2).unwrap();

        assert_eq!(doc.sentences[0].corrected(0), "Я живу в Києві .");
        assert_eq!(doc.sentences[1].corrected(0), "Все добре .");
        assert_eq!(doc.sentences[2].corrected(0), "Він прийшов вчора .");
        assert_eq!(doc.sentences[2].corrected(1), "Він прийшла вчора вчора .");
    }

    #[test]
    fn test_malformed_edit() {
        let err = M2Document::parse("S а б\nA 1|||x\n").unwrap_err();
        assert!(err.to_string().contains("Line 2"));

        assert!(M2Document::parse("A 0 1|||Spelling|||x|||REQUIRED|||-NONE-|||0\n").is_err());
    }

    #[test]
    fn test_extract_source() {
        let temp_dir = TempDir::new().unwrap();
        let m2_path = temp_dir.path().join("gold.m2");
        let out_path = temp_dir.path().join("source.txt");
        std::fs::write(&m2_path, M2).unwrap();

        assert_eq!(extract_source(&m2_path, &out_path).unwrap(), 3);
        let source = std::fs::read_to_string(&out_path).unwrap();
        assert_eq!(
            source,
            "Я жеву в Кеєві .\nВсе добре .\nВін прийшов вчора вчора .\n"
        );
    }
}
