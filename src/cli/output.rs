//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, SpeliukArgs};
use crate::corrector::Correction;
use crate::error::Result;
use crate::evaluate::EvaluationReport;
use crate::lm::WordScore;
use crate::spelling::Suggestion;

/// Result structure for text correction.
#[derive(Debug, Serialize, Deserialize)]
pub struct CorrectionResult {
    pub corrections: Vec<Correction>,
}

/// Result structure for dictionary lookups.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestionResult {
    pub word: String,
    pub suggestions: Vec<Suggestion>,
}

/// Result structure for language model scoring.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreResult {
    pub text: String,
    pub log10_prob: f64,
    pub perplexity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<WordScore>>,
}

/// Result structure for language model compilation.
#[derive(Debug, Serialize, Deserialize)]
pub struct CompileResult {
    pub input: String,
    pub output: String,
    pub order: usize,
    pub vocab_size: usize,
    pub ngram_counts: Vec<usize>,
    pub size_bytes: u64,
}

/// Rendering of a result for the human output format.
pub trait HumanOutput: Serialize {
    /// Render the result. The default lists the serialized fields.
    fn human(&self, _verbosity: u8) -> Result<String> {
        let value = serde_json::to_value(self)?;
        Ok(format_generic(&value))
    }
}

impl HumanOutput for CorrectionResult {
    fn human(&self, verbosity: u8) -> Result<String> {
        let mut out = String::new();
        for correction in &self.corrections {
            out.push_str(&correction.corrected_text);
            out.push('\n');
            if verbosity > 1 {
                for annotation in &correction.annotations {
                    out.push_str(&format!(
                        "  {}..{}: {} -> {}\n",
                        annotation.start,
                        annotation.end,
                        annotation.source_text,
                        annotation.suggestions.join(" | ")
                    ));
                }
            }
        }
        Ok(out)
    }
}

impl HumanOutput for SuggestionResult {
    fn human(&self, _verbosity: u8) -> Result<String> {
        if self.suggestions.is_empty() {
            return Ok(format!("No suggestions for '{}'\n", self.word));
        }
        Ok(self
            .suggestions
            .iter()
            .map(|s| format!("{s}\n"))
            .collect())
    }
}

impl HumanOutput for ScoreResult {
    fn human(&self, _verbosity: u8) -> Result<String> {
        let mut out = format!(
            "Log10 probability: {:.4}\nPerplexity: {:.4}\n",
            self.log10_prob, self.perplexity
        );
        if let Some(words) = &self.words {
            out.push('\n');
            for (i, word) in words.iter().enumerate() {
                out.push_str(&format!(
                    "{:>3}  {:>9.4}  {}-gram{}\n",
                    i + 1,
                    word.logprob,
                    word.ngram_length,
                    if word.oov { "  OOV" } else { "" }
                ));
            }
        }
        Ok(out)
    }
}

impl HumanOutput for CompileResult {
    fn human(&self, _verbosity: u8) -> Result<String> {
        let counts = self
            .ngram_counts
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}-grams: {c}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!(
            "Compiled {} -> {} ({})\nOrder: {}\nVocabulary: {}\n{counts}\n",
            self.input,
            self.output,
            format_bytes(self.size_bytes),
            self.order,
            self.vocab_size
        ))
    }
}

impl HumanOutput for EvaluationReport {
    fn human(&self, _verbosity: u8) -> Result<String> {
        let mut out = format!(
            "Source sentences: {} ({})\nAligned submission: {}\n",
            self.sentences,
            self.source.display(),
            self.aligned.display()
        );
        for run in &self.comparisons {
            let status = match run.exit_code {
                Some(code) => code.to_string(),
                None => "killed".to_string(),
            };
            out.push_str(&format!("errant_compare {}: exit {status}\n", run.args.join(" ")));
        }
        Ok(out)
    }
}

/// Output a result in the specified format.
pub fn output_result<T: HumanOutput>(message: &str, result: &T, args: &SpeliukArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: HumanOutput>(message: &str, result: &T, args: &SpeliukArgs) -> Result<()> {
    if args.verbosity() > 1 {
        eprintln!("{message}");
    }
    print!("{}", result.human(args.verbosity())?);
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &SpeliukArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format generic data as `key: value` lines.
fn format_generic(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(obj) => obj
            .iter()
            .map(|(key, val)| format!("{key}: {}\n", format_value(val)))
            .collect(),
        _ => format!("{}\n", format_value(value)),
    }
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "null".to_string(),
    }
}

/// Format bytes into human-readable format.
fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    let unit = UNITS[unit_index];
    if unit_index == 0 {
        format!("{bytes} {unit}")
    } else {
        format!("{size:.1} {unit}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotated::{Annotation, spelling_meta};

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&serde_json::json!("живу")), "живу");
        assert_eq!(format_value(&serde_json::json!([1, 2])), "[1, 2]");
        assert_eq!(format_value(&serde_json::Value::Null), "null");
    }

    #[test]
    fn test_correction_human_output() {
        let result = CorrectionResult {
            corrections: vec![Correction {
                corrected_text: "Я живу".to_string(),
                annotations: vec![Annotation {
                    start: 3,
                    end: 11,
                    source_text: "живк".to_string(),
                    suggestions: vec!["живу".to_string()],
                    meta: spelling_meta(),
                }],
            }],
        };

        assert_eq!(result.human(1).unwrap(), "Я живу\n");
        assert_eq!(result.human(2).unwrap(), "Я живу\n  3..11: живк -> живу\n");
    }

    #[test]
    fn test_suggestion_human_output() {
        let result = SuggestionResult {
            word: "живк".to_string(),
            suggestions: vec![Suggestion::new("живу", 1, 500)],
        };
        assert_eq!(result.human(1).unwrap(), "живу (distance 1, count 500)\n");

        let empty = SuggestionResult {
            word: "ххх".to_string(),
            suggestions: Vec::new(),
        };
        assert_eq!(empty.human(1).unwrap(), "No suggestions for 'ххх'\n");
    }

    #[test]
    fn test_score_json_skips_missing_words() {
        let result = ScoreResult {
            text: "я живу".to_string(),
            log10_prob: -3.5,
            perplexity: 14.7,
            words: None,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("words"));
        assert!(result.human(1).unwrap().starts_with("Log10 probability: -3.5000"));
    }
}
