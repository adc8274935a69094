//! Reader for the ARPA n-gram text format.
//!
//! ```text
//! \data\
//! ngram 1=3
//! ngram 2=1
//!
//! \1-grams:
//! -1.0	<s>	-0.3
//! -0.8	слово	-0.2
//! -0.9	</s>
//!
//! \2-grams:
//! -0.4	<s>	слово
//!
//! \end\
//! ```

use std::io::BufRead;

use log::{debug, warn};

use crate::error::{Result, SpeliukError};
use crate::lm::ngram::NgramModel;

#[derive(Debug, PartialEq)]
enum Section {
    Preamble,
    Data,
    Ngrams(usize),
    End,
}

/// Parse an ARPA model.
pub fn read_arpa<R: BufRead>(reader: R) -> Result<NgramModel> {
    let mut section = Section::Preamble;
    let mut declared: Vec<usize> = Vec::new();
    let mut model: Option<NgramModel> = None;
    let mut seen: Vec<usize> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        let line_no = line_no + 1;

        if line.is_empty() {
            continue;
        }

        if line == "\\data\\" {
            section = Section::Data;
            continue;
        }
        if line == "\\end\\" {
            section = Section::End;
            break;
        }
        if let Some(n) = parse_section_header(line) {
            if model.is_none() {
                let order = declared.len();
                model = Some(NgramModel::new(order).map_err(|_| {
                    SpeliukError::language_model(format!(
                        "Line {line_no}: n-gram section before any 'ngram N=count' declaration"
                    ))
                })?);
                seen = vec![0; order];
            }
            if n == 0 || n > declared.len() {
                return Err(SpeliukError::language_model(format!(
                    "Line {line_no}: undeclared section \\{n}-grams:"
                )));
            }
            section = Section::Ngrams(n);
            continue;
        }

        match section {
            Section::Preamble => {}
            Section::Data => {
                let (n, count) = parse_count(line).ok_or_else(|| {
                    SpeliukError::language_model(format!(
                        "Line {line_no}: expected 'ngram N=count', got '{line}'"
                    ))
                })?;
                if n != declared.len() + 1 {
                    return Err(SpeliukError::language_model(format!(
                        "Line {line_no}: n-gram orders must be declared in sequence"
                    )));
                }
                declared.push(count);
            }
            Section::Ngrams(n) => {
                let model = model.as_mut().ok_or_else(|| {
                    SpeliukError::language_model(format!("Line {line_no}: entry outside a section"))
                })?;
                let (logprob, words, backoff) = parse_entry(line, n).ok_or_else(|| {
                    SpeliukError::language_model(format!(
                        "Line {line_no}: malformed {n}-gram entry '{line}'"
                    ))
                })?;
                model.insert(&words, logprob, backoff)?;
                seen[n - 1] += 1;
            }
            Section::End => break,
        }
    }

    if section != Section::End {
        return Err(SpeliukError::language_model(
            "Unexpected end of ARPA file, missing \\end\\",
        ));
    }
    let model = model.ok_or_else(|| SpeliukError::language_model("ARPA file has no n-grams"))?;

    for (i, (expected, actual)) in declared.iter().zip(&seen).enumerate() {
        if expected != actual {
            warn!(
                "ARPA header declares {expected} {}-grams but {actual} were read",
                i + 1
            );
        }
    }
    debug!("Parsed ARPA model with counts {:?}", model.counts());

    Ok(model)
}

/// `\3-grams:` -> 3
fn parse_section_header(line: &str) -> Option<usize> {
    line.strip_prefix('\\')?
        .strip_suffix("-grams:")?
        .parse()
        .ok()
}

/// `ngram 3=1200` -> (3, 1200)
fn parse_count(line: &str) -> Option<(usize, usize)> {
    let (n, count) = line.strip_prefix("ngram")?.trim().split_once('=')?;
    Some((n.trim().parse().ok()?, count.trim().parse().ok()?))
}

fn parse_entry(line: &str, n: usize) -> Option<(f32, Vec<&str>, f32)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let logprob: f32 = fields.first()?.parse().ok()?;

    let backoff = if fields.len() == n + 2 {
        fields[n + 1].parse().ok()?
    } else if fields.len() == n + 1 {
        0.0
    } else {
        return None;
    };

    Some((logprob, fields[1..=n].to_vec(), backoff))
}
