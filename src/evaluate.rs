//! Evaluation of corrected output against a gold M2 corpus.
//!
//! Scoring is delegated to the ERRANT command line tools: the submission is
//! first aligned with the gold source sentences by `errant_parallel`, then
//! compared with the gold edits by `errant_compare`.

pub mod m2;

use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpeliukError};

pub use m2::{M2Document, M2Edit, M2Sentence, extract_source};

/// File name of the extracted source sentences.
pub const SOURCE_FILE: &str = "unlp.source.tok";
/// File name of the aligned submission.
pub const TARGET_FILE: &str = "unlp.target.m2";

/// An external program with leading arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new<S: Into<OsString>>(program: S) -> Self {
        ExternalCommand {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add arguments placed before the ones the evaluator passes.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }

    fn display_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

/// Outcome of one `errant_compare` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRun {
    pub args: Vec<String>,
    pub exit_code: Option<i32>,
}

impl ComparisonRun {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Files produced by an evaluation and the scorer exit codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub source: PathBuf,
    pub aligned: PathBuf,
    pub sentences: usize,
    pub comparisons: Vec<ComparisonRun>,
}

/// Runs the ERRANT alignment and comparison steps.
#[derive(Debug, Clone)]
pub struct Evaluator {
    pub workdir: PathBuf,
    pub errant_parallel: ExternalCommand,
    pub errant_compare: ExternalCommand,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator {
            workdir: env::temp_dir(),
            errant_parallel: ExternalCommand::new("errant_parallel"),
            errant_compare: ExternalCommand::new("errant_compare"),
        }
    }
}

impl Evaluator {
    /// Create an evaluator writing its files to `workdir`.
    pub fn new<P: Into<PathBuf>>(workdir: P) -> Self {
        Evaluator {
            workdir: workdir.into(),
            ..Default::default()
        }
    }

    /// Align `corrected` with the sources of `m2` and score it.
    ///
    /// Fails when alignment fails. Comparison exit codes are reported
    /// without failing the evaluation. The path of the aligned submission
    /// is printed to stderr before the comparisons start.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(&self, corrected: P, m2: Q) -> Result<EvaluationReport> {
        self.run_with_progress(corrected, m2, &mut io::stderr())
    }

    /// [`Evaluator::run`] writing its progress lines to `progress`.
    pub fn run_with_progress<P, Q, W>(
        &self,
        corrected: P,
        m2: Q,
        progress: &mut W,
    ) -> Result<EvaluationReport>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        W: Write,
    {
        let corrected = corrected.as_ref();
        let m2 = m2.as_ref();

        let source = self.workdir.join(SOURCE_FILE);
        let sentences = extract_source(m2, &source)?;
        info!("Extracted {sentences} source sentences to {}", source.display());

        let aligned = self.workdir.join(TARGET_FILE);
        let status = self
            .errant_parallel
            .command()
            .arg("-orig")
            .arg(&source)
            .arg("-cor")
            .arg(corrected)
            .arg("-out")
            .arg(&aligned)
            .status()
            .map_err(|e| {
                SpeliukError::evaluation(format!(
                    "Failed to run {}: {e}",
                    self.errant_parallel.display_name()
                ))
            })?;
        if !status.success() {
            return Err(SpeliukError::evaluation(format!(
                "{} exited with {status}",
                self.errant_parallel.display_name()
            )));
        }
        writeln!(progress, "Aligned submission: {}", aligned.display())?;
        progress.flush()?;

        let mut comparisons = Vec::with_capacity(2);
        for extra in [&[][..], &["-ds", "-cat", "3"][..]] {
            let mut args: Vec<String> = vec![
                "-hyp".to_string(),
                aligned.display().to_string(),
                "-ref".to_string(),
                m2.display().to_string(),
            ];
            args.extend(extra.iter().map(|s| s.to_string()));

            let status = self.errant_compare.command().args(&args).status().map_err(|e| {
                SpeliukError::evaluation(format!(
                    "Failed to run {}: {e}",
                    self.errant_compare.display_name()
                ))
            })?;
            if !status.success() {
                warn!("{} {:?} exited with {status}", self.errant_compare.display_name(), args);
            }

            comparisons.push(ComparisonRun {
                args,
                exit_code: status.code(),
            });
        }

        Ok(EvaluationReport {
            source,
            aligned,
            sentences,
            comparisons,
        })
    }
}
