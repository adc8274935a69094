//! Command line argument parsing for the Speliuk CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::spelling::Verbosity;

/// Speliuk - Ukrainian spelling correction
#[derive(Parser, Debug, Clone)]
#[command(name = "speliuk")]
#[command(about = "Ukrainian spelling correction with SymSpell candidates and n-gram re-ranking")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct SpeliukArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl SpeliukArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n + 1,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Correct spelling errors in a text or a file
    Correct(CorrectArgs),

    /// Look up dictionary suggestions for a single word
    Suggest(SuggestArgs),

    /// Score a sentence with the language model
    Score(ScoreArgs),

    /// Convert an ARPA language model into the binary format
    #[command(name = "compile-lm")]
    CompileLm(CompileLmArgs),

    /// Align corrected output with a gold M2 file and score it with ERRANT
    Evaluate(EvaluateArgs),
}

/// Artifact locations overriding the configuration file
#[derive(Parser, Debug, Clone, Default)]
pub struct ArtifactArgs {
    /// Directory relative artifact paths are resolved against
    #[arg(long, value_name = "DIR", env = "SPELIUK_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Frequency dictionary (`term count` per line)
    #[arg(long, value_name = "FILE")]
    pub symspell: Option<PathBuf>,

    /// ARPA or compiled language model
    #[arg(long, value_name = "FILE")]
    pub lm: Option<PathBuf>,

    /// Entity gazetteer (`entity<TAB>LABEL` per line)
    #[arg(long, value_name = "FILE")]
    pub gazetteer: Option<PathBuf>,

    /// Morphological lexicon (`word<TAB>GRAMMEMES` per line)
    #[arg(long, value_name = "FILE")]
    pub morph: Option<PathBuf>,

    /// Word list used to detect errors
    #[arg(long, value_name = "FILE")]
    pub known_words: Option<PathBuf>,
}

/// Arguments for correcting text
#[derive(Parser, Debug, Clone)]
pub struct CorrectArgs {
    /// Text to correct (reads --input or stdin when omitted)
    #[arg(value_name = "TEXT", conflicts_with = "input")]
    pub text: Option<String>,

    /// Input file, one text per line
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Write corrected lines to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    /// Number of words on each side of an error used for re-ranking
    #[arg(long)]
    pub window: Option<usize>,

    /// Maximum number of candidates re-ranked per error
    #[arg(long)]
    pub max_candidates: Option<usize>,

    /// Also report errors whose best candidate is the original word
    #[arg(long)]
    pub report_unchanged: bool,

    /// Allow corrections of detected person names
    #[arg(long)]
    pub keep_person_names: bool,

    /// Worker threads for file input (default: number of CPUs)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

/// Arguments for dictionary lookups
#[derive(Parser, Debug, Clone)]
pub struct SuggestArgs {
    /// Word to look up
    #[arg(value_name = "WORD")]
    pub word: String,

    /// Maximum edit distance of suggestions
    #[arg(short = 'd', long)]
    pub max_edit_distance: Option<usize>,

    /// Which suggestions to return
    #[arg(long, default_value = "closest")]
    pub verbosity: Verbosity,

    /// Keep suggestions in lower case
    #[arg(long)]
    pub no_transfer_casing: bool,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,
}

/// Arguments for language model scoring
#[derive(Parser, Debug, Clone)]
pub struct ScoreArgs {
    /// Whitespace-tokenized sentence
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Do not prepend the sentence start marker
    #[arg(long)]
    pub no_bos: bool,

    /// Do not append the sentence end marker
    #[arg(long)]
    pub no_eos: bool,

    /// Include per-word scores
    #[arg(long)]
    pub words: bool,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,
}

/// Arguments for compiling a language model
#[derive(Parser, Debug, Clone)]
pub struct CompileLmArgs {
    /// ARPA model to read
    #[arg(value_name = "ARPA")]
    pub arpa: PathBuf,

    /// Binary model to write
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Overwrite an existing output file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for evaluation
#[derive(Parser, Debug, Clone)]
pub struct EvaluateArgs {
    /// Corrected sentences, one per line, aligned with the M2 source
    #[arg(value_name = "CORRECTED")]
    pub corrected: PathBuf,

    /// Gold M2 file
    #[arg(long, value_name = "M2_FILE")]
    pub m2: PathBuf,

    /// Directory for intermediate files (default: system temp dir)
    #[arg(long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Alignment program
    #[arg(long, default_value = "errant_parallel")]
    pub errant_parallel: String,

    /// Comparison program
    #[arg(long, default_value = "errant_compare")]
    pub errant_compare: String,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
