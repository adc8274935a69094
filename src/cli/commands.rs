//! Command implementations for the Speliuk CLI.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use log::{debug, info};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::SpeliukConfig;
use crate::corrector::Speliuk;
use crate::error::{Result, SpeliukError};
use crate::evaluate::{Evaluator, ExternalCommand};
use crate::lm::NgramModel;
use crate::spelling::SymSpell;

/// Execute a CLI command.
pub fn execute_command(args: SpeliukArgs) -> Result<()> {
    match &args.command {
        Command::Correct(correct_args) => correct_text(correct_args.clone(), &args),
        Command::Suggest(suggest_args) => suggest_word(suggest_args.clone(), &args),
        Command::Score(score_args) => score_text(score_args.clone(), &args),
        Command::CompileLm(compile_args) => compile_lm(compile_args.clone(), &args),
        Command::Evaluate(evaluate_args) => evaluate(evaluate_args.clone(), &args),
    }
}

/// Correct a text, a file or standard input.
fn correct_text(args: CorrectArgs, cli_args: &SpeliukArgs) -> Result<()> {
    let mut config = load_config(cli_args)?;
    apply_artifacts(&mut config, &args.artifacts);
    if let Some(window) = args.window {
        config.correction.window = window;
    }
    if let Some(max_candidates) = args.max_candidates {
        config.correction.max_candidates = max_candidates;
    }
    if args.report_unchanged {
        config.correction.report_unchanged = true;
    }
    if args.keep_person_names {
        config.correction.suppress_person_names = false;
    }

    let texts = match (&args.text, &args.input) {
        (Some(text), _) => vec![text.clone()],
        (None, Some(input)) => read_lines(input)?,
        (None, None) => io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<_>>>()
            .context("Failed to read standard input")?,
    };

    let speliuk = Speliuk::from_config(&config)?;

    let start_time = Instant::now();
    let corrections = if texts.len() == 1 {
        vec![speliuk.correct(&texts[0])?]
    } else {
        configure_threads(args.threads.unwrap_or_else(num_cpus::get));
        speliuk.correct_batch(&texts)?
    };
    let edits: usize = corrections.iter().map(|c| c.annotations.len()).sum();
    info!(
        "Corrected {} texts with {edits} edits in {}ms",
        texts.len(),
        start_time.elapsed().as_millis()
    );

    let result = CorrectionResult { corrections };

    if let Some(output) = &args.output {
        let mut writer = BufWriter::new(
            File::create(output)
                .with_context(|| format!("Failed to create {}", output.display()))?,
        );
        for correction in &result.corrections {
            writeln!(writer, "{}", correction.corrected_text)?;
        }
        writer.flush()?;

        if cli_args.output_format == OutputFormat::Json {
            output_result("Correction completed", &result, cli_args)?;
        } else if cli_args.verbosity() > 0 {
            eprintln!(
                "Wrote {} corrected lines to {}",
                result.corrections.len(),
                output.display()
            );
        }
        return Ok(());
    }

    output_result("Correction completed", &result, cli_args)
}

/// Look up suggestions for one word.
fn suggest_word(args: SuggestArgs, cli_args: &SpeliukArgs) -> Result<()> {
    let mut config = load_config(cli_args)?;
    apply_artifacts(&mut config, &args.artifacts);

    let settings = &config.correction;
    let max_edit_distance = args.max_edit_distance.unwrap_or(settings.max_edit_distance);
    let mut symspell = SymSpell::new(
        max_edit_distance,
        settings.prefix_length.max(max_edit_distance + 1),
        settings.count_threshold,
    )?;

    let path = config.symspell_path();
    symspell
        .load_dictionary(&path)
        .with_context(|| format!("Failed to load frequency dictionary {}", path.display()))?;

    let suggestions = symspell.lookup(
        &args.word,
        args.verbosity,
        max_edit_distance,
        !args.no_transfer_casing,
    )?;

    output_result(
        "Lookup completed",
        &SuggestionResult {
            word: args.word,
            suggestions,
        },
        cli_args,
    )
}

/// Score a sentence with the language model.
fn score_text(args: ScoreArgs, cli_args: &SpeliukArgs) -> Result<()> {
    let mut config = load_config(cli_args)?;
    apply_artifacts(&mut config, &args.artifacts);

    let path = config.language_model_path();
    let model = NgramModel::load(&path)
        .with_context(|| format!("Failed to load language model {}", path.display()))?;

    let scores = model.full_scores(&args.text, !args.no_bos, !args.no_eos);
    let log10_prob: f64 = scores.iter().map(|s| s.logprob).sum();
    let perplexity = 10f64.powf(-log10_prob / scores.len().max(1) as f64);

    output_result(
        "Scoring completed",
        &ScoreResult {
            text: args.text,
            log10_prob,
            perplexity,
            words: args.words.then_some(scores),
        },
        cli_args,
    )
}

/// Convert an ARPA model to the binary format.
fn compile_lm(args: CompileLmArgs, cli_args: &SpeliukArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        return Err(SpeliukError::invalid_argument(format!(
            "{} already exists. Use --force to overwrite.",
            args.output.display()
        )));
    }

    let start_time = Instant::now();
    let model = NgramModel::load(&args.arpa)
        .with_context(|| format!("Failed to load language model {}", args.arpa.display()))?;
    model.save_binary(&args.output)?;
    debug!(
        "Compiled {} in {}ms",
        args.arpa.display(),
        start_time.elapsed().as_millis()
    );

    output_result(
        "Language model compiled",
        &CompileResult {
            input: args.arpa.to_string_lossy().to_string(),
            output: args.output.to_string_lossy().to_string(),
            order: model.order(),
            vocab_size: model.vocab_size(),
            ngram_counts: model.counts(),
            size_bytes: fs::metadata(&args.output)?.len(),
        },
        cli_args,
    )
}

/// Align and score a corrected submission.
fn evaluate(args: EvaluateArgs, cli_args: &SpeliukArgs) -> Result<()> {
    let mut evaluator = Evaluator::default();
    if let Some(workdir) = args.workdir {
        fs::create_dir_all(&workdir)
            .with_context(|| format!("Failed to create {}", workdir.display()))?;
        evaluator.workdir = workdir;
    }
    evaluator.errant_parallel = ExternalCommand::new(args.errant_parallel);
    evaluator.errant_compare = ExternalCommand::new(args.errant_compare);

    let report = evaluator.run(&args.corrected, &args.m2)?;

    output_result("Evaluation completed", &report, cli_args)
}

/// Read the configuration file, or the defaults when none is given.
fn load_config(cli_args: &SpeliukArgs) -> Result<SpeliukConfig> {
    match &cli_args.config {
        Some(path) => {
            if cli_args.verbosity() > 1 {
                eprintln!("Loading configuration from: {}", path.display());
            }
            SpeliukConfig::load(path)
        }
        None => Ok(SpeliukConfig::default()),
    }
}

/// Override configured artifact paths with command line values.
fn apply_artifacts(config: &mut SpeliukConfig, artifacts: &ArtifactArgs) {
    if let Some(model_dir) = &artifacts.model_dir {
        config.model_dir = Some(model_dir.clone());
    }
    if let Some(symspell) = &artifacts.symspell {
        config.symspell_dictionary = symspell.clone();
    }
    if let Some(lm) = &artifacts.lm {
        config.language_model = lm.clone();
    }
    if artifacts.gazetteer.is_some() {
        config.entity_gazetteer = artifacts.gazetteer.clone();
    }
    if artifacts.morph.is_some() {
        config.morph_lexicon = artifacts.morph.clone();
    }
    if artifacts.known_words.is_some() {
        config.known_words = artifacts.known_words.clone();
    }
}

/// Read the lines of a text file.
fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(BufReader::new(file).lines().collect::<io::Result<Vec<_>>>()?)
}

/// Size the global rayon pool. Only the first call takes effect.
fn configure_threads(threads: usize) {
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        debug!("Keeping existing thread pool: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::ffi::OsString;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const ARPA: &str = "\\data\\
ngram 1=4

\\1-grams:
-1.0\t<s>\t-0.5
-1.0\t</s>
-0.5\tя\t-0.3
-0.8\tживу\t-0.3

\\end\\
";

    #[test]
    fn test_apply_artifacts() {
        let mut config = SpeliukConfig::default();
        let artifacts = ArtifactArgs {
            model_dir: Some(PathBuf::from("/models")),
            lm: Some(PathBuf::from("ubertext.bin")),
            gazetteer: Some(PathBuf::from("names.tsv")),
            ..Default::default()
        };
        apply_artifacts(&mut config, &artifacts);

        assert_eq!(config.language_model_path(), PathBuf::from("/models/ubertext.bin"));
        assert_eq!(config.symspell_path(), PathBuf::from("/models/symspell_uk.txt"));
        assert_eq!(config.gazetteer_path(), Some(PathBuf::from("/models/names.tsv")));
        assert!(config.morph_lexicon.is_none());
    }

    #[test]
    fn test_read_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");
        fs::write(&path, "Я живк\nв Кеєві\n").unwrap();

        assert_eq!(read_lines(&path).unwrap(), vec!["Я живк", "в Кеєві"]);
        assert!(read_lines(&temp_dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn test_compile_lm_command() {
        let temp_dir = TempDir::new().unwrap();
        let arpa = temp_dir.path().join("model.arpa");
        let output = temp_dir.path().join("model.bin");
        fs::write(&arpa, ARPA).unwrap();

        let argv: Vec<OsString> = vec![
            "speliuk".into(),
            "-q".into(),
            "-f".into(),
            "json".into(),
            "compile-lm".into(),
            arpa.into_os_string(),
            output.clone().into_os_string(),
        ];
        let args = SpeliukArgs::try_parse_from(argv).unwrap();
        execute_command(args.clone()).unwrap();

        let model = NgramModel::load(&output).unwrap();
        assert_eq!(model.counts(), vec![4]);

        // A second run refuses to overwrite without --force
        assert!(execute_command(args).is_err());
    }

    #[test]
    fn test_suggest_command_missing_dictionary() {
        let temp_dir = TempDir::new().unwrap();
        let argv: Vec<OsString> = vec![
            "speliuk".into(),
            "-q".into(),
            "suggest".into(),
            "живк".into(),
            "--symspell".into(),
            temp_dir.path().join("missing.txt").into_os_string(),
        ];
        let args = SpeliukArgs::try_parse_from(argv).unwrap();

        let err = execute_command(args).unwrap_err();
        assert!(err.to_string().contains("Failed to load frequency dictionary"));
    }
}
