//! Speliuk CLI binary.

use std::io::Write;
use std::process;

use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use speliuk::cli::args::SpeliukArgs;
use speliuk::cli::commands::execute_command;

/// Map the CLI verbosity onto a log level. `SPELIUK_LOG` can refine it.
fn log_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

fn main() {
    let args = SpeliukArgs::parse();

    Builder::new()
        .filter_level(log_level(args.verbosity()))
        .parse_env("SPELIUK_LOG")
        .format(|buf, record| {
            writeln!(buf, "[{} {}] {}", record.level(), record.target(), record.args())
        })
        .init();

    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
