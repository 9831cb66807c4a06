//! CLI entry point: runs a `.al` file end-to-end, or drops into the REPL
//! when invoked with no arguments.
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as _;
use log::error;

use alphalang::builtins::Io;
use alphalang::environment::Environment;
use alphalang::eval_source_in;

/// Tree-walking interpreter for AlphaLang.
#[derive(clap::Parser)]
#[command(name = "alphalang", version, about)]
struct Cli {
    /// Script to run; must end in `.al`. Omit to start the REPL.
    file: Option<PathBuf>,

    /// Raise the log level to debug.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    simple_logger::init_with_level(if cli.verbose {
        log::Level::Debug
    } else {
        log::Level::Warn
    })
    .ok();

    match cli.file {
        Some(path) => run_file(&path),
        None => {
            let stdin = io::stdin();
            let mut reader = stdin.lock();
            let mut stdout = io::stdout();
            alphalang::repl::start(&mut reader, &mut stdout);
            ExitCode::SUCCESS
        }
    }
}

fn run_file(path: &PathBuf) -> ExitCode {
    if path.extension().and_then(|ext| ext.to_str()) != Some("al") {
        error!("expected a source file ending in .al, got {}", path.display());
        return ExitCode::FAILURE;
    }

    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            error!("failed to read {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    };

    let env = Environment::new();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();
    let mut io = Io {
        out: &mut stdout,
        input: &mut input,
    };

    let (value, errors) = eval_source_in(&source, &env, &mut io);
    if !errors.is_empty() {
        for parse_error in &errors {
            eprintln!("{parse_error}");
        }
        return ExitCode::FAILURE;
    }

    if let alphalang::object::Value::Error(message) = value {
        let _ = io.out.flush();
        eprintln!("ERROR: {message}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
