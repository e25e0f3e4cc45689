//! Monkey interpreter CLI

use clap::{Args, Parser, Subcommand};
use monkey::error::{CompileError, report_error};
use monkey::interp::{DEFAULT_MAX_DEPTH, Interpreter, Object, new_environment};
use monkey::repl::{PROMPT, Repl, ReplConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Once;

#[derive(Parser)]
#[command(name = "monkey", version, about = "Monkey language interpreter")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive session (the default)
    Repl(ReplArgs),
    /// Evaluate a source file and print its final value
    Run {
        /// Source file to run
        file: PathBuf,
        /// Maximum nested function calls
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
    /// Parse and print the canonical rendering (debug)
    Parse {
        /// Source file to parse
        file: PathBuf,
        /// Dump the AST as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
    },
}

#[derive(Args)]
struct ReplArgs {
    /// Prompt shown before each line
    #[arg(long, default_value = PROMPT)]
    prompt: String,
    /// Do not read or write the history file
    #[arg(long)]
    no_history: bool,
    /// Maximum nested function calls
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

impl Default for ReplArgs {
    fn default() -> Self {
        let config = ReplConfig::default();
        ReplArgs {
            prompt: config.prompt,
            no_history: !config.history,
            max_depth: config.max_depth,
        }
    }
}

/// Failure already reported to the user
#[derive(Debug)]
struct Reported;

impl std::fmt::Display for Reported {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("errors reported")
    }
}

impl std::error::Error for Reported {}

static TRACING_INIT: Once = Once::new();

/// Install a log subscriber when `RUST_LOG` is set
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Command::Repl(ReplArgs::default())) {
        Command::Repl(args) => start_repl(args),
        Command::Run { file, max_depth } => run_file(&file, max_depth),
        Command::Parse { file, json } => parse_file(&file, json),
        Command::Tokens { file } => tokenize_file(&file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is::<Reported>() => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn start_repl(args: ReplArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = ReplConfig {
        prompt: args.prompt,
        history: !args.no_history,
        max_depth: args.max_depth,
    };
    Repl::new(config)?.run()?;
    Ok(())
}

fn read_source(path: &Path) -> Result<String, CompileError> {
    std::fs::read_to_string(path)
        .map_err(|e| CompileError::io_error(format!("{}: {e}", path.display())))
}

/// Parse a file, reporting every syntax error with its source location
fn parse_reported(path: &Path) -> Result<monkey::ast::Program, Box<dyn std::error::Error>> {
    let source = read_source(path)?;
    let filename = path.display().to_string();

    let (program, errors) = monkey::parser::parse(&source);
    if !errors.is_empty() {
        for err in &errors {
            report_error(&filename, &source, err);
        }
        return Err(Reported.into());
    }
    Ok(program)
}

fn run_file(path: &Path, max_depth: usize) -> Result<(), Box<dyn std::error::Error>> {
    let program = parse_reported(path)?;

    let mut interpreter = Interpreter::with_max_depth(max_depth);
    let env = new_environment();
    match interpreter.eval(&program, &env) {
        Object::Error(message) => {
            eprintln!("Runtime error: {message}");
            Err(Reported.into())
        }
        Object::Null => Ok(()),
        value => {
            println!("{value}");
            Ok(())
        }
    }
}

fn parse_file(path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let program = parse_reported(path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&program)?);
    } else {
        println!("{program}");
    }
    Ok(())
}

fn tokenize_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = read_source(path)?;

    for tok in monkey::lexer::tokenize(&source) {
        println!(
            "{:?}({:?}) @ {}..{}",
            tok.kind, tok.literal, tok.span.start, tok.span.end
        );
    }

    Ok(())
}
