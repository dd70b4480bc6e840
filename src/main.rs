use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use smartcalc::repl::{HELP, LineSink, Repl};
use smartcalc::{Config, FileStore, KeyValueStore, MemoryStore, Outcome, Session};

#[derive(Parser)]
#[command(name = "smartcalc", version, about = "Calculator with history")]
struct Cli {
    /// Directory holding the persistent store.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Don't persist anything.
    #[arg(long, global = true)]
    memory: bool,

    /// Show results with thousand separators.
    #[arg(long, global = true)]
    group_digits: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate one expression and print the result.
    Eval {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        expression: Vec<String>,
    },
    /// Interactive calculator (the default).
    Repl,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

fn open_store(cli: &Cli, config: &Config) -> Result<Box<dyn KeyValueStore>> {
    if cli.memory {
        return Ok(Box::new(MemoryStore::new()));
    }

    let store = match cli.data_dir.clone().or_else(|| config.data_dir.clone()) {
        Some(dir) => FileStore::open(&dir)
            .with_context(|| format!("Failed to open store in {}", dir.display()))?,
        None => FileStore::open_default()
            .context("Failed to open store; pass --data-dir or --memory")?,
    };
    tracing::info!(path = %store.path().display(), "using store");
    Ok(Box::new(store))
}

fn eval(expression: &str, group: bool) -> ExitCode {
    let mut session = Session::load(Box::new(MemoryStore::new()));
    session.append(expression);

    match session.evaluate() {
        Ok(Outcome::Value(calc)) => {
            if group {
                println!("{}", calc.display_result());
            } else {
                println!("{}", calc.result);
            }
            ExitCode::SUCCESS
        }
        Ok(Outcome::Empty) => {
            println!("{}", session.display_text());
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::debug!(reason = err.reason(), "evaluation failed");
            println!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn main() -> Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::load_or_default();
    let group = cli.group_digits || config.group_digits;

    match &cli.command {
        Some(Command::Eval { expression }) => Ok(eval(&expression.join(" "), group)),
        Some(Command::Repl) | None => {
            let session = Session::load(open_store(&cli, &config)?);
            let stdin = io::stdin();
            if stdin.is_terminal() {
                println!("{}\n", HELP);
            }

            let sink = LineSink::new(io::stdout(), group);
            let mut repl = Repl::new(session, sink, config.history_display_limit);
            repl.run(stdin.lock()).context("Failed to read input")?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
