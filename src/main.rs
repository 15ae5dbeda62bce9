use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rust_sqlite::Table;
use rust_sqlite::repl::{self, ReplError};
use tracing_subscriber::EnvFilter;

/// A tiny single-table database with a `db > ` prompt.
#[derive(Parser, Debug)]
#[command(name = "rust-sqlite")]
#[command(version)]
struct Cli {
    /// Database file; created if it does not exist
    db_path: PathBuf,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout belongs to the prompt.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let table = match Table::open(&cli.db_path) {
        Ok(table) => table,
        Err(err) => {
            tracing::error!(path = %cli.db_path.display(), %err, "unable to open database");
            eprintln!("Unable to open file: {err}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Welcome to db: {}", cli.db_path.display());

    match repl::run(table, io::stdin().lock(), io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match &err {
                ReplError::Storage(_) => tracing::error!(%err, "fatal storage error"),
                ReplError::Terminal(_) => tracing::error!(%err, "terminal closed"),
            }
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
