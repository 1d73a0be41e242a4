#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Code Royale over the referee's stdin/stdout protocol.

mod driver;
mod protocol;
mod report;

use std::{
    fs::File,
    io::{self, BufReader, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Filter applied when neither `--log` nor `RUST_LOG` is set.
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Parser)]
#[command(name = "code-royale", about = "Code Royale bot speaking the referee protocol")]
struct CliArgs {
    /// Replays a recorded referee transcript instead of reading stdin.
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,
    /// Log filter directives, overriding `RUST_LOG`.
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
    /// Writes a JSON report line per turn to stderr.
    #[arg(long)]
    report: bool,
}

/// Entry point for the Code Royale command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log.as_deref())?;

    let output = io::stdout().lock();
    let mut stderr = io::stderr();
    let reports: Option<&mut dyn Write> = if args.report {
        Some(&mut stderr)
    } else {
        None
    };

    let turns = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open transcript {}", path.display()))?;
            driver::run(BufReader::new(file), output, reports)?
        }
        None => driver::run(io::stdin().lock(), output, reports)?,
    };

    tracing::info!(turns, "game over");
    Ok(())
}

fn init_tracing(directives: Option<&str>) -> Result<()> {
    let filter = match directives {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter '{directives}'"))?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}
