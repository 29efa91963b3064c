//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - wires the HTTP fetcher and file stores into the pipeline
//! - prints the run summary and maps the outcome to success/failure

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::cli::Cli;
use crate::data::{Clock, HttpFetcher, SystemClock};
use crate::domain::{RunMode, UpdateConfig};
use crate::error::{AppError, EXIT_FAILURE};
use crate::io::{AggregateStore, YearlyStore};

pub mod pipeline;

use pipeline::{Collaborators, RunOutcome};

/// Entry point for the `lpr` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = update_config_from_args(&cli);
    let clock = SystemClock;
    println!("{}", crate::report::format_run_header(config.mode, clock.now()));

    let fetcher = HttpFetcher::from_config(&config)?;
    let partitions = YearlyStore::new(&config.yearly_dir);
    let state = AggregateStore::new(&config.data_dir);
    let deps = Collaborators {
        fetcher: &fetcher,
        partitions: &partitions,
        state: &state,
        clock: &clock,
    };

    match pipeline::run_update(config.mode, &deps)? {
        RunOutcome::Skipped { last_updated } => {
            println!("{}", crate::report::format_skipped(last_updated));
            Ok(())
        }
        RunOutcome::Completed(summary) => {
            println!("{}", crate::report::format_run_summary(&summary));
            if summary.is_success() {
                Ok(())
            } else {
                Err(AppError::new(EXIT_FAILURE, "Some LPR files could not be written."))
            }
        }
    }
}

/// `RUST_LOG` wins; otherwise info (or debug with `--verbose`) for this crate.
fn init_logging(verbose: bool) {
    let default = if verbose { "lpr_sync=debug" } else { "lpr_sync=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

pub fn update_config_from_args(cli: &Cli) -> UpdateConfig {
    let mode = if cli.force {
        RunMode::Force
    } else if cli.incremental_only {
        RunMode::IncrementalOnly
    } else {
        RunMode::Auto
    };

    let mut config = UpdateConfig::with_defaults(cli.data_dir.clone());
    config.source_url = cli.url.clone();
    config.timeout = Duration::from_secs(cli.timeout_secs);
    config.mode = mode;
    if let Some(dir) = &cli.yearly_dir {
        config.yearly_dir = dir.clone();
    }
    config
}
