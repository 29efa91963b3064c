//! Command-line parsing for the LPR sync tool.
//!
//! Argument parsing stays separate from the pipeline; `app` turns a parsed
//! `Cli` into an `UpdateConfig`.

use std::path::PathBuf;

use clap::Parser;

use crate::domain::DEFAULT_SOURCE_URL;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "lpr", version, about = "Fetch the LPR table and keep per-year history files up to date")]
pub struct Cli {
    /// Rewrite every fetched year, ignoring the freshness check and stored data.
    #[arg(long, conflicts_with = "incremental_only")]
    pub force: bool,

    /// Only write years that changed (the default, stated explicitly).
    #[arg(long)]
    pub incremental_only: bool,

    /// Page that publishes the LPR table.
    #[arg(long, env = "LPR_SOURCE_URL", default_value = DEFAULT_SOURCE_URL)]
    pub url: String,

    /// Directory for the aggregate LPR_Data.{json,csv,txt} files.
    #[arg(long, env = "LPR_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Directory for per-year files (default: <data-dir>/yearly_data).
    #[arg(long, env = "LPR_YEARLY_DIR")]
    pub yearly_dir: Option<PathBuf>,

    /// HTTP timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Debug-level logging.
    #[arg(short, long)]
    pub verbose: bool,
}
