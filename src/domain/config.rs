use std::path::PathBuf;
use std::time::Duration;

/// Default source page publishing the LPR table.
pub const DEFAULT_SOURCE_URL: &str =
    "https://www.bankofchina.com/fimarkets/lilv/fd32/201310/t20131031_2591219.html";

/// The source page blocks obvious non-browser clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Text that identifies the rate table among all tables on the page.
pub const TABLE_MARKER: &str = "LPR";

/// How a run decides what to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Freshness gate first, then incremental reconciliation.
    Auto,
    /// Skip the freshness gate and rewrite every fetched year.
    Force,
    /// Explicitly incremental; behaves like `Auto`.
    IncrementalOnly,
}

impl RunMode {
    pub fn is_force(self) -> bool {
        matches!(self, RunMode::Force)
    }
}

/// Resolved settings for one `lpr` run.
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    pub source_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Directory holding `LPR_Data.{json,csv,txt}`.
    pub data_dir: PathBuf,
    /// Directory holding `LPR_Data_<year>.{json,csv}`.
    pub yearly_dir: PathBuf,
    pub mode: RunMode,
}

impl UpdateConfig {
    pub fn with_defaults(data_dir: PathBuf) -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            yearly_dir: data_dir.join("yearly_data"),
            data_dir,
            mode: RunMode::Auto,
        }
    }
}
