//! Error types.
//!
//! Typed errors live close to the stage that produces them; `AppError` is the
//! single value the binary turns into a process exit code.

use thiserror::Error;

/// Exit code for every run-level failure (fetch, missing table, failed write).
pub const EXIT_FAILURE: u8 = 1;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::new(EXIT_FAILURE, err.to_string())
    }
}

/// Why a single rate record could not be constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("invalid {field} rate '{value}'")]
    InvalidRate { field: &'static str, value: String },
}

/// Fatal conditions that stop a run before anything is written.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("no table containing '{marker}' found on the source page")]
    TableNotFound { marker: String },

    #[error("failed to parse source page: {0}")]
    TableParse(String),

    #[error("rate table contained no valid records ({rows} rows read)")]
    NoRecords { rows: usize },
}

/// A write that could not be completed.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("refusing to write an empty partition for {0}")]
    EmptyPartition(i32),
}

impl From<tempfile::PersistError> for PersistError {
    fn from(err: tempfile::PersistError) -> Self {
        PersistError::Io(err.error)
    }
}
