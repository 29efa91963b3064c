//! Input/output helpers.
//!
//! - table rows -> rate records (`ingest`)
//! - per-year files (`yearly`)
//! - aggregate files and run state (`aggregate`)
//! - approved-partition writes with per-year isolation (`writer`)
//! - temp-file-and-rename replacement (`atomic`)

pub mod aggregate;
pub mod atomic;
pub mod ingest;
pub mod writer;
pub mod yearly;

pub use aggregate::*;
pub use ingest::*;
pub use writer::*;
pub use yearly::*;
