//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - validated rate records and year partitions (`types`)
//! - reconciliation decisions (`types`)
//! - on-disk file schemas and timestamps (`files`)
//! - run configuration (`config`)

pub mod config;
pub mod files;
pub mod types;

pub use config::*;
pub use files::*;
pub use types::*;
