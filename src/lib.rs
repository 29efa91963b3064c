//! `lpr-sync` library crate.
//!
//! The binary (`lpr`) is a thin wrapper around this library so that:
//!
//! - the reconciliation engine is testable without network or processes
//! - collaborators (fetch, storage, clock) can be swapped in tests
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod reconcile;
pub mod report;
