//! The reconciliation engine.
//!
//! - freshness gate: is a fetch warranted at all (`freshness`)
//! - year partitioning of fetched records (`partition`)
//! - per-year comparison against stored data (`compare`)

pub mod compare;
pub mod freshness;
pub mod partition;

pub use compare::*;
pub use freshness::*;
pub use partition::*;
