//! Input/output helpers.
//!
//! - CSV ingest + row validation (`ingest`)
//! - cleaned-row cache (`cache`)
//! - result exports (CSV/JSON) (`export`)

pub mod cache;
pub mod export;
pub mod ingest;

pub use cache::*;
pub use export::*;
pub use ingest::*;
