//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - typed keys for the two indexes (`StationId`, `DateKey`)
//! - parsed observations and the per-station / per-date series
//! - the rule set and run configuration (`RuleSet`, `AnalysisConfig`)

pub mod types;

pub use types::*;
