//! Reporting utilities: the human-readable console report.

pub mod format;

pub use format::*;
