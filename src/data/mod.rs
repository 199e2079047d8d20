//! Synthetic input data for demos and end-to-end tests.

pub mod synthetic;

pub use synthetic::*;
