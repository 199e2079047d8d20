//! Mathematical utilities: descriptive statistics and the normality test.

pub mod descriptive;
pub mod normality;

pub use descriptive::*;
pub use normality::*;
