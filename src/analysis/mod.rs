//! Analysis stages, in pipeline order.
//!
//! Each stage borrows the previous stage's output and returns a new value:
//!
//! - `index`: outlier filter + station/date indexes + date pruning
//! - `stations`: per-station means over the observation threshold
//! - `country`: per-date means and the national reference mean
//! - `hypothesis`: quartiles, confidence interval, t-test, normality
//! - `normalize`: station totals extrapolated to a common count

pub mod country;
pub mod hypothesis;
pub mod index;
pub mod normalize;
pub mod stations;

pub use country::*;
pub use hypothesis::*;
pub use index::*;
pub use normalize::*;
pub use stations::*;
