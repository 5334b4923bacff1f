//! benchdiff - statistical before/after comparison of benchmark timings
//!
//! This library groups raw timing samples by test case, removes outliers,
//! and decides with a two-sample hypothesis test whether each test case
//! regressed, improved or stayed the same. It also provides the sampling
//! side: convergence checks and adaptive parameter selection for the loop
//! that produces the timings.

pub mod adaptive_sampler;
pub mod cli;
pub mod config;
pub mod convergence;
pub mod distributions;
pub mod error;
pub mod hypothesis;
pub mod json_output;
pub mod outlier;
pub mod regression;
pub mod search;
pub mod stats;
pub mod test_case_id;

pub use error::{Result, StatsError};
