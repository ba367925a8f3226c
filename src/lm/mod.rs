//! Levenberg-Marquardt algorithm implementation.
//!
//! The default solver behind [`crate::model::LmFitter`]; it works on any
//! [`crate::problem::Problem`].

pub mod algorithm;
pub mod config;

// Re-export key types
pub use algorithm::{LevenbergMarquardt, LmResult};
pub use config::LmConfig;
