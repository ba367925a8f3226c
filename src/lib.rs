//! # fitnode-rs
//!
//! `fitnode-rs` is the fitting stage of a one-dimensional data pipeline: pick
//! a model from a registry, configure its parameters, and fit it to incoming
//! datasets with a Levenberg-Marquardt solver.
//!
//! The library provides:
//! - A static model registry with generic, experiment and peak models
//! - Fitting options (initial guess, fixed flag, optional bounds) with
//!   validation, strict text parsing and JSON round-tripping
//! - An options transport contract for interactive editors, with a headless
//!   editor implementation
//! - A fit engine that returns a copy of the dataset with the best fit added
//! - A processing stage owning the active options and notifying listeners
//!
//! ## Basic Usage
//!
//! ```
//! use fitnode_rs::dataset::{DataDict, Dataset};
//! use fitnode_rs::stage::FittingStage;
//! use fitnode_rs::transport::{EditorState, OptionsEditor};
//! use ndarray::Array1;
//!
//! let x = Array1::linspace(0.0, 10.0, 51);
//! let y = x.mapv(|t: f64| 1.2 * (-t / 4.0).exp());
//! let data = DataDict::new()
//!     .with_axis("delay", x)
//!     .with_dependent("population", y, &["delay"]);
//!
//! let mut editor = EditorState::new();
//! editor.select_model("ExperimentFunctions.T1_Decay").unwrap();
//! editor.set_initial_guess("amp", 1.0).unwrap();
//! editor.set_initial_guess("tau", 2.0).unwrap();
//!
//! let mut stage = FittingStage::new();
//! stage.pull_from(&editor).unwrap();
//!
//! let output = stage.process(&data).unwrap();
//! assert!(output.values_of("fit").is_ok());
//! assert!(output.meta("fit_report").is_some());
//! ```

pub mod error;

// Parameter system
pub mod parameters;

mod utils;

pub mod problem;

pub mod lm;

pub mod model;

pub mod models;

pub mod options;

pub mod dataset;

pub mod notify;

pub mod transport;

pub mod engine;

pub mod stage;

// Re-exports for convenience
pub use error::{FitError, Result};

pub use dataset::{DataDict, Dataset, FITTING_OPTIONS_KEY};
pub use engine::{EngineConfig, FitEngine};
pub use lm::LevenbergMarquardt;
pub use model::{LmFitter, NanPolicy, Optimizer};
pub use models::{ModelCatalog, ModelEntry};
pub use options::{FittingOptions, ParamOptions};
pub use problem::Problem;
pub use stage::{FittingStage, StageEvent};
pub use transport::{EditorState, OptionsEditor};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
