//! # Parameter System
//!
//! Solver-side parameters: named values with bounds and a vary flag, in the
//! order of the model's argument list.
//!
//! - [`Parameter`]: a single parameter with value, bounds and varying flag
//! - [`Parameters`]: an ordered collection, converted to and from the solver vector
//! - [`Bounds`] and [`BoundsTransform`]: bound handling during optimization
//!
//! ```rust
//! use fitnode_rs::parameters::{Bounds, Parameter, Parameters};
//!
//! let mut params = Parameters::new();
//! params.add(Parameter::new("amp", 1.0)).unwrap();
//! params
//!     .add(Parameter::with_bounds("tau", 2.0, Bounds::new(0.0, 10.0).unwrap()).unwrap())
//!     .unwrap();
//! params.add(Parameter::fixed("phase", 0.0)).unwrap();
//!
//! // Only varying parameters reach the optimizer
//! let internal = params.varying_internal_values().unwrap();
//! assert_eq!(internal.len(), 2);
//! ```

pub mod bounds;
pub mod parameter;
pub mod parameters;

// Re-export key types
pub use bounds::{Bounds, BoundsError, BoundsTransform};
pub use parameter::{Parameter, ParameterError};
pub use parameters::Parameters;
