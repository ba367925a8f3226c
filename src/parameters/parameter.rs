//! Parameter definition and implementation
//!
//! A [`Parameter`] is what the solver sees for one model argument: a current
//! value, the value it started from, whether it varies, and its bounds.

use crate::parameters::bounds::{Bounds, BoundsError, BoundsTransform};
use thiserror::Error;

/// Errors that can occur when working with parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Bounds error: {0}")]
    BoundsError(#[from] BoundsError),

    #[error("Parameter '{name}' not found")]
    ParameterNotFound { name: String },

    #[error("Parameter '{name}' already exists")]
    DuplicateParameter { name: String },

    #[error("Expected {expected} values for varying parameters, got {found}")]
    ValueCountMismatch { expected: usize, found: usize },
}

/// A named solver parameter with bounds and a vary flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    value: f64,
    init_value: f64,
    vary: bool,
    bounds: Bounds,
}

impl Parameter {
    /// Create a free, unbounded parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use fitnode_rs::parameters::Parameter;
    ///
    /// let param = Parameter::new("amp", 1.0);
    /// assert_eq!(param.name(), "amp");
    /// assert!(param.vary());
    /// ```
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            init_value: value,
            vary: true,
            bounds: Bounds::default(),
        }
    }

    /// Create a free parameter whose value must lie within `bounds`.
    ///
    /// Unlike a silent clamp, a starting value outside the bounds is rejected.
    pub fn with_bounds(name: &str, value: f64, bounds: Bounds) -> Result<Self, ParameterError> {
        if !bounds.is_within_bounds(value) {
            return Err(ParameterError::BoundsError(BoundsError::ValueOutsideBounds {
                value,
                min: bounds.min,
                max: bounds.max,
            }));
        }

        Ok(Self {
            bounds,
            ..Self::new(name, value)
        })
    }

    /// Create a parameter held at `value` during optimization.
    ///
    /// Fixed parameters carry no bounds: the solver never moves them.
    pub fn fixed(name: &str, value: f64) -> Self {
        Self {
            vary: false,
            ..Self::new(name, value)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// The value the parameter was created with (its initial guess).
    pub fn init_value(&self) -> f64 {
        self.init_value
    }

    pub fn vary(&self) -> bool {
        self.vary
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Set the value, rejecting values outside the bounds.
    pub fn set_value(&mut self, value: f64) -> Result<(), ParameterError> {
        if !self.bounds.is_within_bounds(value) {
            return Err(ParameterError::BoundsError(BoundsError::ValueOutsideBounds {
                value,
                min: self.bounds.min,
                max: self.bounds.max,
            }));
        }

        self.value = value;
        Ok(())
    }

    /// Convert the current value to the solver's internal coordinate.
    pub fn to_internal(&self) -> Result<f64, ParameterError> {
        BoundsTransform::new(self.bounds)
            .to_internal(self.value)
            .map_err(ParameterError::from)
    }

    /// Convert an internal solver coordinate back to a parameter value.
    pub fn from_internal(&self, internal_value: f64) -> f64 {
        BoundsTransform::new(self.bounds).to_external(internal_value)
    }
}
