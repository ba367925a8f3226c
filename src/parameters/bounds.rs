//! Parameter bounds and the Minuit-style bound transformation.
//!
//! The solver works on unconstrained *internal* values. Each bounded
//! parameter maps its internal value onto the allowed interval, so every
//! trial point the optimizer proposes is feasible.

use std::f64::{INFINITY, NEG_INFINITY};
use thiserror::Error;

/// Errors that can occur when working with parameter bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("Invalid bounds: min ({min}) must not exceed max ({max})")]
    InvalidBounds { min: f64, max: f64 },

    #[error("Parameter value {value} is outside bounds: [{min}, {max}]")]
    ValueOutsideBounds { value: f64, min: f64, max: f64 },

    #[error("Non-finite parameter value is not allowed")]
    InfiniteValue,
}

/// Inclusive bounds on a solver parameter.
///
/// A missing bound is stored as the matching signed infinity, never as
/// `f64::MAX`, so a finite bound at the numeric extreme stays a real bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum allowed value for the parameter
    pub min: f64,

    /// Maximum allowed value for the parameter
    pub max: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: NEG_INFINITY,
            max: INFINITY,
        }
    }
}

impl Bounds {
    /// Create bounds, failing if `min > max` or either limit is NaN.
    ///
    /// # Examples
    ///
    /// ```
    /// use fitnode_rs::parameters::Bounds;
    ///
    /// let bounds = Bounds::new(0.0, 10.0).unwrap();
    /// assert_eq!(bounds.min, 0.0);
    /// assert!(Bounds::new(10.0, 0.0).is_err());
    /// ```
    pub fn new(min: f64, max: f64) -> Result<Self, BoundsError> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(BoundsError::InvalidBounds { min, max });
        }

        Ok(Self { min, max })
    }

    /// Create bounds from optional limits, `None` meaning unbounded on that side.
    pub fn from_limits(min: Option<f64>, max: Option<f64>) -> Result<Self, BoundsError> {
        Self::new(min.unwrap_or(NEG_INFINITY), max.unwrap_or(INFINITY))
    }

    /// Bounds from negative to positive infinity.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Check if a value is within the bounds (inclusive).
    pub fn is_within_bounds(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// `true` if min is finite
    pub fn has_lower_bound(&self) -> bool {
        self.min.is_finite()
    }

    /// `true` if max is finite
    pub fn has_upper_bound(&self) -> bool {
        self.max.is_finite()
    }

    /// The lower limit, or `None` when unbounded below.
    pub fn lower(&self) -> Option<f64> {
        self.has_lower_bound().then_some(self.min)
    }

    /// The upper limit, or `None` when unbounded above.
    pub fn upper(&self) -> Option<f64> {
        self.has_upper_bound().then_some(self.max)
    }

    /// Clamp a value to be within the bounds.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Maps between external (bounded) and internal (unbounded) parameter values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsTransform {
    bounds: Bounds,
}

impl BoundsTransform {
    pub fn new(bounds: Bounds) -> Self {
        Self { bounds }
    }

    /// Transform an internal value to an external value within bounds.
    ///
    /// The result is clamped: `min - 1 + sqrt(1)` need not round back to `min`.
    pub fn to_external(&self, internal_value: f64) -> f64 {
        let external = match (self.bounds.has_lower_bound(), self.bounds.has_upper_bound()) {
            (false, false) => internal_value,
            (true, false) => self.bounds.min - 1.0 + (internal_value * internal_value + 1.0).sqrt(),
            (false, true) => self.bounds.max + 1.0 - (internal_value * internal_value + 1.0).sqrt(),
            (true, true) => {
                let range = self.bounds.max - self.bounds.min;
                self.bounds.min + (internal_value.sin() + 1.0) * range / 2.0
            }
        };
        self.bounds.clamp(external)
    }

    /// Transform an external value to the internal value the solver starts from.
    pub fn to_internal(&self, external_value: f64) -> Result<f64, BoundsError> {
        if !external_value.is_finite() {
            return Err(BoundsError::InfiniteValue);
        }

        if !self.bounds.is_within_bounds(external_value) {
            return Err(BoundsError::ValueOutsideBounds {
                value: external_value,
                min: self.bounds.min,
                max: self.bounds.max,
            });
        }

        let internal = match (self.bounds.has_lower_bound(), self.bounds.has_upper_bound()) {
            (false, false) => external_value,
            (true, false) => ((external_value - self.bounds.min + 1.0).powi(2) - 1.0).sqrt(),
            (false, true) => ((self.bounds.max - external_value + 1.0).powi(2) - 1.0).sqrt(),
            (true, true) => {
                let range = self.bounds.max - self.bounds.min;
                if range == 0.0 {
                    0.0
                } else {
                    (2.0 * (external_value - self.bounds.min) / range - 1.0)
                        .clamp(-1.0, 1.0)
                        .asin()
                }
            }
        };

        Ok(internal)
    }
}
