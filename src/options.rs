//! Fitting options: the chosen model plus per-parameter constraints.
//!
//! A [`FittingOptions`] value is always replaced as a whole. When the model
//! changes, a fresh value is built with [`FittingOptions::create_default`];
//! per-parameter settings are never carried over between models.
//!
//! Unbounded limits are `None`. They serialize as JSON `null`, so the
//! payload embedded in dataset metadata round-trips without clamping to a
//! numeric extreme.

use crate::error::{FitError, Result};
use crate::models::{ModelCatalog, ModelEntry};
use crate::parameters::{Bounds, Parameter};
use nom::{combinator::all_consuming, number::complete::double, IResult, Parser};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Constraints and starting value for one model parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamOptions {
    /// Held at `initial_guess` during the fit when true
    #[serde(default)]
    pub fixed: bool,

    #[serde(default)]
    pub initial_guess: f64,

    /// `None` means unbounded below
    #[serde(default)]
    pub lower_bound: Option<f64>,

    /// `None` means unbounded above
    #[serde(default)]
    pub upper_bound: Option<f64>,
}

impl Default for ParamOptions {
    fn default() -> Self {
        Self {
            fixed: false,
            initial_guess: 0.0,
            lower_bound: None,
            upper_bound: None,
        }
    }
}

impl ParamOptions {
    /// A free parameter starting at `initial_guess`, without bounds.
    pub fn free(initial_guess: f64) -> Self {
        Self {
            initial_guess,
            ..Self::default()
        }
    }

    /// A parameter held at `value`.
    pub fn fixed_at(value: f64) -> Self {
        Self {
            fixed: true,
            initial_guess: value,
            ..Self::default()
        }
    }

    /// Builder-style bounds setter.
    pub fn with_bounds(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    /// Solver bounds for these options.
    pub fn bounds(&self) -> Result<Bounds> {
        Ok(Bounds::from_limits(self.lower_bound, self.upper_bound)?)
    }

    /// Check bound order and, for free parameters, the initial guess.
    pub fn check(&self, name: &str) -> Result<()> {
        let order_error = |message: String| FitError::BoundOrderError {
            name: name.to_string(),
            message,
        };

        if !self.initial_guess.is_finite() {
            return Err(order_error(format!(
                "initial guess {} is not finite",
                self.initial_guess
            )));
        }

        for bound in [self.lower_bound, self.upper_bound].into_iter().flatten() {
            if bound.is_nan() {
                return Err(order_error("bound is NaN".to_string()));
            }
        }

        if let (Some(lower), Some(upper)) = (self.lower_bound, self.upper_bound) {
            if lower > upper {
                return Err(order_error(format!(
                    "lower bound {} exceeds upper bound {}",
                    lower, upper
                )));
            }
        }

        if !self.fixed {
            if let Some(lower) = self.lower_bound {
                if self.initial_guess < lower {
                    return Err(order_error(format!(
                        "initial guess {} is below lower bound {}",
                        self.initial_guess, lower
                    )));
                }
            }
            if let Some(upper) = self.upper_bound {
                if self.initial_guess > upper {
                    return Err(order_error(format!(
                        "initial guess {} is above upper bound {}",
                        self.initial_guess, upper
                    )));
                }
            }
        }

        Ok(())
    }

    /// The solver parameter for these options.
    ///
    /// Fixed parameters drop their bounds: the solver never moves them.
    pub fn to_parameter(&self, name: &str) -> Result<Parameter> {
        if self.fixed {
            Ok(Parameter::fixed(name, self.initial_guess))
        } else {
            Ok(Parameter::with_bounds(name, self.initial_guess, self.bounds()?)?)
        }
    }
}

/// A model selection plus the options of each of its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittingOptions {
    /// `"category.name"`
    pub model: String,

    pub parameters: BTreeMap<String, ParamOptions>,
}

impl FittingOptions {
    /// Options for `entry` with every parameter free, unbounded and starting at 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use fitnode_rs::models::ModelCatalog;
    /// use fitnode_rs::options::FittingOptions;
    ///
    /// let entry = ModelCatalog::builtin().resolve("ExperimentFunctions.T1_Decay").unwrap();
    /// let options = FittingOptions::create_default(entry);
    /// assert_eq!(options.model, "ExperimentFunctions.T1_Decay");
    /// assert!(options.validate(entry).is_ok());
    /// ```
    pub fn create_default(entry: &ModelEntry) -> Self {
        Self {
            model: entry.qualified_name(),
            parameters: entry
                .parameter_names()
                .iter()
                .map(|name| (name.clone(), ParamOptions::default()))
                .collect(),
        }
    }

    /// Builder-style replacement of one parameter's options.
    pub fn with_param(mut self, name: &str, options: ParamOptions) -> Self {
        self.parameters.insert(name.to_string(), options);
        self
    }

    pub fn param(&self, name: &str) -> Option<&ParamOptions> {
        self.parameters.get(name)
    }

    /// Check these options against the catalog entry they will be used with.
    pub fn validate(&self, entry: &ModelEntry) -> Result<()> {
        let expected: BTreeSet<&str> = entry.parameter_names().iter().map(String::as_str).collect();
        let found: BTreeSet<&str> = self.parameters.keys().map(String::as_str).collect();

        if expected != found {
            return Err(FitError::ParameterSetMismatch {
                model: self.model.clone(),
                expected: entry.parameter_names().to_vec(),
                found: self.parameters.keys().cloned().collect(),
            });
        }

        for name in entry.parameter_names() {
            if let Some(options) = self.parameters.get(name) {
                options.check(name)?;
            }
        }

        Ok(())
    }

    /// Resolve the model in `catalog` and validate against it.
    pub fn resolve<'a>(&self, catalog: &'a ModelCatalog) -> Result<&'a ModelEntry> {
        let entry = catalog.resolve(&self.model)?;
        self.validate(entry)?;
        Ok(entry)
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        Ok(Self::deserialize(value)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn float(input: &str) -> IResult<&str, f64> {
    all_consuming(double).parse(input)
}

/// Parse a user-typed value (initial guess) strictly.
///
/// Only a plain decimal or scientific float is accepted.
///
/// # Examples
///
/// ```
/// use fitnode_rs::options::parse_value;
///
/// assert_eq!(parse_value(" 2.5e-3 ").unwrap(), 2.5e-3);
/// assert!(parse_value("2 * pi").is_err());
/// assert!(parse_value("").is_err());
/// ```
pub fn parse_value(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    match float(trimmed) {
        Ok((_, value)) if value.is_finite() => Ok(value),
        _ => Err(FitError::InvalidNumber(text.to_string())),
    }
}

/// Parse a user-typed bound strictly; `None` means unbounded.
///
/// Empty text, `none`, and infinities of either sign denote no bound.
///
/// # Examples
///
/// ```
/// use fitnode_rs::options::parse_bound;
///
/// assert_eq!(parse_bound("10").unwrap(), Some(10.0));
/// assert_eq!(parse_bound("-inf").unwrap(), None);
/// assert_eq!(parse_bound("").unwrap(), None);
/// assert!(parse_bound("1e").is_err());
/// ```
pub fn parse_bound(text: &str) -> Result<Option<f64>> {
    let trimmed = text.trim();
    let unsigned = trimmed.trim_start_matches(['+', '-']);
    let is_infinity = unsigned.len() + 1 >= trimmed.len()
        && (unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity"));
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") || is_infinity {
        return Ok(None);
    }

    match float(trimmed) {
        Ok((_, value)) if value.is_infinite() => Ok(None),
        Ok((_, value)) if value.is_finite() => Ok(Some(value)),
        _ => Err(FitError::InvalidNumber(text.to_string())),
    }
}
