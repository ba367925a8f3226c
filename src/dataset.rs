//! Dataset boundary consumed and produced by the fit stage.
//!
//! A dataset maps field names to values plus the names of the axes the values
//! depend on. Fields without axes that some other field depends on are the
//! independent axes; fields with axes are dependents. Datasets are treated as
//! copy-on-write: every transformation works on a clone of its input.

use crate::error::{FitError, Result};
use ndarray::Array1;
use serde_json::Value;
use std::collections::BTreeMap;

/// Reserved metadata key carrying serialized [`FittingOptions`](crate::options::FittingOptions)
/// for downstream stages to adopt as defaults.
///
/// A fitted output also carries the `fit` field as a second dependent, so a
/// downstream stage only reads this entry once that field has been dropped
/// (see [`DataDict::remove_field`]).
pub const FITTING_OPTIONS_KEY: &str = "__fitting_options__";

/// The capabilities the fit engine needs from a dataset.
pub trait Dataset: Clone {
    /// Independent axis names, in order of first use by a dependent.
    fn axes(&self) -> Vec<String>;

    /// Dependent field names.
    fn dependents(&self) -> Vec<String>;

    /// Values of a field.
    fn values_of(&self, name: &str) -> Result<Array1<f64>>;

    /// Add or replace a field.
    fn set_field(&mut self, name: &str, values: Array1<f64>, axes: Vec<String>);

    /// Add or replace a metadata entry.
    fn add_meta(&mut self, key: &str, value: Value);

    fn meta(&self, key: &str) -> Option<&Value>;
}

/// One field of a [`DataDict`].
#[derive(Debug, Clone, PartialEq)]
pub struct DataField {
    pub values: Array1<f64>,

    /// Axes this field depends on; empty for an independent axis
    pub axes: Vec<String>,
}

/// An in-memory dataset of named one-dimensional fields with JSON metadata.
///
/// # Examples
///
/// ```
/// use fitnode_rs::dataset::{DataDict, Dataset};
/// use ndarray::array;
///
/// let data = DataDict::new()
///     .with_axis("time", array![0.0, 1.0, 2.0])
///     .with_dependent("signal", array![1.0, 0.5, 0.25], &["time"]);
///
/// assert_eq!(data.axes(), vec!["time"]);
/// assert_eq!(data.dependents(), vec!["signal"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataDict {
    fields: BTreeMap<String, DataField>,
    meta: BTreeMap<String, Value>,
}

impl DataDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style independent axis.
    pub fn with_axis(mut self, name: &str, values: Array1<f64>) -> Self {
        self.set_field(name, values, Vec::new());
        self
    }

    /// Builder-style dependent field.
    pub fn with_dependent(mut self, name: &str, values: Array1<f64>, axes: &[&str]) -> Self {
        self.set_field(name, values, axes.iter().map(|a| a.to_string()).collect());
        self
    }

    /// Builder-style metadata entry.
    pub fn with_meta(mut self, key: &str, value: Value) -> Self {
        self.add_meta(key, value);
        self
    }

    pub fn field(&self, name: &str) -> Option<&DataField> {
        self.fields.get(name)
    }

    /// Drop a field, returning it if present.
    pub fn remove_field(&mut self, name: &str) -> Option<DataField> {
        self.fields.remove(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn meta_keys(&self) -> impl Iterator<Item = &str> {
        self.meta.keys().map(String::as_str)
    }
}

impl Dataset for DataDict {
    fn axes(&self) -> Vec<String> {
        let mut axes: Vec<String> = Vec::new();
        for field in self.fields.values() {
            for axis in &field.axes {
                if !axes.contains(axis) {
                    axes.push(axis.clone());
                }
            }
        }
        axes
    }

    fn dependents(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(_, field)| !field.axes.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn values_of(&self, name: &str) -> Result<Array1<f64>> {
        self.fields
            .get(name)
            .map(|field| field.values.clone())
            .ok_or_else(|| FitError::FieldNotFound(name.to_string()))
    }

    fn set_field(&mut self, name: &str, values: Array1<f64>, axes: Vec<String>) {
        self.fields
            .insert(name.to_string(), DataField { values, axes });
    }

    fn add_meta(&mut self, key: &str, value: Value) {
        self.meta.insert(key.to_string(), value);
    }

    fn meta(&self, key: &str) -> Option<&Value> {
        self.meta.get(key)
    }
}
