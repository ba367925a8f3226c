//! Parameters collection implementation
//!
//! [`Parameters`] keeps parameters in insertion order, which is the order of
//! the model's argument list. The solver vector holds the internal values of
//! the varying parameters, in that same order.

use crate::parameters::parameter::{Parameter, ParameterError};

/// An ordered collection of solver parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    params: Vec<Parameter>,
}

impl Parameters {
    /// Create a new empty parameters collection
    ///
    /// # Examples
    ///
    /// ```
    /// use fitnode_rs::parameters::{Parameter, Parameters};
    ///
    /// let mut params = Parameters::new();
    /// params.add(Parameter::new("amp", 1.0)).unwrap();
    /// params.add(Parameter::fixed("phase", 0.0)).unwrap();
    /// assert_eq!(params.len(), 2);
    /// assert_eq!(params.varying_count(), 1);
    /// ```
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Append a parameter; names must be unique.
    pub fn add(&mut self, param: Parameter) -> Result<(), ParameterError> {
        if self.contains(param.name()) {
            return Err(ParameterError::DuplicateParameter {
                name: param.name().to_string(),
            });
        }

        self.params.push(param);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate over the parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    /// Parameter names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name().to_string()).collect()
    }

    /// All current values in insertion order, fixed ones included.
    pub fn values(&self) -> Vec<f64> {
        self.params.iter().map(Parameter::value).collect()
    }

    pub fn varying_count(&self) -> usize {
        self.params.iter().filter(|p| p.vary()).count()
    }

    /// Internal (unbounded) values of the varying parameters.
    pub fn varying_internal_values(&self) -> Result<Vec<f64>, ParameterError> {
        self.params
            .iter()
            .filter(|p| p.vary())
            .map(Parameter::to_internal)
            .collect()
    }

    /// Update the varying parameters from internal solver values.
    ///
    /// The update is applied to a copy first, so an error leaves `self` untouched.
    pub fn update_from_internal(&mut self, values: &[f64]) -> Result<(), ParameterError> {
        let expected = self.varying_count();
        if values.len() != expected {
            return Err(ParameterError::ValueCountMismatch {
                expected,
                found: values.len(),
            });
        }

        let mut updated = self.params.clone();
        for (param, &internal) in updated.iter_mut().filter(|p| p.vary()).zip(values) {
            let external = param.from_internal(internal);
            param.set_value(external)?;
        }

        self.params = updated;
        Ok(())
    }
}
