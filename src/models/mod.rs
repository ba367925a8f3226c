//! Model registry.
//!
//! Every model function is registered once, under a category, together with
//! its formal argument list. The first argument is the independent variable;
//! the rest become the model's parameter names. The built-in catalog is built
//! on first use and is read-only afterwards.

use crate::error::{FitError, Result};
use ndarray::Array1;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

mod experiment;
mod generic;
mod peak;

/// A model function: independent value and parameter values, in declaration order.
pub type ModelFn = fn(f64, &[f64]) -> f64;

/// A registered model function.
#[derive(Clone)]
pub struct ModelEntry {
    category: String,
    name: String,
    parameter_names: Vec<String>,
    documentation: String,
    evaluate: ModelFn,
}

impl ModelEntry {
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `"category.name"`, the form stored in fitting options.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.category, self.name)
    }

    /// Parameter names in declaration order, without the independent variable.
    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    /// Evaluate the model at a single point.
    pub fn eval(&self, x: f64, params: &[f64]) -> Result<f64> {
        self.check_arity(params)?;
        Ok((self.evaluate)(x, params))
    }

    /// Evaluate the model at every point of `x`.
    pub fn eval_array(&self, x: &Array1<f64>, params: &[f64]) -> Result<Array1<f64>> {
        self.check_arity(params)?;
        Ok(x.mapv(|x_val| (self.evaluate)(x_val, params)))
    }

    fn check_arity(&self, params: &[f64]) -> Result<()> {
        if params.len() != self.parameter_names.len() {
            return Err(FitError::DimensionMismatch(format!(
                "Model '{}' takes {} parameters, got {}",
                self.qualified_name(),
                self.parameter_names.len(),
                params.len()
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for ModelEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelEntry")
            .field("category", &self.category)
            .field("name", &self.name)
            .field("parameter_names", &self.parameter_names)
            .finish()
    }
}

/// A catalog of named, categorized model functions.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    entries: Vec<ModelEntry>,
}

static BUILTIN: OnceLock<ModelCatalog> = OnceLock::new();

impl ModelCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog holding every built-in category.
    pub fn with_builtin_models() -> Result<Self> {
        let mut catalog = Self::new();
        generic::register(&mut catalog)?;
        experiment::register(&mut catalog)?;
        peak::register(&mut catalog)?;
        Ok(catalog)
    }

    /// The process-wide built-in catalog.
    ///
    /// # Panics
    ///
    /// Panics on first use if a built-in registration is malformed; the
    /// registry is fixed at build time, so this is an initialization failure.
    pub fn builtin() -> &'static ModelCatalog {
        BUILTIN.get_or_init(|| {
            Self::with_builtin_models()
                .unwrap_or_else(|err| panic!("invalid built-in model registry: {}", err))
        })
    }

    /// Register a model function.
    ///
    /// `signature` lists the formal arguments, independent variable first.
    ///
    /// # Examples
    ///
    /// ```
    /// use fitnode_rs::models::ModelCatalog;
    ///
    /// fn line(x: f64, p: &[f64]) -> f64 {
    ///     p[0] * x + p[1]
    /// }
    ///
    /// let mut catalog = ModelCatalog::new();
    /// catalog
    ///     .register("Basic", "Line", &["x", "slope", "offset"], "slope * x + offset", line)
    ///     .unwrap();
    ///
    /// let entry = catalog.resolve("Basic.Line").unwrap();
    /// assert_eq!(entry.parameter_names(), ["slope", "offset"]);
    ///
    /// // A function needs at least one parameter besides x
    /// assert!(catalog.register("Basic", "Bad", &["x"], "", line).is_err());
    /// ```
    pub fn register(
        &mut self,
        category: &str,
        name: &str,
        signature: &[&str],
        documentation: &str,
        evaluate: ModelFn,
    ) -> Result<()> {
        if category.is_empty() || name.is_empty() || category.contains('.') {
            return Err(FitError::InvalidRegistry(format!(
                "invalid model name '{}.{}'",
                category, name
            )));
        }

        if signature.len() < 2 {
            return Err(FitError::InvalidRegistry(format!(
                "model '{}.{}' needs an independent variable and at least one parameter",
                category, name
            )));
        }

        if self.get(category, name).is_some() {
            return Err(FitError::InvalidRegistry(format!(
                "model '{}.{}' registered twice",
                category, name
            )));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = signature.iter().find(|arg| !seen.insert(**arg)) {
            return Err(FitError::InvalidRegistry(format!(
                "model '{}.{}' repeats argument '{}'",
                category, name, dup
            )));
        }

        self.entries.push(ModelEntry {
            category: category.to_string(),
            name: name.to_string(),
            parameter_names: signature[1..].iter().map(|s| s.to_string()).collect(),
            documentation: documentation.to_string(),
            evaluate,
        });

        Ok(())
    }

    /// Look up a model by category and name.
    pub fn get(&self, category: &str, name: &str) -> Option<&ModelEntry> {
        self.entries
            .iter()
            .find(|e| e.category == category && e.name == name)
    }

    /// Resolve a `"category.name"` string, or a bare name if it is unique.
    ///
    /// # Examples
    ///
    /// ```
    /// use fitnode_rs::models::ModelCatalog;
    ///
    /// let catalog = ModelCatalog::builtin();
    /// let entry = catalog.resolve("GenericFunctions.Sinusoidal").unwrap();
    /// assert_eq!(entry.parameter_names(), ["amp", "omega", "phase"]);
    /// assert!(catalog.resolve("GenericFunctions.Missing").is_err());
    /// ```
    pub fn resolve(&self, model: &str) -> Result<&ModelEntry> {
        match model.split_once('.') {
            Some((category, name)) => self
                .get(category, name)
                .ok_or_else(|| FitError::UnknownModel(model.to_string())),
            None => {
                let matches = self.find_by_name(model);
                match matches.as_slice() {
                    [] => Err(FitError::UnknownModel(model.to_string())),
                    [entry] => Ok(*entry),
                    _ => Err(FitError::DuplicateModel {
                        name: model.to_string(),
                        categories: matches.iter().map(|e| e.category.clone()).collect(),
                    }),
                }
            }
        }
    }

    /// All entries with the given model name, across categories.
    pub fn find_by_name(&self, name: &str) -> Vec<&ModelEntry> {
        self.entries.iter().filter(|e| e.name == name).collect()
    }

    /// Category names in registration order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !categories.contains(&entry.category.as_str()) {
                categories.push(&entry.category);
            }
        }
        categories
    }

    /// Models of one category, in registration order.
    pub fn models_in<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a ModelEntry> + 'a {
        self.entries.iter().filter(move |e| e.category == category)
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
