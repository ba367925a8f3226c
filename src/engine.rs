//! The fit engine: one fit attempt per dataset.
//!
//! [`FitEngine::run`] never modifies its input. It returns a copy that is
//! either unchanged (ineligible shape, no options, failed fit) or carries the
//! best-fit field and the fit metadata.

use crate::dataset::{Dataset, FITTING_OPTIONS_KEY};
use crate::error::{FitError, Result};
use crate::model::{LmFitter, NanPolicy, Optimizer};
use crate::models::ModelCatalog;
use crate::options::FittingOptions;
use crate::parameters::Parameters;
use log::{debug, warn};
use serde_json::{Map, Value};
use std::fmt;

/// Configuration of the fit engine output.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Name of the best-fit field. Default: "fit"
    pub fit_field: String,

    /// Metadata key of the textual report. Default: "fit_report"
    pub report_key: String,

    /// Metadata key of the best-fit parameter values. Default: "fit_params"
    pub params_key: String,

    /// Non-finite sample handling. Default: omit
    pub nan_policy: NanPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fit_field: "fit".to_string(),
            report_key: "fit_report".to_string(),
            params_key: "fit_params".to_string(),
            nan_policy: NanPolicy::Omit,
        }
    }
}

impl EngineConfig {
    pub fn with_fit_field(mut self, name: &str) -> Self {
        self.fit_field = name.to_string();
        self
    }

    pub fn with_report_key(mut self, key: &str) -> Self {
        self.report_key = key.to_string();
        self
    }

    pub fn with_params_key(mut self, key: &str) -> Self {
        self.params_key = key.to_string();
        self
    }

    pub fn with_nan_policy(mut self, nan_policy: NanPolicy) -> Self {
        self.nan_policy = nan_policy;
        self
    }
}

/// What a run did with the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// More than one axis or dependent, or none at all
    Ineligible,
    /// No options given and none embedded in the dataset
    NoOptions,
    /// The fit converged; the output carries the fit field
    Fitted,
    /// The optimizer reported failure; the output is an unchanged copy
    FitFailed,
}

/// Result of [`FitEngine::run`].
#[derive(Debug, Clone)]
pub struct EngineOutput<D> {
    pub dataset: D,
    pub status: RunStatus,

    /// Options adopted from the dataset metadata, when none were given
    pub adopted: Option<FittingOptions>,
}

/// Runs fits of catalog models against datasets.
pub struct FitEngine {
    catalog: &'static ModelCatalog,
    optimizer: Box<dyn Optimizer>,
    config: EngineConfig,
}

impl Default for FitEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FitEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FitEngine")
            .field("models", &self.catalog.len())
            .field("method", &self.optimizer.method())
            .field("config", &self.config)
            .finish()
    }
}

impl FitEngine {
    /// Engine over the built-in catalog with the Levenberg-Marquardt fitter.
    pub fn new() -> Self {
        Self {
            catalog: ModelCatalog::builtin(),
            optimizer: Box::new(LmFitter::new()),
            config: EngineConfig::default(),
        }
    }

    pub fn with_catalog(mut self, catalog: &'static ModelCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_optimizer(mut self, optimizer: Box<dyn Optimizer>) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(&self) -> &'static ModelCatalog {
        self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether the dataset has exactly one independent axis and one dependent.
    pub fn is_eligible<D: Dataset>(&self, dataset: &D) -> bool {
        dataset.axes().len() == 1 && dataset.dependents().len() == 1
    }

    /// Read and validate the default options embedded in the dataset metadata.
    ///
    /// Returns `Ok(None)` when the dataset carries no options. An embedded
    /// value that does not deserialize or validate is an error; it is never
    /// adopted blindly.
    pub fn embedded_options<D: Dataset>(&self, dataset: &D) -> Result<Option<FittingOptions>> {
        match dataset.meta(FITTING_OPTIONS_KEY) {
            None => Ok(None),
            Some(value) => {
                let options = FittingOptions::from_value(value)?;
                options.resolve(self.catalog)?;
                Ok(Some(options))
            }
        }
    }

    /// Run one fit attempt.
    ///
    /// Without `options`, the options embedded in the dataset are adopted and
    /// returned in [`EngineOutput::adopted`].
    ///
    /// # Arguments
    ///
    /// * `dataset` - The input; never modified
    /// * `options` - The active options, if any
    ///
    /// # Returns
    ///
    /// * The output dataset and what happened, or a configuration or data
    ///   error. On error the caller still holds the untouched input.
    ///
    /// # Examples
    ///
    /// ```
    /// use fitnode_rs::dataset::{DataDict, Dataset};
    /// use fitnode_rs::engine::{FitEngine, RunStatus};
    /// use fitnode_rs::models::ModelCatalog;
    /// use fitnode_rs::options::{FittingOptions, ParamOptions};
    /// use ndarray::Array1;
    ///
    /// let x = Array1::linspace(0.0, 4.0, 21);
    /// let y = x.mapv(|t: f64| 3.0 * (-t / 1.5).exp());
    /// let data = DataDict::new()
    ///     .with_axis("time", x)
    ///     .with_dependent("signal", y, &["time"]);
    ///
    /// let entry = ModelCatalog::builtin().resolve("ExperimentFunctions.T1_Decay").unwrap();
    /// let options = FittingOptions::create_default(entry)
    ///     .with_param("amp", ParamOptions::free(1.0))
    ///     .with_param("tau", ParamOptions::free(1.0));
    ///
    /// let output = FitEngine::new().run(&data, Some(&options)).unwrap();
    /// assert_eq!(output.status, RunStatus::Fitted);
    /// assert!(output.dataset.values_of("fit").is_ok());
    /// assert!(data.values_of("fit").is_err());
    /// ```
    pub fn run<D: Dataset>(
        &self,
        dataset: &D,
        options: Option<&FittingOptions>,
    ) -> Result<EngineOutput<D>> {
        if !self.is_eligible(dataset) {
            debug!(
                "skipping fit: {} axes, {} dependents",
                dataset.axes().len(),
                dataset.dependents().len()
            );
            return Ok(EngineOutput {
                dataset: dataset.clone(),
                status: RunStatus::Ineligible,
                adopted: None,
            });
        }

        let (options, adopted) = match options {
            Some(options) => (options.clone(), None),
            None => match self.embedded_options(dataset)? {
                Some(embedded) => {
                    debug!("adopting embedded options for {}", embedded.model);
                    (embedded.clone(), Some(embedded))
                }
                None => {
                    return Ok(EngineOutput {
                        dataset: dataset.clone(),
                        status: RunStatus::NoOptions,
                        adopted: None,
                    })
                }
            },
        };

        let (dataset, status) = self.fit(dataset, &options)?;
        Ok(EngineOutput {
            dataset,
            status,
            adopted,
        })
    }

    /// Fit an eligible dataset with the given options.
    fn fit<D: Dataset>(&self, dataset: &D, options: &FittingOptions) -> Result<(D, RunStatus)> {
        let entry = options.resolve(self.catalog)?;

        let axis = dataset
            .axes()
            .into_iter()
            .next()
            .ok_or_else(|| FitError::InvalidInput("dataset has no axis".to_string()))?;
        let dependent = dataset
            .dependents()
            .into_iter()
            .next()
            .ok_or_else(|| FitError::InvalidInput("dataset has no dependent".to_string()))?;

        let x = dataset.values_of(&axis)?;
        let y = dataset.values_of(&dependent)?;
        if x.len() != y.len() {
            return Err(FitError::DimensionMismatch(format!(
                "axis '{}' has {} values, '{}' has {}",
                axis,
                x.len(),
                dependent,
                y.len()
            )));
        }

        let mut params = Parameters::new();
        for name in entry.parameter_names() {
            let param_options = options.param(name).ok_or_else(|| FitError::ParameterSetMismatch {
                model: options.model.clone(),
                expected: entry.parameter_names().to_vec(),
                found: options.parameters.keys().cloned().collect(),
            })?;
            params.add(param_options.to_parameter(name)?)?;
        }

        let outcome = self
            .optimizer
            .fit(entry, &params, &x, &y, self.config.nan_policy)?;

        if !outcome.success {
            warn!(
                "fit of {} to '{}' did not succeed: {}",
                options.model, dependent, outcome.report.message
            );
            return Ok((dataset.clone(), RunStatus::FitFailed));
        }

        let fitted_values: Map<String, Value> = outcome
            .params
            .iter()
            .map(|p| (p.name().to_string(), Value::from(p.value())))
            .collect();

        let mut output = dataset.clone();
        output.set_field(&self.config.fit_field, outcome.best_fit, vec![axis]);
        output.add_meta(&self.config.report_key, Value::String(outcome.report.to_string()));
        output.add_meta(&self.config.params_key, Value::Object(fitted_values));
        output.add_meta(FITTING_OPTIONS_KEY, options.to_value()?);

        debug!("fit of {} to '{}' succeeded", options.model, dependent);
        Ok((output, RunStatus::Fitted))
    }
}
