//! The fit processing stage of a data pipeline.
//!
//! A stage owns at most one active [`FittingOptions`] value and replaces it
//! whole; readers never see a half-updated configuration. Listeners hear
//! about every replacement, including options adopted from incoming data.

use crate::dataset::Dataset;
use crate::engine::{EngineConfig, FitEngine, RunStatus};
use crate::error::Result;
use crate::notify::{ListenerId, Listeners};
use crate::options::FittingOptions;
use crate::transport::OptionsEditor;
use log::{debug, warn};

/// Notifications sent by a [`FittingStage`].
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    /// Options embedded in an incoming dataset became the active options
    DefaultsAdopted(FittingOptions),
    /// The active options were replaced through `set_options`
    OptionsChanged(FittingOptions),
    OptionsCleared,
}

/// A pipeline stage fitting one model to one-dimensional data.
///
/// # Examples
///
/// ```
/// use fitnode_rs::dataset::{DataDict, Dataset};
/// use fitnode_rs::models::ModelCatalog;
/// use fitnode_rs::options::{FittingOptions, ParamOptions};
/// use fitnode_rs::stage::FittingStage;
/// use ndarray::Array1;
///
/// let x = Array1::linspace(0.0, 2.0, 11);
/// let data = DataDict::new()
///     .with_axis("x", x.clone())
///     .with_dependent("y", x.mapv(|v| 4.0 * v + 1.0), &["x"]);
///
/// let mut stage = FittingStage::new();
/// assert_eq!(stage.process(&data).unwrap(), data);
///
/// let entry = ModelCatalog::builtin().resolve("PeakFunctions.Linear").unwrap();
/// let options = FittingOptions::create_default(entry)
///     .with_param("slope", ParamOptions::free(1.0));
/// stage.set_options(options).unwrap();
/// assert!(stage.process(&data).unwrap().values_of("fit").is_ok());
/// ```
#[derive(Debug, Default)]
pub struct FittingStage {
    options: Option<FittingOptions>,
    engine: FitEngine,
    listeners: Listeners<StageEvent>,
}

impl FittingStage {
    /// Unconfigured stage over the built-in catalog.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(engine: FitEngine) -> Self {
        Self {
            options: None,
            engine,
            listeners: Listeners::new(),
        }
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_engine(FitEngine::new().with_config(config))
    }

    pub fn engine(&self) -> &FitEngine {
        &self.engine
    }

    pub fn options(&self) -> Option<&FittingOptions> {
        self.options.as_ref()
    }

    /// Replace the active options.
    ///
    /// The new value is resolved and validated first; on error the previous
    /// options stay active.
    pub fn set_options(&mut self, options: FittingOptions) -> Result<()> {
        options.resolve(self.engine.catalog())?;
        self.options = Some(options.clone());
        self.listeners.notify(&StageEvent::OptionsChanged(options));
        Ok(())
    }

    pub fn clear_options(&mut self) {
        if self.options.take().is_some() {
            self.listeners.notify(&StageEvent::OptionsCleared);
        }
    }

    /// Fit an incoming dataset.
    ///
    /// Returns a copy of the input, with the fit added when the fit succeeds.
    /// Configuration errors are returned as `Err`; the input is untouched.
    pub fn process<D: Dataset>(&mut self, dataset: &D) -> Result<D> {
        if !self.engine.is_eligible(dataset) {
            debug!("dataset shape not supported, passing through");
            return Ok(dataset.clone());
        }

        if self.options.is_none() {
            match self.engine.embedded_options(dataset) {
                Ok(Some(adopted)) => {
                    debug!("adopted default options for {}", adopted.model);
                    self.options = Some(adopted.clone());
                    self.listeners.notify(&StageEvent::DefaultsAdopted(adopted));
                }
                Ok(None) => return Ok(dataset.clone()),
                Err(err) => {
                    warn!("ignoring embedded fitting options: {}", err);
                    return Err(err);
                }
            }
        }

        let output = self.engine.run(dataset, self.options.as_ref())?;
        if output.status == RunStatus::FitFailed {
            debug!("fit failed, output carries no fit");
        }
        Ok(output.dataset)
    }

    /// Register a listener for stage events.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&StageEvent) + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Show the active options in an editor. Returns `false` when unconfigured.
    pub fn push_to<E: OptionsEditor>(&self, editor: &mut E) -> Result<bool> {
        match &self.options {
            Some(options) => {
                editor.set(options.clone())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Take the editor's options as the active options.
    pub fn pull_from<E: OptionsEditor>(&mut self, editor: &E) -> Result<()> {
        let options = editor.get()?;
        self.set_options(options)
    }
}
