//! Moving fitting options in and out of an interactive editor.
//!
//! [`OptionsEditor`] is the contract any front end implements, whatever its
//! widget toolkit. [`EditorState`] is a headless implementation holding the
//! model selection and one row per parameter; a GUI can render it directly.

use crate::error::{FitError, Result};
use crate::models::{ModelCatalog, ModelEntry};
use crate::notify::{ListenerId, Listeners};
use crate::options::{parse_bound, parse_value, FittingOptions, ParamOptions};
use log::debug;
use std::collections::BTreeSet;

/// Read and write access to an editor's fitting options.
pub trait OptionsEditor {
    /// Current options; `NoModelSelected` unless a model is selected.
    fn get(&self) -> Result<FittingOptions>;

    /// Select `options.model` and show its parameters.
    ///
    /// A failed call leaves the editor as it was.
    fn set(&mut self, options: FittingOptions) -> Result<()>;
}

/// What is highlighted in the model tree.
#[derive(Debug, Clone)]
pub enum Selection {
    Nothing,
    /// A category header, not a model
    Category(String),
    Model(&'static ModelEntry),
}

/// One editable parameter row.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamRow {
    pub name: String,
    pub options: ParamOptions,
}

/// Resolve a model string for selection, reporting bare-name ambiguity.
fn resolve_for_selection(
    catalog: &'static ModelCatalog,
    model: &str,
) -> Result<&'static ModelEntry> {
    catalog.resolve(model).map_err(|err| match err {
        FitError::DuplicateModel { name, categories } => {
            FitError::AmbiguousModel { name, categories }
        }
        other => other,
    })
}

/// Headless options editor.
///
/// With live update on, every discrete edit or selection change notifies the
/// listeners once with the current options; otherwise only [`confirm`]
/// notifies.
///
/// [`confirm`]: EditorState::confirm
///
/// # Examples
///
/// ```
/// use fitnode_rs::transport::{EditorState, OptionsEditor};
///
/// let mut editor = EditorState::new();
/// editor.select_model("ExperimentFunctions.T1_Decay").unwrap();
/// editor.set_initial_guess_text("tau", "2.5e-6").unwrap();
/// editor.set_lower_bound_text("tau", "0").unwrap();
///
/// let options = editor.get().unwrap();
/// assert_eq!(options.param("tau").unwrap().initial_guess, 2.5e-6);
/// assert_eq!(options.param("tau").unwrap().lower_bound, Some(0.0));
///
/// assert!(editor.set_upper_bound_text("tau", "1e-3 + 1").is_err());
/// ```
#[derive(Debug)]
pub struct EditorState {
    catalog: &'static ModelCatalog,
    selection: Selection,
    rows: Vec<ParamRow>,
    live: bool,
    listeners: Listeners<FittingOptions>,
    defaults: Option<FittingOptions>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    /// Editor over the built-in catalog, with nothing selected.
    pub fn new() -> Self {
        Self::with_catalog(ModelCatalog::builtin())
    }

    pub fn with_catalog(catalog: &'static ModelCatalog) -> Self {
        Self {
            catalog,
            selection: Selection::Nothing,
            rows: Vec::new(),
            live: false,
            listeners: Listeners::new(),
            defaults: None,
        }
    }

    pub fn catalog(&self) -> &'static ModelCatalog {
        self.catalog
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn rows(&self) -> &[ParamRow] {
        &self.rows
    }

    pub fn selected_model(&self) -> Option<&'static ModelEntry> {
        match self.selection {
            Selection::Model(entry) => Some(entry),
            _ => None,
        }
    }

    /// Highlight a category header. Parameter rows are cleared.
    pub fn select_category(&mut self, category: &str) -> Result<()> {
        if !self.catalog.categories().contains(&category) {
            return Err(FitError::UnknownModel(category.to_string()));
        }
        self.selection = Selection::Category(category.to_string());
        self.rows.clear();
        self.changed();
        Ok(())
    }

    /// Select a model; its rows replace the previous ones, at default values.
    pub fn select_model(&mut self, model: &str) -> Result<()> {
        let entry = resolve_for_selection(self.catalog, model)?;
        let defaults = FittingOptions::create_default(entry);
        self.show(entry, &defaults);
        self.changed();
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::Nothing;
        self.rows.clear();
        self.changed();
    }

    fn show(&mut self, entry: &'static ModelEntry, options: &FittingOptions) {
        self.selection = Selection::Model(entry);
        self.rows = entry
            .parameter_names()
            .iter()
            .map(|name| ParamRow {
                name: name.clone(),
                options: options.param(name).copied().unwrap_or_default(),
            })
            .collect();
    }

    fn row_mut(&mut self, name: &str) -> Result<&mut ParamOptions> {
        self.rows
            .iter_mut()
            .find(|row| row.name == name)
            .map(|row| &mut row.options)
            .ok_or_else(|| FitError::ParameterError(format!("no parameter row '{}'", name)))
    }

    fn edit(&mut self, name: &str, apply: impl FnOnce(&mut ParamOptions)) -> Result<()> {
        apply(self.row_mut(name)?);
        self.changed();
        Ok(())
    }

    pub fn set_fixed(&mut self, name: &str, fixed: bool) -> Result<()> {
        self.edit(name, |row| row.fixed = fixed)
    }

    pub fn set_initial_guess(&mut self, name: &str, value: f64) -> Result<()> {
        self.edit(name, |row| row.initial_guess = value)
    }

    pub fn set_lower_bound(&mut self, name: &str, bound: Option<f64>) -> Result<()> {
        self.edit(name, |row| row.lower_bound = bound)
    }

    pub fn set_upper_bound(&mut self, name: &str, bound: Option<f64>) -> Result<()> {
        self.edit(name, |row| row.upper_bound = bound)
    }

    /// Set an initial guess from typed text; rejected text changes nothing.
    pub fn set_initial_guess_text(&mut self, name: &str, text: &str) -> Result<()> {
        self.row_mut(name)?;
        let value = parse_value(text)?;
        self.set_initial_guess(name, value)
    }

    /// Set a lower bound from typed text; see [`parse_bound`].
    pub fn set_lower_bound_text(&mut self, name: &str, text: &str) -> Result<()> {
        self.row_mut(name)?;
        let bound = parse_bound(text)?;
        self.set_lower_bound(name, bound)
    }

    /// Set an upper bound from typed text; see [`parse_bound`].
    pub fn set_upper_bound_text(&mut self, name: &str, text: &str) -> Result<()> {
        self.row_mut(name)?;
        let bound = parse_bound(text)?;
        self.set_upper_bound(name, bound)
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Toggle live update. Switching it on does not notify by itself.
    pub fn set_live(&mut self, live: bool) {
        self.live = live;
    }

    /// Register a listener for options updates.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&FittingOptions) + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Deliver the current options to the listeners, live or not.
    pub fn confirm(&mut self) -> Result<FittingOptions> {
        let options = self.get()?;
        self.listeners.notify(&options);
        Ok(options)
    }

    fn changed(&mut self) {
        if !self.live {
            return;
        }
        // Nothing to deliver while no model is selected
        if let Ok(options) = self.get() {
            self.listeners.notify(&options);
        }
    }

    /// Remember options adopted upstream for a later [`recall_defaults`].
    ///
    /// [`recall_defaults`]: EditorState::recall_defaults
    pub fn remember_defaults(&mut self, options: FittingOptions) {
        self.defaults = Some(options);
    }

    pub fn defaults(&self) -> Option<&FittingOptions> {
        self.defaults.as_ref()
    }

    /// Re-apply the remembered defaults. Returns `false` if there are none.
    pub fn recall_defaults(&mut self) -> Result<bool> {
        match self.defaults.clone() {
            Some(options) => {
                self.set(options)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl OptionsEditor for EditorState {
    fn get(&self) -> Result<FittingOptions> {
        let entry = self.selected_model().ok_or(FitError::NoModelSelected)?;
        Ok(FittingOptions {
            model: entry.qualified_name(),
            parameters: self
                .rows
                .iter()
                .map(|row| (row.name.clone(), row.options))
                .collect(),
        })
    }

    fn set(&mut self, options: FittingOptions) -> Result<()> {
        let entry = resolve_for_selection(self.catalog, &options.model)?;

        let expected: BTreeSet<&str> = entry.parameter_names().iter().map(String::as_str).collect();
        let found: BTreeSet<&str> = options.parameters.keys().map(String::as_str).collect();
        if expected != found {
            return Err(FitError::ParameterSetMismatch {
                model: options.model.clone(),
                expected: entry.parameter_names().to_vec(),
                found: options.parameters.keys().cloned().collect(),
            });
        }

        debug!("editor showing {}", entry.qualified_name());
        self.show(entry, &options);
        self.changed();
        Ok(())
    }
}
