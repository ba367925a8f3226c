use thiserror::Error;

/// Error types for the fitnode-rs library.
#[derive(Error, Debug)]
pub enum FitError {
    /// The model string does not name a registered model.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// A bare model name exists in more than one category of the registry.
    #[error("Duplicate model name '{name}' found in categories: {}", .categories.join(", "))]
    DuplicateModel {
        name: String,
        categories: Vec<String>,
    },

    /// An editor was asked to select a bare model name that is not unique.
    #[error("Ambiguous model '{name}', qualify it with one of: {}", .categories.join(", "))]
    AmbiguousModel {
        name: String,
        categories: Vec<String>,
    },

    /// The option parameters do not match the parameters of the model.
    #[error(
        "Parameter set mismatch for model '{model}': expected [{}], got [{}]",
        .expected.join(", "),
        .found.join(", ")
    )]
    ParameterSetMismatch {
        model: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Bounds are out of order or the initial guess lies outside them.
    #[error("Bound order error for parameter '{name}': {message}")]
    BoundOrderError { name: String, message: String },

    /// An editor has no model (only a category or nothing) selected.
    #[error("No model selected")]
    NoModelSelected,

    /// A user-typed option field is not a number.
    #[error("Invalid number: '{0}'")]
    InvalidNumber(String),

    /// The model registry was built from an invalid registration.
    #[error("Invalid model registry: {0}")]
    InvalidRegistry(String),

    /// Error indicating a mismatch in array dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Error for parameter-related problems.
    #[error("Parameter error: {0}")]
    ParameterError(String),

    /// A dataset field was requested that does not exist.
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<crate::parameters::ParameterError> for FitError {
    fn from(err: crate::parameters::ParameterError) -> Self {
        FitError::ParameterError(format!("{}", err))
    }
}

impl From<crate::parameters::BoundsError> for FitError {
    fn from(err: crate::parameters::BoundsError) -> Self {
        FitError::ParameterError(format!("{}", err))
    }
}

impl FitError {
    /// Whether the error comes from an invalid configuration (model choice or
    /// parameter options) rather than from the data or the solver.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            FitError::UnknownModel(_)
                | FitError::DuplicateModel { .. }
                | FitError::AmbiguousModel { .. }
                | FitError::ParameterSetMismatch { .. }
                | FitError::BoundOrderError { .. }
                | FitError::NoModelSelected
                | FitError::InvalidNumber(_)
        )
    }
}

/// Result type alias for fitnode-rs operations.
pub type Result<T> = std::result::Result<T, FitError>;
