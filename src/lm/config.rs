//! Configuration options for the Levenberg-Marquardt algorithm.

/// Configuration options for the Levenberg-Marquardt algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct LmConfig {
    /// Maximum number of accepted iterations. Default: 200
    pub max_iterations: usize,

    /// Relative tolerance for the decrease of the cost. Default: 1e-10
    pub ftol: f64,

    /// Relative tolerance for the change in parameter values. Default: 1e-10
    pub xtol: f64,

    /// Tolerance for the gradient infinity norm. Default: 1e-12
    pub gtol: f64,

    /// Initial value for the damping parameter. Default: 1e-3
    pub initial_lambda: f64,

    /// Factor by which to increase lambda after a rejected step. Default: 10.0
    pub lambda_up_factor: f64,

    /// Factor by which to decrease lambda after an accepted step. Default: 0.1
    pub lambda_down_factor: f64,

    /// Minimum value for lambda. Default: 1e-12
    pub min_lambda: f64,

    /// Maximum value for lambda. Default: 1e16
    pub max_lambda: f64,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            ftol: 1e-10,
            xtol: 1e-10,
            gtol: 1e-12,
            initial_lambda: 1e-3,
            lambda_up_factor: 10.0,
            lambda_down_factor: 0.1,
            min_lambda: 1e-12,
            max_lambda: 1e16,
        }
    }
}
