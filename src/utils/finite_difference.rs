//! Finite difference methods for numerical differentiation.

use crate::error::{FitError, Result};
use crate::problem::Problem;
use ndarray::{Array1, Array2};

/// Default relative step size for finite differences (square root of machine epsilon).
const DEFAULT_EPSILON: f64 = 1.490_116_119_384_765_6e-8;

/// Compute the Jacobian matrix using forward finite differences.
///
/// J[i,j] = ∂residual[i]/∂param[j], with the step scaled to the magnitude of
/// each parameter.
///
/// # Arguments
///
/// * `problem` - The problem to evaluate
/// * `params` - The parameter values at which to evaluate the Jacobian
/// * `epsilon` - The step size for finite differences (optional)
pub fn jacobian(
    problem: &dyn Problem,
    params: &Array1<f64>,
    epsilon: Option<f64>,
) -> Result<Array2<f64>> {
    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    let n_params = params.len();
    let n_residuals = problem.residual_count();

    let residuals = problem.eval(params)?;
    if residuals.len() != n_residuals {
        return Err(FitError::DimensionMismatch(format!(
            "Expected {} residuals, got {}",
            n_residuals,
            residuals.len()
        )));
    }

    let mut jac = Array2::zeros((n_residuals, n_params));

    for j in 0..n_params {
        let mut perturbed = params.clone();
        let step = if params[j].abs() > 1.0 {
            params[j].abs() * eps
        } else {
            eps
        };
        perturbed[j] += step;

        let residuals_perturbed = problem.eval(&perturbed)?;
        for i in 0..n_residuals {
            jac[[i, j]] = (residuals_perturbed[i] - residuals[i]) / step;
        }
    }

    Ok(jac)
}
