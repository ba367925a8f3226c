//! Implementation of the Levenberg-Marquardt algorithm.
//!
//! Each iteration solves the damped normal equations
//! `(JᵀJ + λ·diag(JᵀJ)) δ = -Jᵀr` and accepts the step only when it lowers
//! the sum of squared residuals. Accepted steps shrink λ toward Gauss-Newton,
//! rejected steps grow it toward gradient descent.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};
use std::fmt;

use crate::error::{FitError, Result};
use crate::problem::Problem;

use super::config::LmConfig;

/// Result of the Levenberg-Marquardt optimization.
#[derive(Debug, Clone)]
pub struct LmResult {
    /// Optimized parameter values
    pub params: Array1<f64>,

    /// Residuals at the solution
    pub residuals: Array1<f64>,

    /// Sum of squared residuals
    pub cost: f64,

    /// Number of accepted iterations
    pub iterations: usize,

    /// Number of residual evaluations, Jacobian evaluations included
    pub func_evals: usize,

    /// Whether the optimization converged
    pub success: bool,

    /// A message describing the result
    pub message: String,
}

impl fmt::Display for LmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Result:")?;
        writeln!(f, "  Success: {}", self.success)?;
        writeln!(f, "  Message: {}", self.message)?;
        writeln!(f, "  Cost: {:.6e}", self.cost)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        writeln!(f, "  Parameters: {:?}", self.params)?;
        Ok(())
    }
}

/// Status of the iteration.
enum IterationStatus {
    Continue,
    Converged(String),
    Failed(String),
}

/// The Levenberg-Marquardt optimizer.
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    config: LmConfig,
}

impl LevenbergMarquardt {
    /// Create a new Levenberg-Marquardt optimizer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new Levenberg-Marquardt optimizer with the given configuration.
    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// Set the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set the tolerance for change in residual norm.
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.config.ftol = ftol;
        self
    }

    /// Set the tolerance for change in parameter values.
    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.config.xtol = xtol;
        self
    }

    /// Set the tolerance for gradient norm.
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.config.gtol = gtol;
        self
    }

    /// Set the initial value for the damping parameter.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.config.initial_lambda = lambda;
        self
    }

    /// Minimize the sum of squared residuals for the given problem.
    ///
    /// Running out of iterations or damping is reported through
    /// `LmResult::success`; only evaluation errors are returned as `Err`.
    ///
    /// # Arguments
    ///
    /// * `problem` - The problem to solve
    /// * `initial_params` - Initial guess for the parameter values
    pub fn minimize<P: Problem>(
        &self,
        problem: &P,
        initial_params: Array1<f64>,
    ) -> Result<LmResult> {
        let n_params = problem.parameter_count();
        if initial_params.len() != n_params {
            return Err(FitError::DimensionMismatch(format!(
                "Expected {} parameters, got {}",
                n_params,
                initial_params.len()
            )));
        }

        let mut params = initial_params;
        let mut residuals = problem.eval(&params)?;
        let mut cost = sum_of_squares(&residuals);
        let mut func_evals = 1;

        if !cost.is_finite() {
            return Err(FitError::InvalidInput(
                "Residuals are not finite at the initial parameters".to_string(),
            ));
        }

        if n_params == 0 {
            return Ok(LmResult {
                params,
                residuals,
                cost,
                iterations: 0,
                func_evals,
                success: true,
                message: "No varying parameters".to_string(),
            });
        }

        let mut lambda = self.config.initial_lambda;
        let mut iterations = 0;

        let (success, message) = 'outer: loop {
            let jac = problem.jacobian(&params)?;
            func_evals += n_params;

            let jtj = jac.t().dot(&jac);
            let gradient = jac.t().dot(&residuals);

            let gradient_norm = gradient.iter().fold(0.0f64, |m, g| m.max(g.abs()));
            if gradient_norm <= self.config.gtol || cost == 0.0 {
                break (
                    true,
                    format!(
                        "Gradient convergence: |g| = {:.2e} <= {:.2e}",
                        gradient_norm, self.config.gtol
                    ),
                );
            }

            // Inner loop: adjust lambda until a step lowers the cost.
            loop {
                let status = match solve_damped(&jtj, &gradient, lambda) {
                    None => IterationStatus::Continue,
                    Some(step) => {
                        let step_norm = norm(&step);
                        let small_step =
                            step_norm <= self.config.xtol * (norm(&params) + self.config.xtol);

                        let trial = &params + &step;
                        let trial_residuals = problem.eval(&trial)?;
                        func_evals += 1;
                        let trial_cost = sum_of_squares(&trial_residuals);

                        if trial_cost.is_finite() && trial_cost < cost {
                            let decrease = cost - trial_cost;
                            params = trial;
                            residuals = trial_residuals;
                            let previous_cost = cost;
                            cost = trial_cost;
                            iterations += 1;
                            lambda = (lambda * self.config.lambda_down_factor)
                                .max(self.config.min_lambda);

                            if decrease <= self.config.ftol * previous_cost {
                                IterationStatus::Converged(format!(
                                    "Cost convergence: |df|/f = {:.2e} <= {:.2e}",
                                    decrease / previous_cost,
                                    self.config.ftol
                                ))
                            } else if small_step {
                                IterationStatus::Converged(format!(
                                    "Parameter convergence: |dx| = {:.2e}",
                                    step_norm
                                ))
                            } else if iterations >= self.config.max_iterations {
                                IterationStatus::Failed(format!(
                                    "Maximum iterations ({}) reached",
                                    self.config.max_iterations
                                ))
                            } else {
                                // Accepted; recompute the Jacobian.
                                continue 'outer;
                            }
                        } else if small_step {
                            IterationStatus::Converged(format!(
                                "Parameter convergence: |dx| = {:.2e}",
                                step_norm
                            ))
                        } else {
                            IterationStatus::Continue
                        }
                    }
                };

                match status {
                    IterationStatus::Converged(message) => break 'outer (true, message),
                    IterationStatus::Failed(message) => break 'outer (false, message),
                    IterationStatus::Continue => {
                        lambda *= self.config.lambda_up_factor;
                        if lambda > self.config.max_lambda {
                            break 'outer (
                                false,
                                "Failed to decrease cost, and lambda reached maximum".to_string(),
                            );
                        }
                    }
                }
            }
        };

        Ok(LmResult {
            params,
            residuals,
            cost,
            iterations,
            func_evals,
            success,
            message,
        })
    }
}

fn sum_of_squares(values: &Array1<f64>) -> f64 {
    values.iter().map(|r| r * r).sum()
}

fn norm(values: &Array1<f64>) -> f64 {
    sum_of_squares(values).sqrt()
}

/// Solve `(JᵀJ + λ·D) δ = -g` with Marquardt scaling `D = diag(JᵀJ)`.
///
/// Returns `None` when the system is singular or the step is not finite.
fn solve_damped(jtj: &Array2<f64>, gradient: &Array1<f64>, lambda: f64) -> Option<Array1<f64>> {
    let n = gradient.len();
    let a = DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            let scale = if jtj[[i, i]] > 0.0 { jtj[[i, i]] } else { 1.0 };
            jtj[[i, j]] + lambda * scale
        } else {
            jtj[[i, j]]
        }
    });
    let b = DVector::from_fn(n, |i, _| -gradient[i]);

    let step = match a.clone().cholesky() {
        Some(cholesky) => cholesky.solve(&b),
        None => a.lu().solve(&b)?,
    };

    if step.iter().all(|v| v.is_finite()) {
        Some(Array1::from_iter(step.iter().copied()))
    } else {
        None
    }
}
