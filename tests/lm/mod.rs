//! Integration tests for the Levenberg-Marquardt algorithm.

use approx::assert_relative_eq;
use fitnode_rs::lm::{LevenbergMarquardt, LmConfig};
use fitnode_rs::{FitError, Problem, Result};
use ndarray::{array, Array1, Array2};

/// Test Problem: Simple 1D linear function f(x) = a*x + b
struct LinearProblem {
    x_data: Array1<f64>,
    y_data: Array1<f64>,
}

impl Problem for LinearProblem {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        if params.len() != 2 {
            return Err(FitError::DimensionMismatch(format!(
                "Expected 2 parameters, got {}",
                params.len()
            )));
        }

        Ok(self.x_data.mapv(|x| params[0] * x + params[1]) - &self.y_data)
    }

    fn parameter_count(&self) -> usize {
        2
    }

    fn residual_count(&self) -> usize {
        self.x_data.len()
    }

    fn jacobian(&self, _params: &Array1<f64>) -> Result<Array2<f64>> {
        let n = self.x_data.len();
        let mut jac = Array2::zeros((n, 2));

        for i in 0..n {
            jac[[i, 0]] = self.x_data[i]; // d/da
            jac[[i, 1]] = 1.0; // d/db
        }

        Ok(jac)
    }
}

/// Test Problem: Rosenbrock function as residuals (1 - x, 10(y - x²))
struct RosenbrockProblem;

impl Problem for RosenbrockProblem {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        let (x, y) = (params[0], params[1]);
        Ok(array![1.0 - x, 10.0 * (y - x * x)])
    }

    fn parameter_count(&self) -> usize {
        2
    }

    fn residual_count(&self) -> usize {
        2
    }
}

#[test]
fn test_linear_with_analytic_jacobian() {
    let x_data = Array1::linspace(0.0, 10.0, 11);
    let y_data = x_data.mapv(|x| 2.0 * x + 1.0);
    let problem = LinearProblem { x_data, y_data };

    let result = LevenbergMarquardt::new()
        .minimize(&problem, array![0.0, 0.0])
        .unwrap();

    assert!(result.success, "{}", result);
    assert_relative_eq!(result.params[0], 2.0, epsilon = 1e-8);
    assert_relative_eq!(result.params[1], 1.0, epsilon = 1e-8);
    assert!(result.cost < 1e-12);
}

#[test]
fn test_rosenbrock_with_finite_differences() {
    let lm = LevenbergMarquardt::with_config(LmConfig {
        max_iterations: 500,
        ..LmConfig::default()
    });
    let result = lm.minimize(&RosenbrockProblem, array![-1.2, 1.0]).unwrap();

    assert!(result.success, "{}", result);
    assert_relative_eq!(result.params[0], 1.0, epsilon = 1e-5);
    assert_relative_eq!(result.params[1], 1.0, epsilon = 1e-5);
}

#[test]
fn test_wrong_parameter_count() {
    let problem = LinearProblem {
        x_data: array![0.0, 1.0],
        y_data: array![0.0, 1.0],
    };
    let result = LevenbergMarquardt::new().minimize(&problem, array![1.0]);
    assert!(matches!(result, Err(FitError::DimensionMismatch(_))));
}

#[test]
fn test_builder_config() {
    let lm = LevenbergMarquardt::new()
        .with_max_iterations(5)
        .with_ftol(1e-6)
        .with_lambda(1.0);

    assert_eq!(lm.config().max_iterations, 5);
    assert_eq!(lm.config().ftol, 1e-6);
    assert_eq!(lm.config().initial_lambda, 1.0);
}
