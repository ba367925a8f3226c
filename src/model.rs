//! Optimizer boundary: fitting a catalog model to one-dimensional data.
//!
//! The [`Optimizer`] trait is what the fit engine calls. [`LmFitter`] is the
//! default implementation; it adapts a [`ModelEntry`] and its [`Parameters`]
//! to the [`Problem`] trait and hands it to the Levenberg-Marquardt solver.
//! Bounded parameters are optimized in the unbounded internal space of the
//! Minuit transform, so the solver itself never sees a bound.

use crate::error::{FitError, Result};
use crate::lm::{LevenbergMarquardt, LmConfig};
use crate::models::ModelEntry;
use crate::parameters::Parameters;
use crate::problem::Problem;
use log::debug;
use ndarray::Array1;
use std::fmt;

/// Treatment of non-finite samples in the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NanPolicy {
    /// Drop samples where x or y is NaN or infinite.
    #[default]
    Omit,
    /// Reject data containing non-finite samples.
    Raise,
}

/// Outcome of one optimizer invocation.
///
/// Non-convergence is an outcome, not an error: check `success`.
#[derive(Debug, Clone)]
pub struct OptimizerOutcome {
    pub success: bool,

    /// Model evaluated at every input x with the final parameters
    pub best_fit: Array1<f64>,

    /// Final parameter values; fixed parameters keep their initial value
    pub params: Parameters,

    pub report: FitReport,
}

/// A fit optimizer for catalog models.
pub trait Optimizer {
    /// Short method name shown in fit reports.
    fn method(&self) -> &str;

    /// Fit `entry` to `(x, y)` starting from `params`.
    ///
    /// # Arguments
    ///
    /// * `entry` - The model to fit
    /// * `params` - One parameter per model parameter, in declaration order
    /// * `x` - Independent variable values
    /// * `y` - Observed values, aligned with `x`
    /// * `nan_policy` - What to do with non-finite samples
    fn fit(
        &self,
        entry: &ModelEntry,
        params: &Parameters,
        x: &Array1<f64>,
        y: &Array1<f64>,
        nan_policy: NanPolicy,
    ) -> Result<OptimizerOutcome>;
}

/// lmfit-style fit report.
#[derive(Debug, Clone)]
pub struct FitReport {
    pub model: String,
    pub method: String,
    pub func_evals: usize,
    pub data_points: usize,
    pub variables: usize,
    pub chi_square: f64,
    pub success: bool,
    pub message: String,
    pub params: Parameters,
}

impl FitReport {
    /// Chi-square per degree of freedom, NaN without degrees of freedom.
    pub fn reduced_chi_square(&self) -> f64 {
        if self.data_points > self.variables {
            self.chi_square / (self.data_points - self.variables) as f64
        } else {
            f64::NAN
        }
    }
}

impl fmt::Display for FitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[[Model]]")?;
        writeln!(f, "    {}", self.model)?;
        writeln!(f, "[[Fit Statistics]]")?;
        writeln!(f, "    # fitting method   = {}", self.method)?;
        writeln!(f, "    # function evals   = {}", self.func_evals)?;
        writeln!(f, "    # data points      = {}", self.data_points)?;
        writeln!(f, "    # variables        = {}", self.variables)?;
        writeln!(f, "    chi-square         = {:.8e}", self.chi_square)?;
        writeln!(f, "    reduced chi-square = {:.8e}", self.reduced_chi_square())?;
        writeln!(f, "    success            = {}", self.success)?;
        writeln!(f, "    message            = {}", self.message)?;
        writeln!(f, "[[Variables]]")?;

        let width = self
            .params
            .iter()
            .map(|p| p.name().len() + 1)
            .max()
            .unwrap_or(0);
        for param in self.params.iter() {
            let label = format!("{}:", param.name());
            if param.vary() {
                writeln!(
                    f,
                    "    {:<width$} {:.8} (init = {})",
                    label,
                    param.value(),
                    param.init_value(),
                    width = width
                )?;
            } else {
                writeln!(f, "    {:<width$} {} (fixed)", label, param.value(), width = width)?;
            }
        }
        Ok(())
    }
}

/// Adapts a catalog model and data to a least-squares [`Problem`].
///
/// The problem variables are the internal values of the varying parameters.
pub struct ModelProblem<'a> {
    entry: &'a ModelEntry,
    params: &'a Parameters,
    x_data: Array1<f64>,
    y_data: Array1<f64>,
}

impl<'a> ModelProblem<'a> {
    /// Create a new problem.
    ///
    /// # Arguments
    ///
    /// * `entry` - The model function
    /// * `params` - Parameter template: fixed values, bounds and order
    /// * `x_data` - The independent variable values
    /// * `y_data` - The observed values
    pub fn new(
        entry: &'a ModelEntry,
        params: &'a Parameters,
        x_data: Array1<f64>,
        y_data: Array1<f64>,
    ) -> Result<Self> {
        if x_data.len() != y_data.len() {
            return Err(FitError::DimensionMismatch(format!(
                "Expected x and y data to have the same length, got {} and {}",
                x_data.len(),
                y_data.len()
            )));
        }
        if params.len() != entry.parameter_names().len() {
            return Err(FitError::DimensionMismatch(format!(
                "Model '{}' takes {} parameters, got {}",
                entry.qualified_name(),
                entry.parameter_names().len(),
                params.len()
            )));
        }

        Ok(Self {
            entry,
            params,
            x_data,
            y_data,
        })
    }

    pub fn ndata(&self) -> usize {
        self.x_data.len()
    }

    /// External parameters for a vector of internal values.
    pub fn parameters_at(&self, internal: &Array1<f64>) -> Result<Parameters> {
        let mut params = self.params.clone();
        params.update_from_internal(&internal.to_vec())?;
        Ok(params)
    }
}

impl Problem for ModelProblem<'_> {
    fn eval(&self, internal: &Array1<f64>) -> Result<Array1<f64>> {
        let params = self.parameters_at(internal)?;
        let model = self.entry.eval_array(&self.x_data, &params.values())?;
        Ok(model - &self.y_data)
    }

    fn parameter_count(&self) -> usize {
        self.params.varying_count()
    }

    fn residual_count(&self) -> usize {
        self.x_data.len()
    }
}

fn is_finite_sample((x, y): &(&f64, &f64)) -> bool {
    x.is_finite() && y.is_finite()
}

/// Split off the samples the optimizer may use.
fn usable_samples(
    x: &Array1<f64>,
    y: &Array1<f64>,
    nan_policy: NanPolicy,
) -> Result<(Array1<f64>, Array1<f64>)> {
    if x.len() != y.len() {
        return Err(FitError::DimensionMismatch(format!(
            "Expected x and y data to have the same length, got {} and {}",
            x.len(),
            y.len()
        )));
    }

    if nan_policy == NanPolicy::Raise
        && !x.iter().zip(y.iter()).all(|pair| is_finite_sample(&pair))
    {
        return Err(FitError::InvalidInput(
            "Data contains non-finite samples".to_string(),
        ));
    }

    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y.iter())
        .filter(is_finite_sample)
        .map(|(xi, yi)| (*xi, *yi))
        .unzip();

    Ok((Array1::from(xs), Array1::from(ys)))
}

/// The default optimizer: Levenberg-Marquardt with finite-difference Jacobians.
#[derive(Debug, Clone, Default)]
pub struct LmFitter {
    solver: LevenbergMarquardt,
}

impl LmFitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LmConfig) -> Self {
        Self {
            solver: LevenbergMarquardt::with_config(config),
        }
    }

    pub fn solver(&self) -> &LevenbergMarquardt {
        &self.solver
    }

    fn outcome(
        &self,
        entry: &ModelEntry,
        x: &Array1<f64>,
        params: Parameters,
        stats: FitStats,
    ) -> Result<OptimizerOutcome> {
        let best_fit = entry.eval_array(x, &params.values())?;
        let report = FitReport {
            model: entry.qualified_name(),
            method: self.method().to_string(),
            func_evals: stats.func_evals,
            data_points: stats.data_points,
            variables: params.varying_count(),
            chi_square: stats.chi_square,
            success: stats.success,
            message: stats.message,
            params: params.clone(),
        };

        Ok(OptimizerOutcome {
            success: report.success,
            best_fit,
            params,
            report,
        })
    }
}

struct FitStats {
    func_evals: usize,
    data_points: usize,
    chi_square: f64,
    success: bool,
    message: String,
}

impl FitStats {
    fn failed(data_points: usize, message: String) -> Self {
        Self {
            func_evals: 0,
            data_points,
            chi_square: f64::NAN,
            success: false,
            message,
        }
    }
}

impl Optimizer for LmFitter {
    fn method(&self) -> &str {
        "leastsq"
    }

    fn fit(
        &self,
        entry: &ModelEntry,
        params: &Parameters,
        x: &Array1<f64>,
        y: &Array1<f64>,
        nan_policy: NanPolicy,
    ) -> Result<OptimizerOutcome> {
        let (x_used, y_used) = usable_samples(x, y, nan_policy)?;
        let ndata = x_used.len();
        let nvarys = params.varying_count();

        if ndata < nvarys.max(1) {
            let message = format!(
                "Not enough data points: {} usable samples for {} variables",
                ndata, nvarys
            );
            return self.outcome(entry, x, params.clone(), FitStats::failed(ndata, message));
        }

        let problem = ModelProblem::new(entry, params, x_used, y_used)?;
        let initial = Array1::from(params.varying_internal_values()?);

        debug!(
            "fitting {} to {} samples with {} variables",
            entry.qualified_name(),
            ndata,
            nvarys
        );

        let result = match self.solver.minimize(&problem, initial) {
            Ok(result) => result,
            Err(err @ (FitError::InvalidInput(_) | FitError::ParameterError(_))) => {
                return self.outcome(
                    entry,
                    x,
                    params.clone(),
                    FitStats::failed(ndata, err.to_string()),
                );
            }
            Err(err) => return Err(err),
        };

        let fitted = problem.parameters_at(&result.params)?;
        self.outcome(
            entry,
            x,
            fitted,
            FitStats {
                func_evals: result.func_evals,
                data_points: ndata,
                chi_square: result.cost,
                success: result.success,
                message: result.message,
            },
        )
    }
}
