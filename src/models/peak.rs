//! Peak and line models.
//!
//! Gaussian and Lorentzian line shapes as used in spectroscopy, plus a
//! straight line for baselines.

use super::ModelCatalog;
use crate::error::Result;

const CATEGORY: &str = "PeakFunctions";

/// amplitude * exp(-(x - center)² / (2 * sigma²))
///
/// FWHM = 2 * sqrt(2 * ln(2)) * sigma ≈ 2.3548 * sigma
fn gaussian(x: f64, p: &[f64]) -> f64 {
    let (amplitude, center, sigma) = (p[0], p[1], p[2]);
    amplitude * (-(x - center).powi(2) / (2.0 * sigma * sigma)).exp()
}

/// amplitude * gamma² / ((x - center)² + gamma²)
fn lorentzian(x: f64, p: &[f64]) -> f64 {
    let (amplitude, center, gamma) = (p[0], p[1], p[2]);
    amplitude * gamma * gamma / ((x - center).powi(2) + gamma * gamma)
}

fn linear(x: f64, p: &[f64]) -> f64 {
    p[0] * x + p[1]
}

pub(super) fn register(catalog: &mut ModelCatalog) -> Result<()> {
    catalog.register(
        CATEGORY,
        "Gaussian",
        &["x", "amplitude", "center", "sigma"],
        "Gaussian peak\namplitude * exp(-(x - center)**2 / (2 * sigma**2))",
        gaussian,
    )?;
    catalog.register(
        CATEGORY,
        "Lorentzian",
        &["x", "amplitude", "center", "gamma"],
        "Lorentzian peak\namplitude * gamma**2 / ((x - center)**2 + gamma**2)",
        lorentzian,
    )?;
    catalog.register(
        CATEGORY,
        "Linear",
        &["x", "slope", "intercept"],
        "Straight line\nslope * x + intercept",
        linear,
    )?;
    Ok(())
}
