//! General-purpose model functions.

use super::ModelCatalog;
use crate::error::Result;

const CATEGORY: &str = "GenericFunctions";

/// amp * sin(omega * x + phase)
fn sinusoidal(x: f64, p: &[f64]) -> f64 {
    p[0] * (p[1] * x + p[2]).sin()
}

/// a * b^x
fn exponential(x: f64, p: &[f64]) -> f64 {
    p[0] * p[1].powf(x)
}

pub(super) fn register(catalog: &mut ModelCatalog) -> Result<()> {
    catalog.register(
        CATEGORY,
        "Sinusoidal",
        &["x", "amp", "omega", "phase"],
        "Sinusoidal function\namp * sin(omega * x + phase)",
        sinusoidal,
    )?;
    catalog.register(
        CATEGORY,
        "Exponential",
        &["x", "a", "b"],
        "Exponential function\na * b ** x",
        exponential,
    )?;
    Ok(())
}
