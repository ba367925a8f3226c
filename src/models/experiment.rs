//! Model functions for qubit characterization experiments.

use super::ModelCatalog;
use crate::error::Result;
use std::f64::consts::PI;

const CATEGORY: &str = "ExperimentFunctions";

fn t1_decay(x: f64, p: &[f64]) -> f64 {
    p[0] * (-x / p[1]).exp()
}

fn t2_ramsey(x: f64, p: &[f64]) -> f64 {
    p[0] * (-x / p[1]).exp() * (2.0 * PI * p[2] * x + p[3]).sin()
}

pub(super) fn register(catalog: &mut ModelCatalog) -> Result<()> {
    catalog.register(
        CATEGORY,
        "T1_Decay",
        &["x", "amp", "tau"],
        "T1 Decay function\namp * exp(-1.0 * x / tau)",
        t1_decay,
    )?;
    catalog.register(
        CATEGORY,
        "T2_Ramsey",
        &["x", "amp", "tau", "freq", "phase"],
        "T2 Ramsey function\namp * exp(-1.0 * x / tau) * sin(2 * PI * freq * x + phase)",
        t2_ramsey,
    )?;
    Ok(())
}
