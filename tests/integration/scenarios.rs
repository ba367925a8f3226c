//! Concrete fitting scenarios on noisy data.

use crate::test_helpers::{array_approx_eq, dataset, gaussian_noise, noisy_sinusoid, sinusoid};
use approx::assert_relative_eq;
use fitnode_rs::dataset::Dataset;
use fitnode_rs::engine::{FitEngine, RunStatus};
use fitnode_rs::models::ModelCatalog;
use fitnode_rs::options::{FittingOptions, ParamOptions};
use ndarray::Array1;
use std::f64::consts::PI;

fn sinusoidal_options() -> FittingOptions {
    let entry = ModelCatalog::builtin()
        .resolve("GenericFunctions.Sinusoidal")
        .unwrap();
    FittingOptions::create_default(entry)
        .with_param("amp", ParamOptions::free(1.0))
        .with_param("omega", ParamOptions::free(1.5))
        .with_param("phase", ParamOptions::free(0.5))
}

#[test]
fn test_sinusoid_scenario() {
    let (x, y) = noisy_sinusoid(7, 0.02);
    let data = dataset(x.clone(), y);

    let output = FitEngine::new().run(&data, Some(&sinusoidal_options())).unwrap();
    assert_eq!(output.status, RunStatus::Fitted);

    let best_fit = output.dataset.values_of("fit").unwrap();
    assert_eq!(best_fit.len(), 51);
    assert!(array_approx_eq(&best_fit, &sinusoid(&x), 0.05));

    let params = output.dataset.meta("fit_params").unwrap();
    assert_relative_eq!(params["amp"].as_f64().unwrap(), 0.8, epsilon = 0.05);
    assert_relative_eq!(params["omega"].as_f64().unwrap(), PI / 2.0, epsilon = 0.05);
}

#[test]
fn test_fixed_parameter_is_reported_at_its_guess() {
    let x = Array1::linspace(0.0, 10.0, 51);
    let y = x.mapv(|v| 0.7 * v + 4.0) + &gaussian_noise(11, 0.05, 51);

    let entry = ModelCatalog::builtin().resolve("PeakFunctions.Linear").unwrap();
    let options = FittingOptions::create_default(entry)
        .with_param("slope", ParamOptions::free(1.0))
        .with_param("intercept", ParamOptions::fixed_at(5.0).with_bounds(Some(0.0), Some(1.0)));

    let output = FitEngine::new().run(&dataset(x, y), Some(&options)).unwrap();
    assert_eq!(output.status, RunStatus::Fitted);

    let report = output.dataset.meta("fit_report").unwrap().as_str().unwrap();
    assert!(report.contains("intercept: 5 (fixed)"), "{}", report);
    assert!(report.contains("# variables        = 1"));

    let params = output.dataset.meta("fit_params").unwrap();
    assert_eq!(params["intercept"].as_f64().unwrap(), 5.0);
}

#[test]
fn test_run_is_idempotent() {
    let (x, y) = noisy_sinusoid(3, 0.02);
    let data = dataset(x, y);
    let engine = FitEngine::new();

    let first = engine.run(&data, Some(&sinusoidal_options())).unwrap();
    let second = engine.run(&data, Some(&sinusoidal_options())).unwrap();

    assert_eq!(first.status, second.status);
    let a = first.dataset.values_of("fit").unwrap();
    let b = second.dataset.values_of("fit").unwrap();
    assert!(a.iter().zip(b.iter()).all(|(p, q)| p.to_bits() == q.to_bits()));
    assert_eq!(first.dataset, second.dataset);
}

#[test]
fn test_missing_samples_are_omitted() {
    let (x, mut y) = noisy_sinusoid(5, 0.02);
    y[10] = f64::NAN;
    y[30] = f64::NAN;

    let output = FitEngine::new()
        .run(&dataset(x.clone(), y), Some(&sinusoidal_options()))
        .unwrap();
    assert_eq!(output.status, RunStatus::Fitted);

    let best_fit = output.dataset.values_of("fit").unwrap();
    assert!(best_fit.iter().all(|v| v.is_finite()));
    assert!(array_approx_eq(&best_fit, &sinusoid(&x), 0.05));
    assert!(output
        .dataset
        .meta("fit_report")
        .unwrap()
        .as_str()
        .unwrap()
        .contains("# data points      = 49"));
}

#[test]
fn test_ramsey_fit_with_bounds() {
    let x = Array1::linspace(0.0, 20.0, 101);
    let y = x.mapv(|t: f64| 0.5 * (-t / 8.0).exp() * (2.0 * PI * 0.2 * t + 0.3).sin())
        + &gaussian_noise(19, 0.01, 101);

    let entry = ModelCatalog::builtin()
        .resolve("ExperimentFunctions.T2_Ramsey")
        .unwrap();
    let options = FittingOptions::create_default(entry)
        .with_param("amp", ParamOptions::free(0.4).with_bounds(Some(0.0), Some(1.0)))
        .with_param("tau", ParamOptions::free(5.0).with_bounds(Some(0.1), None))
        .with_param("freq", ParamOptions::free(0.195).with_bounds(Some(0.1), Some(0.3)))
        .with_param("phase", ParamOptions::free(0.0));

    let output = FitEngine::new().run(&dataset(x, y), Some(&options)).unwrap();
    assert_eq!(output.status, RunStatus::Fitted);

    let params = output.dataset.meta("fit_params").unwrap();
    assert_relative_eq!(params["freq"].as_f64().unwrap(), 0.2, epsilon = 0.01);
    assert_relative_eq!(params["tau"].as_f64().unwrap(), 8.0, epsilon = 1.5);
}

#[test]
fn test_initial_guess_on_a_bound() {
    let x = Array1::linspace(0.0, 10.0, 51);
    let y = x.mapv(|t: f64| 2.0 * (-t / 3.0).exp());
    let data = dataset(x, y);
    let entry = ModelCatalog::builtin()
        .resolve("ExperimentFunctions.T1_Decay")
        .unwrap();

    let cases = [
        (0.1, Some(0.1), None),
        (0.3, None, Some(0.3)),
        (4.0, Some(0.5), Some(4.0)),
    ];

    for (guess, lower, upper) in cases {
        let options = FittingOptions::create_default(entry)
            .with_param("amp", ParamOptions::free(1.0))
            .with_param("tau", ParamOptions::free(guess).with_bounds(lower, upper));
        options.validate(entry).unwrap();

        let output = FitEngine::new().run(&data, Some(&options)).unwrap();
        assert!(matches!(output.status, RunStatus::Fitted | RunStatus::FitFailed));
        if output.status == RunStatus::Fitted {
            let tau = output.dataset.meta("fit_params").unwrap()["tau"].as_f64().unwrap();
            assert!(lower.map_or(true, |lo| tau >= lo), "tau {} below {:?}", tau, lower);
            assert!(upper.map_or(true, |hi| tau <= hi), "tau {} above {:?}", tau, upper);
        }
    }
}
