//! Tests for the built-in model registry.

use approx::assert_relative_eq;
use fitnode_rs::models::ModelCatalog;
use fitnode_rs::options::FittingOptions;
use fitnode_rs::FitError;
use ndarray::array;
use std::collections::BTreeSet;

#[test]
fn test_default_options_cover_every_model() {
    let catalog = ModelCatalog::builtin();
    assert!(!catalog.is_empty());

    for entry in catalog.entries() {
        let resolved = catalog.resolve(&entry.qualified_name()).unwrap();
        let options = FittingOptions::create_default(resolved);

        let keys: BTreeSet<&str> = options.parameters.keys().map(String::as_str).collect();
        let names: BTreeSet<&str> = resolved.parameter_names().iter().map(String::as_str).collect();
        assert_eq!(keys, names, "{}", entry.qualified_name());

        options.validate(resolved).unwrap();
    }
}

#[test]
fn test_builtin_names_are_unique_bare_names() {
    let catalog = ModelCatalog::builtin();
    for entry in catalog.entries() {
        assert_eq!(
            catalog.resolve(entry.name()).unwrap().qualified_name(),
            entry.qualified_name()
        );
    }
}

#[test]
fn test_independent_variable_is_not_a_parameter() {
    for entry in ModelCatalog::builtin().entries() {
        assert!(!entry.parameter_names().iter().any(|p| p == "x"));
        assert!(!entry.parameter_names().is_empty());
    }
}

#[test]
fn test_category_listing() {
    let catalog = ModelCatalog::builtin();
    let generic: Vec<&str> = catalog.models_in("GenericFunctions").map(|e| e.name()).collect();
    assert_eq!(generic, vec!["Sinusoidal", "Exponential"]);

    let experiment: Vec<&str> = catalog
        .models_in("ExperimentFunctions")
        .map(|e| e.name())
        .collect();
    assert_eq!(experiment, vec!["T1_Decay", "T2_Ramsey"]);
}

#[test]
fn test_builtin_evaluation() {
    let catalog = ModelCatalog::builtin();

    let exponential = catalog.resolve("GenericFunctions.Exponential").unwrap();
    let y = exponential.eval_array(&array![0.0, 1.0, 2.0], &[2.0, 3.0]).unwrap();
    assert_relative_eq!(y[2], 18.0);

    let gaussian = catalog.resolve("PeakFunctions.Gaussian").unwrap();
    assert_relative_eq!(gaussian.eval(0.5, &[2.0, 0.5, 0.1]).unwrap(), 2.0);
}

#[test]
fn test_wrong_parameter_count_is_an_error() {
    let gaussian = ModelCatalog::builtin().resolve("PeakFunctions.Gaussian").unwrap();
    assert!(matches!(gaussian.eval(0.5, &[]), Err(FitError::DimensionMismatch(_))));
    assert!(matches!(
        gaussian.eval(0.5, &[1.0, 2.0, 3.0, 4.0]),
        Err(FitError::DimensionMismatch(_))
    ));
    assert!(gaussian.eval_array(&array![0.0, 1.0], &[1.0]).is_err());
}

#[test]
fn test_unknown_models() {
    let catalog = ModelCatalog::builtin();
    for model in [
        "",
        "Sinusoid",
        "GenericFunctions.",
        ".Sinusoidal",
        "genericfunctions.Sinusoidal",
    ] {
        assert!(
            matches!(catalog.resolve(model), Err(FitError::UnknownModel(_))),
            "resolved {:?}",
            model
        );
    }
}
