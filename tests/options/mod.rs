//! Tests for fitting options and the editor transport.

use fitnode_rs::models::ModelCatalog;
use fitnode_rs::options::{parse_bound, parse_value, FittingOptions, ParamOptions};
use fitnode_rs::transport::{EditorState, OptionsEditor};
use fitnode_rs::FitError;

fn ramsey_options() -> FittingOptions {
    let entry = ModelCatalog::builtin()
        .resolve("ExperimentFunctions.T2_Ramsey")
        .unwrap();
    FittingOptions::create_default(entry)
        .with_param("amp", ParamOptions::free(0.9).with_bounds(Some(0.0), Some(1.0)))
        .with_param("tau", ParamOptions::free(20.0).with_bounds(Some(0.0), None))
        .with_param("freq", ParamOptions::free(0.1))
        .with_param("phase", ParamOptions::fixed_at(0.0).with_bounds(Some(-3.2), Some(3.2)))
}

#[test]
fn test_editor_roundtrip_for_every_model() {
    let catalog = ModelCatalog::builtin();
    let mut editor = EditorState::new();

    for entry in catalog.entries() {
        let mut options = FittingOptions::create_default(entry);
        for (i, name) in entry.parameter_names().iter().enumerate() {
            let guess = i as f64 + 0.5;
            let param = if i % 2 == 0 {
                ParamOptions::free(guess).with_bounds(Some(-10.0), None)
            } else {
                ParamOptions::fixed_at(guess)
            };
            options = options.with_param(name, param);
        }
        options.validate(entry).unwrap();

        editor.set(options.clone()).unwrap();
        assert_eq!(editor.get().unwrap(), options);
    }
}

#[test]
fn test_switching_model_drops_old_parameters() {
    let mut editor = EditorState::new();
    editor.set(ramsey_options()).unwrap();
    editor.select_model("GenericFunctions.Exponential").unwrap();

    let options = editor.get().unwrap();
    for name in ramsey_options().parameters.keys() {
        assert!(!options.parameters.contains_key(name));
    }
    assert_eq!(options.parameters.len(), 2);
}

#[test]
fn test_json_payload_shape() {
    let value = ramsey_options().to_value().unwrap();
    assert_eq!(value["model"], "ExperimentFunctions.T2_Ramsey");
    assert_eq!(value["parameters"]["tau"]["upperBound"], serde_json::Value::Null);
    assert_eq!(value["parameters"]["phase"]["fixed"], true);
    assert_eq!(FittingOptions::from_value(&value).unwrap(), ramsey_options());
}

#[test]
fn test_typed_fields_never_fall_back_to_unbounded() {
    assert!(matches!(parse_bound("1e400x"), Err(FitError::InvalidNumber(_))));
    assert!(matches!(parse_bound("np.inf"), Err(FitError::InvalidNumber(_))));
    assert!(matches!(parse_value("1,5"), Err(FitError::InvalidNumber(_))));

    let mut editor = EditorState::new();
    editor.set(ramsey_options()).unwrap();
    assert!(editor.set_lower_bound_text("amp", "zero").is_err());
    assert_eq!(editor.get().unwrap(), ramsey_options());
}

#[test]
fn test_configuration_errors_are_flagged() {
    let entry = ModelCatalog::builtin()
        .resolve("ExperimentFunctions.T2_Ramsey")
        .unwrap();
    let bad = ramsey_options().with_param(
        "freq",
        ParamOptions::free(2.0).with_bounds(Some(0.0), Some(1.0)),
    );

    let err = bad.validate(entry).unwrap_err();
    assert!(err.is_configuration_error());
    assert!(err.to_string().contains("freq"));
}
