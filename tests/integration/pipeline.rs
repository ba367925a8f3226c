//! A processing stage wired to an editor, as a front end would do it.

use crate::test_helpers::{dataset, noisy_sinusoid};
use fitnode_rs::dataset::{DataDict, Dataset, FITTING_OPTIONS_KEY};
use fitnode_rs::models::ModelCatalog;
use fitnode_rs::options::{FittingOptions, ParamOptions};
use fitnode_rs::stage::{FittingStage, StageEvent};
use fitnode_rs::transport::{EditorState, OptionsEditor};
use ndarray::{array, Array1};
use std::cell::RefCell;
use std::rc::Rc;

fn decay_options() -> FittingOptions {
    let entry = ModelCatalog::builtin()
        .resolve("ExperimentFunctions.T1_Decay")
        .unwrap();
    FittingOptions::create_default(entry)
        .with_param("amp", ParamOptions::free(1.0).with_bounds(Some(0.0), None))
        .with_param("tau", ParamOptions::free(3.0).with_bounds(Some(0.1), Some(100.0)))
}

fn decay_data() -> DataDict {
    let t = Array1::linspace(0.0, 30.0, 61);
    let p = t.mapv(|v: f64| 0.9 * (-v / 12.0).exp());
    DataDict::new()
        .with_axis("delay", t)
        .with_dependent("population", p, &["delay"])
}

#[test]
fn test_shape_guard_ignores_options() {
    let data = DataDict::new()
        .with_axis("x", array![0.0, 1.0, 2.0])
        .with_axis("y", array![0.0, 1.0, 2.0])
        .with_dependent("z", array![1.0, 2.0, 3.0], &["x", "y"])
        .with_meta(FITTING_OPTIONS_KEY, decay_options().to_value().unwrap());

    let mut stage = FittingStage::new();
    assert_eq!(stage.process(&data).unwrap(), data);

    stage.set_options(decay_options()).unwrap();
    assert_eq!(stage.process(&data).unwrap(), data);
}

#[test]
fn test_unconfigured_stage_passes_data_through() {
    let (x, y) = noisy_sinusoid(1, 0.02);
    let data = dataset(x, y);

    let mut stage = FittingStage::new();
    assert_eq!(stage.process(&data).unwrap(), data);
    assert!(stage.options().is_none());
}

#[test]
fn test_defaults_flow_downstream_and_into_the_editor() {
    // Upstream stage fits and records the options it used
    let mut upstream = FittingStage::new();
    upstream.set_options(decay_options()).unwrap();
    let fitted = upstream.process(&decay_data()).unwrap();
    assert_eq!(
        fitted.meta(FITTING_OPTIONS_KEY),
        Some(&decay_options().to_value().unwrap())
    );

    // Fed straight through, the extra `fit` dependent makes it ineligible
    let mut passthrough = FittingStage::new();
    assert_eq!(passthrough.process(&fitted).unwrap(), fitted);
    assert!(passthrough.options().is_none());

    // With the fit field dropped, the recorded options travel with the data
    let mut incoming = fitted.clone();
    incoming.remove_field("fit").unwrap();

    let editor = Rc::new(RefCell::new(EditorState::new()));
    let mut downstream = FittingStage::new();
    let shown = Rc::clone(&editor);
    downstream.subscribe(move |event| {
        if let StageEvent::DefaultsAdopted(options) = event {
            let mut editor = shown.borrow_mut();
            editor.remember_defaults(options.clone());
            editor.set(options.clone()).unwrap();
        }
    });

    let output = downstream.process(&incoming).unwrap();
    assert!(output.has_field("fit"));
    assert_eq!(editor.borrow().get().unwrap(), decay_options());

    // The user wanders off, then recalls the adopted defaults
    editor.borrow_mut().select_model("PeakFunctions.Gaussian").unwrap();
    assert!(editor.borrow_mut().recall_defaults().unwrap());
    assert_eq!(editor.borrow().get().unwrap(), decay_options());
}

#[test]
fn test_live_editor_drives_the_stage() {
    let stage = Rc::new(RefCell::new(FittingStage::new()));
    let errors = Rc::new(RefCell::new(Vec::new()));

    let mut editor = EditorState::new();
    let target = Rc::clone(&stage);
    let sink = Rc::clone(&errors);
    editor.subscribe(move |options: &FittingOptions| {
        if let Err(err) = target.borrow_mut().set_options(options.clone()) {
            sink.borrow_mut().push(err.to_string());
        }
    });
    editor.set_live(true);

    editor.select_model("ExperimentFunctions.T1_Decay").unwrap();
    editor.set_initial_guess("amp", 1.0).unwrap();
    editor.set_initial_guess("tau", 5.0).unwrap();
    editor.set_lower_bound_text("tau", "1").unwrap();

    // Not yet consistent: guess 5 above upper bound 2
    editor.set_upper_bound_text("tau", "2").unwrap();
    assert_eq!(errors.borrow().len(), 1);
    assert_eq!(
        stage.borrow().options().unwrap().param("tau").unwrap().upper_bound,
        None
    );

    editor.set_upper_bound_text("tau", "50").unwrap();
    assert_eq!(errors.borrow().len(), 1);

    let output = stage.borrow_mut().process(&decay_data()).unwrap();
    let fit = output.values_of("fit").unwrap();
    let target_curve = decay_data().values_of("population").unwrap();
    assert!(fit
        .iter()
        .zip(target_curve.iter())
        .all(|(f, t)| (f - t).abs() < 1e-6));
}
