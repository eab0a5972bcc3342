use causal_scm::fit::compute_noise_from_data;
use causal_scm::mechanisms::{AdditiveNoiseModel, NoiseKind, RidgeRegression};
use causal_scm::sampling::{Intervention, InterventionSpec, SamplingOptions, counterfactual_samples};
use causal_scm::{CausalError, CausalGraph, DataTable, ErrorCategory, Mechanism, StructuralCausalModel};
use nalgebra::DMatrix;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

/// X ~ N(0, 1), Y = 2X + N(0, 0.5), Z = 3Y + N(0, 0.5).
fn chain_data(n: usize, seed: u64) -> DataTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let unit = Normal::new(0.0, 1.0).unwrap();
    let small = Normal::new(0.0, 0.5).unwrap();
    let x: Vec<f64> = (0..n).map(|_| unit.sample(&mut rng)).collect();
    let y: Vec<f64> = x.iter().map(|v| 2.0 * v + small.sample(&mut rng)).collect();
    let z: Vec<f64> = y.iter().map(|v| 3.0 * v + small.sample(&mut rng)).collect();
    DataTable::from_columns([("X", x), ("Y", y), ("Z", z)]).unwrap()
}

fn chain_model() -> StructuralCausalModel {
    let graph = CausalGraph::from_edges([("X", "Y"), ("Y", "Z")]).unwrap();
    let mut scm = StructuralCausalModel::new(graph);
    scm.assign_default_mechanisms().unwrap();
    scm
}

fn slope_and_intercept(scm: &StructuralCausalModel, node: &str) -> (f64, f64) {
    let Mechanism::AdditiveNoise(model) = scm.causal_mechanism(node).unwrap() else {
        panic!("{node} should carry an additive-noise model");
    };
    let p = model.predict(&DMatrix::from_column_slice(2, 1, &[0.0, 1.0])).unwrap();
    (p[1] - p[0], p[0])
}

#[test]
fn fitted_chain_recovers_coefficients() {
    let mut scm = chain_model();
    let summary = scm.fit(&chain_data(2_000, 11)).unwrap();
    assert_eq!(summary.n_rows, 2_000);
    assert_eq!(summary.nodes.len(), 3);

    let (a, a0) = slope_and_intercept(&scm, "Y");
    let (b, b0) = slope_and_intercept(&scm, "Z");
    assert!((a - 2.0).abs() < 0.1, "slope {a}");
    assert!((b - 3.0).abs() < 0.1, "slope {b}");
    assert!(a0.abs() < 0.1 && b0.abs() < 0.1);
}

#[test]
fn coefficient_error_shrinks_as_rows_grow() {
    let total_error = |n: usize| -> f64 {
        (0..5_u64)
            .map(|seed| {
                let mut scm = chain_model();
                scm.fit(&chain_data(n, 100 + seed)).unwrap();
                let (a, _) = slope_and_intercept(&scm, "Y");
                let (b, _) = slope_and_intercept(&scm, "Z");
                (a - 2.0).abs() + (b - 3.0).abs()
            })
            .sum()
    };
    let small = total_error(50);
    let large = total_error(20_000);
    assert!(large < small, "error at n=20000 ({large}) should be below n=50 ({small})");
    assert!(large < 0.08, "{large}");
}

#[test]
fn hard_intervention_cuts_upstream_influence() {
    let mut scm = chain_model();
    scm.fit(&chain_data(1_000, 3)).unwrap();

    let spec = InterventionSpec::new().with("Y", Intervention::constant(10.0));
    let samples = scm
        .interventional_samples(&spec, 5_000, &SamplingOptions::with_seed(1))
        .unwrap();

    assert!(samples.column("Y").unwrap().iter().all(|v| *v == 10.0));
    let z_mean = samples.mean("Z").unwrap();
    assert!((z_mean - 30.0).abs() < 0.2, "E[Z | do(Y = 10)] = {z_mean}");
    let x_mean = samples.mean("X").unwrap();
    assert!(x_mean.abs() < 0.1, "X is upstream and unaffected, mean {x_mean}");
}

#[test]
fn samples_match_graph_schema_and_are_reproducible() {
    let mut scm = chain_model();
    scm.fit(&chain_data(300, 5)).unwrap();

    for seed in [0_u64, 1, 99] {
        let options = SamplingOptions::with_seed(seed);
        let a = scm.draw_samples(64, &options).unwrap();
        let names: Vec<&str> = a.column_names().map(|v| v.as_str()).collect();
        assert_eq!(names, vec!["X", "Y", "Z"]);
        assert_eq!(a.n_rows(), 64);

        let parallel = SamplingOptions {
            parallel_roots: true,
            ..options.clone()
        };
        let b = scm.draw_samples(64, &parallel).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn counterfactuals_use_abducted_noise() {
    let mut scm = chain_model();
    let data = chain_data(500, 8);
    scm.fit(&data).unwrap();

    let rows = data.select_rows(&[0, 1, 2, 3]).unwrap();
    let noise = compute_noise_from_data(&scm, &rows).unwrap();
    assert_eq!(noise.column("X").unwrap(), rows.column("X").unwrap());

    let spec = InterventionSpec::new().with("X", Intervention::constant(0.0));
    let cf = counterfactual_samples(&scm, &spec, &rows, &SamplingOptions::default()).unwrap();
    let (a, _) = slope_and_intercept(&scm, "Y");
    let y_obs = rows.column("Y").unwrap();
    let x_obs = rows.column("X").unwrap();
    let y_cf = cf.column("Y").unwrap();
    for i in 0..4 {
        let expected = y_obs[i] - a * x_obs[i];
        assert!((y_cf[i] - expected).abs() < 1e-9);
    }
}

#[test]
fn missing_column_fails_before_any_fitting() {
    let mut scm = chain_model();
    let data = chain_data(50, 2);
    let partial = DataTable::from_columns([
        ("X", data.column("X").unwrap().to_vec()),
        ("Y", data.column("Y").unwrap().to_vec()),
    ])
    .unwrap();
    let err = scm.fit(&partial).unwrap_err();
    assert!(matches!(err, CausalError::MissingColumn(ref n) if n == "Z"));
    assert_eq!(err.category(), ErrorCategory::Structural);
    assert!(!scm.is_fitted());
}

#[test]
fn sampling_before_fit_is_a_precondition_error() {
    let scm = chain_model();
    let err = scm.draw_samples(10, &SamplingOptions::default()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::SamplingPrecondition);
}

#[test]
fn custom_mechanisms_fit_and_sample() {
    let mut scm = chain_model();
    scm.set_causal_mechanism(
        "Z",
        AdditiveNoiseModel::new(Box::new(RidgeRegression::new(0.5)), NoiseKind::Gaussian),
    )
    .unwrap();
    scm.fit(&chain_data(400, 21)).unwrap();
    let (b, _) = slope_and_intercept(&scm, "Z");
    assert!((b - 3.0).abs() < 0.2, "ridge slope {b}");

    let samples = scm.draw_samples(200, &SamplingOptions::default()).unwrap();
    assert!(samples.column("Z").unwrap().iter().all(|v| v.is_finite()));
}

#[test]
fn root_role_is_enforced() {
    let mut scm = chain_model();
    let err = scm.set_causal_mechanism("X", Mechanism::linear()).unwrap_err();
    assert!(matches!(err, CausalError::MechanismMismatch { .. }));
}
