use causal_scm::mediation::{
    EffectKind, EstimateOptions, IdentifyOptions, IntervalMethod, estimate_effect, estimate_mediation_effects,
    identify_effect,
};
use causal_scm::sampling::{Intervention, InterventionSpec, SamplingOptions};
use causal_scm::{CausalError, CausalGraph, DataTable, ErrorCategory, StructuralCausalModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// W -> T, W -> O, T -> M -> O with no direct T -> O effect.
fn frontdoor_data(n: usize, seed: u64) -> DataTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.0).unwrap();
    let w: Vec<f64> = (0..n).map(|_| noise.sample(&mut rng)).collect();
    let t: Vec<f64> = w
        .iter()
        .map(|wv| {
            let p = if *wv > 0.0 { 0.7 } else { 0.3 };
            if rng.r#gen::<f64>() < p { 1.0 } else { 0.0 }
        })
        .collect();
    let m: Vec<f64> = t.iter().map(|tv| 2.0 * tv + noise.sample(&mut rng)).collect();
    let o: Vec<f64> = m
        .iter()
        .zip(&w)
        .map(|(mv, wv)| 1.5 * mv + wv + noise.sample(&mut rng))
        .collect();
    DataTable::from_columns([("W", w), ("T", t), ("M", m), ("O", o)]).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn frontdoor_graph() -> CausalGraph {
    CausalGraph::from_edges([("W", "T"), ("W", "O"), ("T", "M"), ("M", "O")]).unwrap()
}

#[test]
fn indirect_effect_carries_the_whole_effect() {
    init_tracing();
    let data = frontdoor_data(3_000, 17);
    let options = EstimateOptions {
        confidence_intervals: true,
        significance_test: true,
        num_simulations: 100,
        ..EstimateOptions::default()
    };
    let report = estimate_mediation_effects(
        &frontdoor_graph(),
        &data,
        "T",
        "O",
        &IdentifyOptions::default(),
        &options,
    )
    .unwrap();

    assert_eq!(report.natural_indirect.estimand.confounders.len(), 1);
    let nie = report.natural_indirect.value;
    let nde = report.natural_direct.value;
    assert!((nie - 3.0).abs() < 0.25, "NIE {nie}");
    assert!(nde.abs() < 0.25, "NDE {nde}");

    let (lo, hi) = report.natural_indirect.confidence_interval.unwrap();
    assert!(lo < nie && nie < hi);
    assert!(report.natural_indirect.p_value.unwrap() < 0.01);
    let fwer = report.family_wise_p_value.unwrap();
    assert!((0.0..=1.0).contains(&fwer));
}

#[test]
fn effect_error_shrinks_as_rows_grow() {
    let estimand = |kind| {
        identify_effect(&frontdoor_graph(), kind, "T", "O", &IdentifyOptions::default()).unwrap()
    };
    let nie = estimand(EffectKind::NaturalIndirectEffect);
    let nde = estimand(EffectKind::NaturalDirectEffect);
    let options = EstimateOptions::default();

    let total_error = |n: usize| -> f64 {
        (0..5_u64)
            .map(|seed| {
                let data = frontdoor_data(n, 500 + seed);
                let indirect = estimate_effect(&nie, &data, &options).unwrap().value;
                let direct = estimate_effect(&nde, &data, &options).unwrap().value;
                (indirect - 3.0).abs() + direct.abs()
            })
            .sum()
    };
    let small = total_error(60);
    let large = total_error(20_000);
    assert!(large < small, "error at n=20000 ({large}) should be below n=60 ({small})");
    assert!(large < 0.5, "{large}");
}

#[test]
fn estimate_matches_simulated_interventional_contrast() {
    let data = frontdoor_data(2_000, 4);
    let mut scm = StructuralCausalModel::new(frontdoor_graph());
    scm.assign_default_mechanisms().unwrap();
    scm.fit(&data).unwrap();

    let opts = SamplingOptions::with_seed(13);
    let treated = scm
        .interventional_samples(&InterventionSpec::new().with("T", Intervention::constant(1.0)), 20_000, &opts)
        .unwrap();
    let control = scm
        .interventional_samples(&InterventionSpec::new().with("T", Intervention::constant(0.0)), 20_000, &opts)
        .unwrap();
    let ate = treated.mean("O").unwrap() - control.mean("O").unwrap();

    let estimand = identify_effect(
        scm.graph(),
        EffectKind::NaturalIndirectEffect,
        "T",
        "O",
        &IdentifyOptions::default(),
    )
    .unwrap();
    let nie = estimate_effect(&estimand, &data, &EstimateOptions::default()).unwrap();
    assert!((nie.value - ate).abs() < 0.2, "NIE {} vs ATE {ate}", nie.value);
}

#[test]
fn analytic_and_bootstrap_intervals_agree_roughly() {
    let data = frontdoor_data(2_000, 23);
    let estimand = identify_effect(
        &frontdoor_graph(),
        EffectKind::NaturalIndirectEffect,
        "T",
        "O",
        &IdentifyOptions::default(),
    )
    .unwrap();
    let base = EstimateOptions {
        confidence_intervals: true,
        num_simulations: 200,
        ..EstimateOptions::default()
    };
    let boot = estimate_effect(&estimand, &data, &base).unwrap();
    let analytic = estimate_effect(
        &estimand,
        &data,
        &EstimateOptions {
            method: IntervalMethod::Analytic,
            ..base.clone()
        },
    )
    .unwrap();

    assert_eq!(boot.value, analytic.value);
    let (bl, bh) = boot.confidence_interval.unwrap();
    let (al, ah) = analytic.confidence_interval.unwrap();
    let (bw, aw) = (bh - bl, ah - al);
    assert!(bw > 0.0 && aw > 0.0);
    assert!(bw / aw > 0.5 && bw / aw < 2.0, "widths {bw} vs {aw}");
}

#[test]
fn no_mediator_is_an_identification_error() {
    let graph = CausalGraph::from_edges([("T", "O")]).unwrap();
    let data = DataTable::from_columns([("T", vec![0.0, 1.0, 0.0, 1.0, 1.0]), ("O", vec![0.1, 1.2, 0.0, 0.9, 1.1])])
        .unwrap();
    let err = estimate_mediation_effects(
        &graph,
        &data,
        "T",
        "O",
        &IdentifyOptions::default(),
        &EstimateOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Identification);
}

#[test]
fn missing_mediator_column_is_reported() {
    let data = frontdoor_data(100, 1);
    let estimand = identify_effect(
        &frontdoor_graph(),
        EffectKind::NaturalDirectEffect,
        "T",
        "O",
        &IdentifyOptions::default(),
    )
    .unwrap();
    let without_m = DataTable::from_columns(
        ["W", "T", "O"].map(|c| (c, data.column(c).unwrap().to_vec())),
    )
    .unwrap();
    let err = estimate_effect(&estimand, &without_m, &EstimateOptions::default()).unwrap_err();
    assert!(matches!(err, CausalError::MissingColumn(ref n) if n == "M"));
}
