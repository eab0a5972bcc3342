//! Confidence intervals and significance tests for mediation effects.
//!
//! Two interchangeable methods:
//! - `Bootstrap`: refit both stages on resampled rows; percentile interval,
//!   two-sided sign-proportion p-value. Replicates run on the rayon pool, each
//!   from its own seed, so results do not depend on scheduling.
//! - `Analytic`: normal theory. NDE uses the OLS standard error of the direct
//!   coefficient; NIE uses the Sobel (first-order delta method) standard error
//!   of the coefficient product.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::DataTable;
use crate::error::{CausalError, Result};
use crate::math::{derive_seed, normal_quantile, quantile, two_sided_normal_p_value};
use crate::mediation::estimand::{EffectEstimand, EffectKind};
use crate::mediation::estimate::{EstimateOptions, TwoStageFit, fit_two_stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalMethod {
    #[default]
    Bootstrap,
    Analytic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Inference {
    pub interval: Option<(f64, f64)>,
    pub p_value: Option<f64>,
}

pub(crate) fn bootstrap_inference(
    estimand: &EffectEstimand,
    data: &DataTable,
    options: &EstimateOptions,
) -> Result<Inference> {
    let n = data.n_rows();
    let size = ((n as f64 * options.sample_fraction).ceil() as usize).clamp(1, n);

    let draws: Vec<Option<f64>> = (0..options.num_simulations)
        .into_par_iter()
        .map(|r| {
            let mut rng = StdRng::seed_from_u64(derive_seed(options.seed, r as u64));
            let rows: Vec<usize> = (0..size).map(|_| rng.gen_range(0..n)).collect();
            let resampled = data.select_rows(&rows).ok()?;
            fit_two_stage(estimand, &resampled, options.treatment_value, options.control_value)
                .ok()
                .map(|fit| fit.effect(estimand.kind))
        })
        .collect();

    let estimates: Vec<f64> = draws.into_iter().flatten().collect();
    let failed = options.num_simulations - estimates.len();
    debug!(
        effect = %estimand.kind,
        replicates = estimates.len(),
        failed,
        "bootstrap finished"
    );
    if estimates.len() < 2 {
        return Err(CausalError::fit(
            estimand.outcome.as_str(),
            format!("only {} bootstrap replicates could be fitted", estimates.len()),
        ));
    }

    let alpha = 1.0 - options.confidence_level;
    let lower = quantile(&estimates, alpha / 2.0);
    let upper = quantile(&estimates, 1.0 - alpha / 2.0);
    let interval = lower.zip(upper);

    let total = estimates.len() as f64;
    let below = estimates.iter().filter(|v| **v <= 0.0).count() as f64 / total;
    let above = estimates.iter().filter(|v| **v >= 0.0).count() as f64 / total;
    let p_value = (2.0 * below.min(above)).min(1.0);

    Ok(Inference {
        interval,
        p_value: Some(p_value),
    })
}

pub(crate) fn analytic_inference(
    kind: EffectKind,
    fit: &TwoStageFit,
    value: f64,
    options: &EstimateOptions,
) -> Result<Inference> {
    let missing = || CausalError::invalid("Not enough residual degrees of freedom for standard errors.");
    let se_med = fit.mediator_model.std_errors.as_ref().ok_or_else(missing)?;
    let se_out = fit.outcome_model.std_errors.as_ref().ok_or_else(missing)?;

    let delta = (options.treatment_value - options.control_value).abs();
    let se = match kind {
        EffectKind::NaturalDirectEffect => delta * se_out[2],
        EffectKind::NaturalIndirectEffect => {
            let a = fit.mediator_model.coefficients[1];
            let b = fit.outcome_model.coefficients[1];
            delta * (b * b * se_med[1] * se_med[1] + a * a * se_out[1] * se_out[1]).sqrt()
        }
    };

    let z_crit = normal_quantile(1.0 - (1.0 - options.confidence_level) / 2.0)
        .ok_or_else(|| CausalError::invalid("Confidence level must be in (0, 1)."))?;

    let (interval, p_value) = if se > 0.0 && se.is_finite() {
        (
            (value - z_crit * se, value + z_crit * se),
            two_sided_normal_p_value(value / se),
        )
    } else {
        ((value, value), if value == 0.0 { 1.0 } else { 0.0 })
    };

    Ok(Inference {
        interval: Some(interval),
        p_value: Some(p_value),
    })
}
