//! Two-stage regression estimator for natural direct / indirect effects.
//!
//! Stage 1 models the mediator, stage 2 the outcome:
//!
//! ```text
//! m̂(t, w)    = α0 + a·t + α_w·w
//! ŷ(m, t, w) = β0 + b·m + c·t + β_w·w
//! ```
//!
//! With treatment level `t1` and control level `t0`, averaged over rows:
//!
//! ```text
//! NIE = ŷ(m̂(t1, w), t1, w) - ŷ(m̂(t0, w), t1, w)
//! NDE = ŷ(m̂(t0, w), t1, w) - ŷ(m̂(t0, w), t0, w)
//! ```
//!
//! For these linear stages that is `a·b·(t1 - t0)` and `c·(t1 - t0)`.
//!
//! The estimate is only as good as the graph: if the data were generated by a
//! process that violates the assumed mediation structure, the number returned
//! is still finite but carries no causal meaning. That is not detected here.

use std::fmt;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::DataTable;
use crate::error::{CausalError, Result};
use crate::graph::CausalGraph;
use crate::math::{OlsFit, fit_ols, quantile_based_fwer};
use crate::mediation::estimand::{EffectEstimand, EffectKind};
use crate::mediation::identify::{IdentifyOptions, identify_effect};
use crate::mediation::intervals::{Inference, IntervalMethod, analytic_inference, bootstrap_inference};

/// Estimation settings. Intervals and tests are off by default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateOptions {
    pub treatment_value: f64,
    pub control_value: f64,
    pub confidence_intervals: bool,
    pub significance_test: bool,
    pub confidence_level: f64,
    pub method: IntervalMethod,
    /// Bootstrap replicates.
    pub num_simulations: usize,
    /// Bootstrap resample size as a fraction of the data.
    pub sample_fraction: f64,
    pub seed: u64,
}

impl Default for EstimateOptions {
    fn default() -> Self {
        Self {
            treatment_value: 1.0,
            control_value: 0.0,
            confidence_intervals: false,
            significance_test: false,
            confidence_level: 0.95,
            method: IntervalMethod::Bootstrap,
            num_simulations: 200,
            sample_fraction: 1.0,
            seed: 42,
        }
    }
}

impl EstimateOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.treatment_value.is_finite() && self.control_value.is_finite()) {
            return Err(CausalError::invalid("Treatment and control values must be finite."));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(CausalError::invalid(format!(
                "Confidence level must be in (0, 1), got {}.",
                self.confidence_level
            )));
        }
        if self.method == IntervalMethod::Bootstrap
            && (self.confidence_intervals || self.significance_test)
        {
            if self.num_simulations < 2 {
                return Err(CausalError::invalid("Bootstrap needs at least 2 simulations."));
            }
            if !(self.sample_fraction > 0.0 && self.sample_fraction <= 1.0) {
                return Err(CausalError::invalid(format!(
                    "Bootstrap sample fraction must be in (0, 1], got {}.",
                    self.sample_fraction
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectEstimate {
    pub estimand: EffectEstimand,
    pub value: f64,
    pub confidence_interval: Option<(f64, f64)>,
    pub p_value: Option<f64>,
    pub treatment_value: f64,
    pub control_value: f64,
    pub n_obs: usize,
}

impl fmt::Display for EffectEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {:.6}", self.estimand, self.value)?;
        if let Some((lo, hi)) = self.confidence_interval {
            write!(f, " [{lo:.6}, {hi:.6}]")?;
        }
        if let Some(p) = self.p_value {
            write!(f, " (p = {p:.4})")?;
        }
        Ok(())
    }
}

/// Both natural effects of one treatment/outcome pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediationReport {
    pub natural_direct: EffectEstimate,
    pub natural_indirect: EffectEstimate,
    /// Quantile-based FWER adjustment of the two p-values, when both exist.
    pub family_wise_p_value: Option<f64>,
}

/// Fitted stages plus the derived effects.
#[derive(Debug, Clone)]
pub(crate) struct TwoStageFit {
    pub mediator_model: OlsFit,
    pub outcome_model: OlsFit,
    pub nde: f64,
    pub nie: f64,
}

impl TwoStageFit {
    pub(crate) fn effect(&self, kind: EffectKind) -> f64 {
        match kind {
            EffectKind::NaturalDirectEffect => self.nde,
            EffectKind::NaturalIndirectEffect => self.nie,
        }
    }
}

/// `[1, leading..., W]` design matrix.
fn design(leading: &[&DVector<f64>], w: &DMatrix<f64>) -> DMatrix<f64> {
    let n = w.nrows();
    let p = 1 + leading.len() + w.ncols();
    DMatrix::from_fn(n, p, |i, j| {
        if j == 0 {
            1.0
        } else if j <= leading.len() {
            leading[j - 1][i]
        } else {
            w[(i, j - 1 - leading.len())]
        }
    })
}

pub(crate) fn fit_two_stage(
    estimand: &EffectEstimand,
    data: &DataTable,
    t1: f64,
    t0: f64,
) -> Result<TwoStageFit> {
    let t = data.vector(estimand.treatment.as_str())?;
    let m = data.vector(estimand.mediator.as_str())?;
    let y = data.vector(estimand.outcome.as_str())?;
    let w = data.matrix(&estimand.confounders)?;
    let n = t.len();

    // Stage 2 has intercept + mediator + treatment + confounders.
    let p = 3 + w.ncols();
    if n <= p {
        return Err(CausalError::invalid(format!(
            "Need more than {p} rows to estimate {}, got {n}.",
            estimand.kind
        )));
    }

    let mediator_model = fit_ols(&design(&[&t], &w), &m).ok_or_else(|| {
        CausalError::fit(estimand.mediator.as_str(), "mediator regression is singular")
    })?;
    let outcome_model = fit_ols(&design(&[&m, &t], &w), &y).ok_or_else(|| {
        CausalError::fit(estimand.outcome.as_str(), "outcome regression is singular")
    })?;

    let alpha = &mediator_model.coefficients;
    let beta = &outcome_model.coefficients;

    let t1v = DVector::from_element(n, t1);
    let t0v = DVector::from_element(n, t0);
    let m_hat_t1 = design(&[&t1v], &w) * alpha;
    let m_hat_t0 = design(&[&t0v], &w) * alpha;

    let y_m1_t1 = design(&[&m_hat_t1, &t1v], &w) * beta;
    let y_m0_t1 = design(&[&m_hat_t0, &t1v], &w) * beta;
    let y_m0_t0 = design(&[&m_hat_t0, &t0v], &w) * beta;

    let nie = (y_m1_t1 - &y_m0_t1).mean();
    let nde = (y_m0_t1 - y_m0_t0).mean();

    if !(nie.is_finite() && nde.is_finite()) {
        return Err(CausalError::fit(estimand.outcome.as_str(), "non-finite effect estimate"));
    }

    Ok(TwoStageFit {
        mediator_model,
        outcome_model,
        nde,
        nie,
    })
}

fn check_columns(estimand: &EffectEstimand, data: &DataTable) -> Result<()> {
    let roles = [&estimand.treatment, &estimand.mediator, &estimand.outcome];
    for name in roles.into_iter().chain(estimand.confounders.iter()) {
        let col = data.require_column(name.as_str())?;
        if col.iter().any(|v| !v.is_finite()) {
            return Err(CausalError::invalid(format!("Column '{name}' contains non-finite values.")));
        }
    }
    Ok(())
}

/// Estimate one natural effect by two-stage regression.
pub fn estimate_effect(
    estimand: &EffectEstimand,
    data: &DataTable,
    options: &EstimateOptions,
) -> Result<EffectEstimate> {
    options.validate()?;
    check_columns(estimand, data)?;

    let fit = fit_two_stage(estimand, data, options.treatment_value, options.control_value)?;
    let value = fit.effect(estimand.kind);

    let inference = if options.confidence_intervals || options.significance_test {
        match options.method {
            IntervalMethod::Bootstrap => bootstrap_inference(estimand, data, options)?,
            IntervalMethod::Analytic => analytic_inference(estimand.kind, &fit, value, options)?,
        }
    } else {
        Inference::default()
    };

    let estimate = EffectEstimate {
        estimand: estimand.clone(),
        value,
        confidence_interval: inference.interval.filter(|_| options.confidence_intervals),
        p_value: inference.p_value.filter(|_| options.significance_test),
        treatment_value: options.treatment_value,
        control_value: options.control_value,
        n_obs: data.n_rows(),
    };
    info!(
        effect = %estimand.kind,
        treatment = %estimand.treatment,
        outcome = %estimand.outcome,
        value = estimate.value,
        p_value = ?estimate.p_value,
        "estimated mediation effect"
    );
    Ok(estimate)
}

/// Identify and estimate both natural effects.
pub fn estimate_mediation_effects(
    graph: &CausalGraph,
    data: &DataTable,
    treatment: &str,
    outcome: &str,
    identify: &IdentifyOptions,
    options: &EstimateOptions,
) -> Result<MediationReport> {
    let nde_estimand = identify_effect(graph, EffectKind::NaturalDirectEffect, treatment, outcome, identify)?;
    let nie_estimand = EffectEstimand {
        kind: EffectKind::NaturalIndirectEffect,
        ..nde_estimand.clone()
    };

    let natural_direct = estimate_effect(&nde_estimand, data, options)?;
    let natural_indirect = estimate_effect(&nie_estimand, data, options)?;

    let family_wise_p_value = match (natural_direct.p_value, natural_indirect.p_value) {
        (Some(a), Some(b)) => Some(quantile_based_fwer(&[a, b], None, 0.5)?),
        _ => None,
    };

    Ok(MediationReport {
        natural_direct,
        natural_indirect,
        family_wise_p_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_estimand(kind: EffectKind) -> EffectEstimand {
        EffectEstimand {
            kind,
            treatment: "T".into(),
            outcome: "O".into(),
            mediator: "M".into(),
            confounders: vec![],
            identified: true,
        }
    }

    /// Deterministic data: M = 2T + e1, O = 3M + 0.5T + e2.
    fn linear_data() -> DataTable {
        let n = 40;
        let t: Vec<f64> = (0..n).map(|i| (i % 2) as f64).collect();
        let e1: Vec<f64> = (0..n).map(|i| ((i * 7 % 11) as f64 - 5.0) / 10.0).collect();
        let e2: Vec<f64> = (0..n).map(|i| ((i * 5 % 13) as f64 - 6.0) / 10.0).collect();
        let m: Vec<f64> = (0..n).map(|i| 2.0 * t[i] + e1[i]).collect();
        let o: Vec<f64> = (0..n).map(|i| 3.0 * m[i] + 0.5 * t[i] + e2[i]).collect();
        DataTable::from_columns([("T", t), ("M", m), ("O", o)]).unwrap()
    }

    #[test]
    fn effects_match_coefficient_products() {
        let data = linear_data();
        let est = chain_estimand(EffectKind::NaturalIndirectEffect);
        let fit = fit_two_stage(&est, &data, 1.0, 0.0).unwrap();
        let a = fit.mediator_model.coefficients[1];
        let b = fit.outcome_model.coefficients[1];
        let c = fit.outcome_model.coefficients[2];
        assert!((fit.nie - a * b).abs() < 1e-9);
        assert!((fit.nde - c).abs() < 1e-9);

        let scaled = fit_two_stage(&est, &data, 3.0, 1.0).unwrap();
        assert!((scaled.nie - 2.0 * a * b).abs() < 1e-9);
    }

    #[test]
    fn intervals_are_off_by_default() {
        let data = linear_data();
        let e = estimate_effect(&chain_estimand(EffectKind::NaturalDirectEffect), &data, &EstimateOptions::default())
            .unwrap();
        assert!(e.confidence_interval.is_none());
        assert!(e.p_value.is_none());
        assert_eq!(e.n_obs, 40);
    }

    #[test]
    fn too_few_rows_is_invalid_input() {
        let data = DataTable::from_columns([("T", vec![0.0, 1.0]), ("M", vec![0.0, 2.0]), ("O", vec![0.0, 6.0])])
            .unwrap();
        let err = estimate_effect(&chain_estimand(EffectKind::NaturalIndirectEffect), &data, &EstimateOptions::default())
            .unwrap_err();
        assert!(matches!(err, CausalError::InvalidInput(_)));
    }

    #[test]
    fn bad_confidence_level_is_rejected() {
        let opts = EstimateOptions {
            confidence_level: 1.0,
            ..EstimateOptions::default()
        };
        let err = estimate_effect(&chain_estimand(EffectKind::NaturalIndirectEffect), &linear_data(), &opts)
            .unwrap_err();
        assert!(matches!(err, CausalError::InvalidInput(_)));
    }
}
