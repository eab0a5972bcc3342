//! Small descriptive statistics and p-value helpers.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{CausalError, Result};

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (`n - 1` denominator).
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() as f64 - 1.0)).sqrt())
}

/// Quantile with linear interpolation between order statistics.
///
/// Matches the default definition used by NumPy (`h = (n - 1) q`).
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Some(quantile_sorted(&sorted, q))
}

fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let h = (sorted.len() as f64 - 1.0) * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Two-sided p-value of a z statistic under the standard normal.
pub fn two_sided_normal_p_value(z: f64) -> f64 {
    if !z.is_finite() {
        return if z.is_nan() { f64::NAN } else { 0.0 };
    }
    // `Normal::new(0, 1)` cannot fail.
    match Normal::new(0.0, 1.0) {
        Ok(n) => (2.0 * (1.0 - n.cdf(z.abs()))).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}

/// Standard normal quantile, used for symmetric confidence intervals.
pub fn normal_quantile(p: f64) -> Option<f64> {
    if !(p > 0.0 && p < 1.0) {
        return None;
    }
    Normal::new(0.0, 1.0).ok().map(|n| n.inverse_cdf(p))
}

/// Quantile-based family-wise error rate control.
///
/// Meinshausen, N., Meier, L. and Bühlmann, P. (2009). p-values for
/// high-dimensional regression. JASA 104, 1671–1681.
///
/// Each p-value is multiplied by its scaling factor (default 1) and capped at 1.
/// NaN p-values are dropped together with their scaling factor. A single
/// remaining p-value is returned as-is; otherwise the result is
/// `min(1, Q_q(p / q))`.
pub fn quantile_based_fwer(p_values: &[f64], scaling: Option<&[f64]>, q: f64) -> Result<f64> {
    if !(q > 0.0 && q <= 1.0) {
        return Err(CausalError::invalid(format!(
            "The given quantile is {q}, but it needs to be on (0, 1]."
        )));
    }
    if let Some(s) = scaling {
        if s.len() != p_values.len() {
            return Err(CausalError::invalid(
                "The p-value scaling array needs to have the same dimension as the given p-values.",
            ));
        }
    }

    let scaled: Vec<f64> = p_values
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.is_nan())
        .map(|(i, &p)| {
            let factor = scaling.map(|s| s[i]).unwrap_or(1.0);
            (p * factor).min(1.0)
        })
        .collect();

    match scaled.len() {
        0 => Err(CausalError::invalid("No finite p-values to adjust.")),
        1 => Ok(scaled[0]),
        _ => {
            let adjusted: Vec<f64> = scaled.iter().map(|p| p / q).collect();
            let value = quantile(&adjusted, q).unwrap_or(1.0);
            Ok(value.min(1.0))
        }
    }
}
