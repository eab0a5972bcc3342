//! Unconditional distributions: root-node marginals and additive noise terms.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{CausalError, Result};
use crate::math::{mean, std_dev};

/// Distribution that replays the observed values.
///
/// Fitting stores the data verbatim; sampling draws uniformly with replacement.
#[derive(Debug, Clone, Default)]
pub struct EmpiricalDistribution {
    data: Option<Vec<f64>>,
}

impl EmpiricalDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, values: &[f64]) -> Result<()> {
        if values.is_empty() {
            return Err(CausalError::fit("", "no observations"));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(CausalError::fit("", "non-finite observation"));
        }
        self.data = Some(values.to_vec());
        Ok(())
    }

    pub fn is_fitted(&self) -> bool {
        self.data.is_some()
    }

    /// Stored observations, if fitted.
    pub fn data(&self) -> Option<&[f64]> {
        self.data.as_deref()
    }

    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Vec<f64>> {
        let data = self.data.as_ref().ok_or(CausalError::NotFitted)?;
        Ok((0..n).map(|_| data[rng.gen_range(0..data.len())]).collect())
    }
}

/// Normal distribution parameterized by the residual mean and spread.
#[derive(Debug, Clone, Default)]
pub struct GaussianDistribution {
    params: Option<(f64, f64)>,
}

impl GaussianDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, values: &[f64]) -> Result<()> {
        let mu = mean(values).ok_or_else(|| CausalError::fit("", "no observations"))?;
        let sigma = std_dev(values).unwrap_or(0.0);
        if !(mu.is_finite() && sigma.is_finite()) {
            return Err(CausalError::fit("", "non-finite residual moments"));
        }
        self.params = Some((mu, sigma));
        Ok(())
    }

    pub fn is_fitted(&self) -> bool {
        self.params.is_some()
    }

    /// `(mean, std_dev)` if fitted.
    pub fn params(&self) -> Option<(f64, f64)> {
        self.params
    }

    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Vec<f64>> {
        let (mu, sigma) = self.params.ok_or(CausalError::NotFitted)?;
        let normal = Normal::new(mu, sigma)
            .map_err(|e| CausalError::invalid(format!("Noise distribution error: {e}")))?;
        Ok((0..n).map(|_| normal.sample(rng)).collect())
    }
}

/// Which residual distribution an additive-noise model fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseKind {
    #[default]
    Empirical,
    Gaussian,
}

/// Residual distribution of an additive-noise model.
#[derive(Debug, Clone)]
pub enum NoiseModel {
    Empirical(EmpiricalDistribution),
    Gaussian(GaussianDistribution),
}

impl NoiseModel {
    pub fn new(kind: NoiseKind) -> Self {
        match kind {
            NoiseKind::Empirical => NoiseModel::Empirical(EmpiricalDistribution::new()),
            NoiseKind::Gaussian => NoiseModel::Gaussian(GaussianDistribution::new()),
        }
    }

    pub fn kind(&self) -> NoiseKind {
        match self {
            NoiseModel::Empirical(_) => NoiseKind::Empirical,
            NoiseModel::Gaussian(_) => NoiseKind::Gaussian,
        }
    }

    pub fn fit(&mut self, residuals: &[f64]) -> Result<()> {
        match self {
            NoiseModel::Empirical(d) => d.fit(residuals),
            NoiseModel::Gaussian(d) => d.fit(residuals),
        }
    }

    pub fn is_fitted(&self) -> bool {
        match self {
            NoiseModel::Empirical(d) => d.is_fitted(),
            NoiseModel::Gaussian(d) => d.is_fitted(),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Vec<f64>> {
        match self {
            NoiseModel::Empirical(d) => d.sample(n, rng),
            NoiseModel::Gaussian(d) => d.sample(n, rng),
        }
    }
}

impl Default for NoiseModel {
    fn default() -> Self {
        NoiseModel::new(NoiseKind::Empirical)
    }
}
