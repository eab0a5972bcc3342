//! Additive noise model: `Y = f(parents) + N`.
//!
//! `f` is any [`Regressor`]; `N` is fitted on the in-sample residuals. The
//! model is invertible with respect to its noise, which is what noise
//! reconstruction and counterfactuals rely on.

use nalgebra::{DMatrix, DVector};
use rand::Rng;

use crate::error::{CausalError, Result};
use crate::mechanisms::regressor::{LinearRegression, Regressor};
use crate::mechanisms::stochastic::{NoiseKind, NoiseModel};

#[derive(Debug, Clone)]
pub struct AdditiveNoiseModel {
    regressor: Box<dyn Regressor>,
    noise: NoiseModel,
}

/// In-sample statistics of a successful fit.
#[derive(Debug, Clone, Copy)]
pub struct AnmFitStats {
    pub n_obs: usize,
    pub rmse: f64,
}

impl AdditiveNoiseModel {
    pub fn new(regressor: Box<dyn Regressor>, noise: NoiseKind) -> Self {
        Self {
            regressor,
            noise: NoiseModel::new(noise),
        }
    }

    /// Linear regressor with empirical noise.
    pub fn linear() -> Self {
        Self::new(Box::new(LinearRegression::new()), NoiseKind::Empirical)
    }

    pub fn regressor(&self) -> &dyn Regressor {
        self.regressor.as_ref()
    }

    pub fn noise(&self) -> &NoiseModel {
        &self.noise
    }

    pub fn is_fitted(&self) -> bool {
        self.regressor.input_dim().is_some() && self.noise.is_fitted()
    }

    pub fn input_dim(&self) -> Option<usize> {
        self.regressor.input_dim()
    }

    /// Train `f` on `(parents, target)` and fit `N` on the residuals.
    pub fn fit(&mut self, parents: &DMatrix<f64>, target: &DVector<f64>) -> Result<AnmFitStats> {
        if target.iter().any(|v| !v.is_finite()) || parents.iter().any(|v| !v.is_finite()) {
            return Err(CausalError::fit("", "non-finite observation"));
        }
        self.regressor.fit(parents, target)?;
        let residuals = target - self.regressor.predict(parents)?;
        self.noise.fit(residuals.as_slice())?;

        let n = residuals.len();
        let rmse = if n == 0 {
            0.0
        } else {
            (residuals.norm_squared() / n as f64).sqrt()
        };
        Ok(AnmFitStats { n_obs: n, rmse })
    }

    /// Deterministic part `f(parents)`.
    pub fn predict(&self, parents: &DMatrix<f64>) -> Result<DVector<f64>> {
        self.regressor.predict(parents)
    }

    /// `f(parents) + noise`, row by row.
    pub fn evaluate(&self, parents: &DMatrix<f64>, noise: &[f64]) -> Result<DVector<f64>> {
        if noise.len() != parents.nrows() {
            return Err(CausalError::invalid(format!(
                "Noise has {} rows but parents have {}.",
                noise.len(),
                parents.nrows()
            )));
        }
        Ok(self.predict(parents)? + DVector::from_column_slice(noise))
    }

    /// Forward-simulate one value per parent row with fresh noise.
    pub fn draw_samples<R: Rng + ?Sized>(
        &self,
        parents: &DMatrix<f64>,
        rng: &mut R,
    ) -> Result<DVector<f64>> {
        let noise = self.noise.sample(parents.nrows(), rng)?;
        self.evaluate(parents, &noise)
    }

    /// Invert the model: `target - f(parents)`.
    pub fn estimate_noise(&self, target: &[f64], parents: &DMatrix<f64>) -> Result<DVector<f64>> {
        if target.len() != parents.nrows() {
            return Err(CausalError::invalid(format!(
                "Target has {} rows but parents have {}.",
                target.len(),
                parents.nrows()
            )));
        }
        Ok(DVector::from_column_slice(target) - self.predict(parents)?)
    }
}
