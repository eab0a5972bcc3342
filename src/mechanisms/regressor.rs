//! Regressor plugin interface used inside additive-noise models.
//!
//! A regressor is anything that can be trained on `(X, y)` and then map rows
//! of `X` to predicted means. Design matrices passed here do NOT contain an
//! intercept column; implementations add their own.

use std::fmt;

use nalgebra::{DMatrix, DVector};

use crate::error::{CausalError, Result};
use crate::math::{solve_least_squares, solve_ridge, with_intercept};

pub trait Regressor: fmt::Debug + Send + Sync {
    /// Short identifier for logs and fit summaries.
    fn name(&self) -> &'static str;

    /// Train on `x` (`n x p`) and targets `y` (`n`).
    ///
    /// Errors use [`CausalError::Fit`] with an empty node name; the fit engine
    /// fills in the node.
    fn fit(&mut self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<()>;

    fn predict(&self, x: &DMatrix<f64>) -> Result<DVector<f64>>;

    /// Number of input columns the fitted regressor expects.
    fn input_dim(&self) -> Option<usize>;

    fn clone_box(&self) -> Box<dyn Regressor>;
}

impl Clone for Box<dyn Regressor> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Intercept + slopes, shared by the linear regressors below.
#[derive(Debug, Clone, Default)]
struct LinearCoefficients {
    beta: Option<DVector<f64>>,
}

impl LinearCoefficients {
    fn predict(&self, x: &DMatrix<f64>) -> Result<DVector<f64>> {
        let beta = self.beta.as_ref().ok_or(CausalError::NotFitted)?;
        if x.ncols() + 1 != beta.len() {
            return Err(CausalError::invalid(format!(
                "Regressor expects {} inputs, got {}.",
                beta.len() - 1,
                x.ncols()
            )));
        }
        Ok(with_intercept(x) * beta)
    }

    fn input_dim(&self) -> Option<usize> {
        self.beta.as_ref().map(|b| b.len() - 1)
    }
}

fn check_shapes(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(CausalError::fit(
            "",
            format!("design has {} rows but target has {}", x.nrows(), y.len()),
        ));
    }
    Ok(())
}

/// Ordinary least squares with intercept.
#[derive(Debug, Clone, Default)]
pub struct LinearRegression {
    coef: LinearCoefficients,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intercept(&self) -> Option<f64> {
        self.coef.beta.as_ref().map(|b| b[0])
    }

    /// Slopes in input-column order.
    pub fn coefficients(&self) -> Option<Vec<f64>> {
        self.coef.beta.as_ref().map(|b| b.iter().skip(1).copied().collect())
    }
}

impl Regressor for LinearRegression {
    fn name(&self) -> &'static str {
        "linear_regression"
    }

    fn fit(&mut self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<()> {
        check_shapes(x, y)?;
        let beta = solve_least_squares(&with_intercept(x), y).ok_or_else(|| {
            CausalError::fit("", "least squares system is singular or ill-conditioned")
        })?;
        self.coef.beta = Some(beta);
        Ok(())
    }

    fn predict(&self, x: &DMatrix<f64>) -> Result<DVector<f64>> {
        self.coef.predict(x)
    }

    fn input_dim(&self) -> Option<usize> {
        self.coef.input_dim()
    }

    fn clone_box(&self) -> Box<dyn Regressor> {
        Box::new(self.clone())
    }
}

/// L2-penalized least squares with an unpenalized intercept.
#[derive(Debug, Clone)]
pub struct RidgeRegression {
    alpha: f64,
    coef: LinearCoefficients,
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            coef: LinearCoefficients::default(),
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn coefficients(&self) -> Option<Vec<f64>> {
        self.coef.beta.as_ref().map(|b| b.iter().skip(1).copied().collect())
    }
}

impl Regressor for RidgeRegression {
    fn name(&self) -> &'static str {
        "ridge_regression"
    }

    fn fit(&mut self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<()> {
        check_shapes(x, y)?;
        let beta = solve_ridge(&with_intercept(x), y, self.alpha).ok_or_else(|| {
            CausalError::fit("", format!("ridge system (alpha={}) could not be solved", self.alpha))
        })?;
        self.coef.beta = Some(beta);
        Ok(())
    }

    fn predict(&self, x: &DMatrix<f64>) -> Result<DVector<f64>> {
        self.coef.predict(x)
    }

    fn input_dim(&self) -> Option<usize> {
        self.coef.input_dim()
    }

    fn clone_box(&self) -> Box<dyn Regressor> {
        Box::new(self.clone())
    }
}
