//! Least squares solvers.
//!
//! Every regression in this crate reduces to a small linear problem:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2            (OLS)
//! minimize Σ (y_i - x_i^T β)^2 + λ‖β‖²    (ridge, intercept unpenalized)
//! ```
//!
//! Implementation choices:
//! - One SVD serves both the rank check and the solve, for any tall design
//!   (rows = observations, columns = parents plus intercept).
//! - Rank deficiency is reported instead of silently returning a
//!   pseudo-inverse solution: a collinear design means the mechanism cannot be
//!   identified from the data and the caller must surface a fit error.
//! - Ridge is solved as OLS on an augmented system with `sqrt(λ)` rows, the
//!   same synthetic-row trick used for soft priors.

use nalgebra::{DMatrix, DVector};

/// Relative singular-value cutoff used for the rank check.
const RANK_RTOL: f64 = 1e-10;

/// Coefficients plus the normal-theory inference quantities of an OLS fit.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub coefficients: DVector<f64>,
    /// Standard error per coefficient, `None` when `n <= p`.
    pub std_errors: Option<DVector<f64>>,
    pub residual_variance: f64,
    pub sse: f64,
    pub n_obs: usize,
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is underdetermined, rank deficient, or the
/// solution is not finite.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() != y.len() || x.ncols() == 0 || x.nrows() < x.ncols() {
        return None;
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return None;
    }

    let svd = x.clone().svd(true, true);
    let smax = svd.singular_values.max();
    if !(smax.is_finite() && smax > 0.0) {
        return None;
    }
    let cutoff = smax * RANK_RTOL * x.nrows().max(x.ncols()) as f64;
    if svd.rank(cutoff) < x.ncols() {
        return None;
    }

    // Full rank here, so no singular value falls below the cutoff.
    let beta = svd.solve(y, cutoff).ok()?;
    beta.iter().all(|v| v.is_finite()).then_some(beta)
}

/// Prepend a column of ones to `x`.
pub fn with_intercept(x: &DMatrix<f64>) -> DMatrix<f64> {
    x.clone().insert_column(0, 1.0)
}

/// Ordinary least squares with coefficient standard errors.
///
/// `x` is used as-is; callers add the intercept column with [`with_intercept`].
pub fn fit_ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<OlsFit> {
    let coefficients = solve_least_squares(x, y)?;
    let residuals = y - x * &coefficients;
    let sse = residuals.norm_squared();
    let n = x.nrows();
    let p = x.ncols();

    let (residual_variance, std_errors) = if n > p {
        let sigma2 = sse / (n - p) as f64;
        let xtx = x.transpose() * x;
        let se = xtx
            .try_inverse()
            .map(|inv| DVector::from_fn(p, |j, _| (sigma2 * inv[(j, j)]).max(0.0).sqrt()));
        (sigma2, se)
    } else {
        (0.0, None)
    };

    Some(OlsFit {
        coefficients,
        std_errors,
        residual_variance,
        sse,
        n_obs: n,
    })
}

/// Ridge regression; column 0 of `x` is treated as the unpenalized intercept.
pub fn solve_ridge(x: &DMatrix<f64>, y: &DVector<f64>, alpha: f64) -> Option<DVector<f64>> {
    if !(alpha.is_finite() && alpha >= 0.0) {
        return None;
    }
    let n = x.nrows();
    let p = x.ncols();
    let penalized = p.saturating_sub(1);

    let mut xa = DMatrix::<f64>::zeros(n + penalized, p);
    let mut ya = DVector::<f64>::zeros(n + penalized);
    xa.rows_mut(0, n).copy_from(x);
    ya.rows_mut(0, n).copy_from(y);

    let s = alpha.sqrt();
    for j in 0..penalized {
        xa[(n + j, j + 1)] = s;
    }

    solve_least_squares(&xa, &ya)
}
