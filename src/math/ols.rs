//! Least-squares estimator.
//!
//! VRFT reduces controller tuning to a linear regression:
//!
//! ```text
//! minimize ‖Φᵀ θ − u‖²
//! ```
//!
//! where `Φ` is the `(k, N)` regressor (one row per basis element) and `u` the
//! (filtered) recorded input.
//!
//! Implementation choices:
//! - We solve with an SVD of the `N × k` design matrix `Φᵀ`. Forming `ΦΦᵀ` and
//!   inverting it would square the condition number.
//! - Ill-conditioning is reported, never regularised: when the condition
//!   number of `ΦΦᵀ`, `(σ_max / σ_min)²` in terms of the singular values of
//!   `Φᵀ`, exceeds the configured ceiling the basis functions are (numerically)
//!   linearly dependent over the observed excitation, and the caller has to
//!   change the basis or the experiment.

use nalgebra::{DMatrix, DVector};

use crate::domain::VrftOptions;
use crate::error::{VrftError, VrftResult};

/// Accepted estimates above this share of the ceiling are logged as warnings.
const CONDITION_WARN_FRACTION: f64 = 1e-2;

/// Solution of the regression plus diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    pub theta: Vec<f64>,
    /// Condition number of `ΦΦᵀ`, the square of `σ_max / σ_min` of `Φᵀ`.
    pub condition_number: f64,
    /// Root-mean-square of `Φᵀ θ − u`.
    pub residual_rms: f64,
}

/// Solve `min ‖x β − y‖²` using SVD.
///
/// Returns the solution and the condition number of `xᵀx`.
pub fn solve_least_squares(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    max_condition_number: f64,
) -> VrftResult<(DVector<f64>, f64)> {
    let (n, p) = x.shape();
    if n == 0 || p == 0 {
        return Err(VrftError::validation("design matrix is empty"));
    }
    if y.len() != n {
        return Err(VrftError::validation(format!(
            "design matrix has {n} rows but target has {} samples",
            y.len()
        )));
    }
    if n < p {
        return Err(VrftError::numerical(format!(
            "{n} samples cannot identify {p} parameters"
        )));
    }

    let svd = x.clone().svd(true, true);
    let s_max = svd.singular_values.max();
    let s_min = svd.singular_values.min();
    if !(s_min > 0.0) {
        return Err(VrftError::numerical(
            "regressor is singular: basis responses are linearly dependent",
        ));
    }
    // Condition number of the cross-product ΦΦᵀ = XᵀX, read off the SVD of X
    // without forming the product.
    let ratio = s_max / s_min;
    let condition_number = ratio * ratio;
    if !condition_number.is_finite() || condition_number > max_condition_number {
        return Err(VrftError::numerical(format!(
            "regressor is ill-conditioned: cross-product condition number \
             {condition_number:.3e} exceeds {max_condition_number:.3e}"
        )));
    }

    let beta = svd
        .solve(y, 0.0)
        .map_err(|e| VrftError::numerical(format!("SVD solve failed: {e}")))?;
    if beta.iter().any(|v| !v.is_finite()) {
        return Err(VrftError::numerical("least-squares solution is not finite"));
    }
    Ok((beta, condition_number))
}

/// Estimate controller parameters from the `(k, N)` regressor and the target input.
pub fn estimate(
    regressor: &DMatrix<f64>,
    target: &[f64],
    opts: &VrftOptions,
) -> VrftResult<Estimate> {
    if !(opts.max_condition_number.is_finite() && opts.max_condition_number >= 1.0) {
        return Err(VrftError::validation(format!(
            "max condition number must be finite and >= 1, got {}",
            opts.max_condition_number
        )));
    }
    if regressor.ncols() != target.len() {
        return Err(VrftError::validation(format!(
            "regressor has {} samples but target has {}",
            regressor.ncols(),
            target.len()
        )));
    }

    let x = regressor.transpose();
    let y = DVector::from_column_slice(target);
    let (theta, condition_number) = solve_least_squares(&x, &y, opts.max_condition_number)?;

    let residual = &x * &theta - &y;
    let residual_rms = (residual.norm_squared() / y.len() as f64).sqrt();

    if condition_number > opts.max_condition_number * CONDITION_WARN_FRACTION {
        tracing::warn!(
            condition_number,
            ceiling = opts.max_condition_number,
            "regression is close to the conditioning ceiling"
        );
    }
    tracing::debug!(
        params = theta.len(),
        samples = y.len(),
        condition_number,
        residual_rms,
        "least-squares estimate"
    );

    Ok(Estimate {
        theta: theta.iter().copied().collect(),
        condition_number,
        residual_rms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let (beta, cond) = solve_least_squares(&x, &y, 1e10).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
        assert!(cond >= 1.0);
    }

    #[test]
    fn estimate_recovers_in_span_coefficients() {
        let n = 200;
        let e1: Vec<f64> = (0..n).map(|k| (k as f64 * 0.07).sin()).collect();
        let e2: Vec<f64> = (0..n)
            .map(|k| (k as f64 * 0.013).cos() + 0.1 * k as f64 / n as f64)
            .collect();
        let mut rows = Vec::with_capacity(2 * n);
        rows.extend_from_slice(&e1);
        rows.extend_from_slice(&e2);
        let phi = DMatrix::from_row_slice(2, n, &rows);

        let c = [1.7, -0.35];
        let u: Vec<f64> = (0..n).map(|k| c[0] * e1[k] + c[1] * e2[k]).collect();

        let est = estimate(&phi, &u, &VrftOptions::default()).unwrap();
        assert!((est.theta[0] - c[0]).abs() < 1e-6);
        assert!((est.theta[1] - c[1]).abs() < 1e-6);
        assert!(est.residual_rms < 1e-9);
    }

    #[test]
    fn identical_rows_are_reported_as_numerical_error() {
        let n = 50;
        let e: Vec<f64> = (0..n).map(|k| (k as f64 * 0.2).sin() + 0.5).collect();
        let mut rows = e.clone();
        rows.extend_from_slice(&e);
        let phi = DMatrix::from_row_slice(2, n, &rows);
        let u = e.clone();

        let err = estimate(&phi, &u, &VrftOptions::default()).unwrap_err();
        assert!(matches!(err, VrftError::Numerical(_)), "{err:?}");
    }

    #[test]
    fn condition_ceiling_is_configurable() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 0.0, 1e-3, 0.0, 0.0]);
        let phi = x.transpose();
        let u = [1.0, 1.0, 0.0];

        let strict = VrftOptions {
            max_condition_number: 10.0,
            ..VrftOptions::default()
        };
        assert!(matches!(estimate(&phi, &u, &strict), Err(VrftError::Numerical(_))));

        let est = estimate(&phi, &u, &VrftOptions::default()).unwrap();
        assert!((est.condition_number - 1e6).abs() < 1e-3);
        assert!((est.theta[1] - 1e3).abs() < 1e-6);
    }

    #[test]
    fn ceiling_applies_to_the_cross_product() {
        // σ_max / σ_min = 1e3, so ΦΦᵀ has condition number 1e6.
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 0.0, 1e-3, 0.0, 0.0]);
        let phi = x.transpose();
        let u = [1.0, 1.0, 0.0];

        let between = VrftOptions {
            max_condition_number: 1e4,
            ..VrftOptions::default()
        };
        assert!(matches!(estimate(&phi, &u, &between), Err(VrftError::Numerical(_))));

        let loose = VrftOptions {
            max_condition_number: 1e7,
            ..VrftOptions::default()
        };
        let est = estimate(&phi, &u, &loose).unwrap();
        assert!((est.condition_number - 1e6).abs() < 1e-3);

        let (_, cond) = solve_least_squares(&x, &DVector::from_row_slice(&u), 1e7).unwrap();
        assert_eq!(cond, est.condition_number);
    }

    #[test]
    fn length_mismatch_is_a_validation_error() {
        let phi = DMatrix::from_row_slice(1, 3, &[1.0, 2.0, 3.0]);
        let err = estimate(&phi, &[1.0, 2.0], &VrftOptions::default()).unwrap_err();
        assert!(matches!(err, VrftError::Validation(_)));
    }

    #[test]
    fn too_few_samples_is_a_numerical_error() {
        let phi = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let err = estimate(&phi, &[1.0, 2.0], &VrftOptions::default()).unwrap_err();
        assert!(matches!(err, VrftError::Numerical(_)));
    }
}
