//! The VRFT pipeline.
//!
//! ```text
//! validate -> virtual reference r -> e = r - y -> (L e, L u) -> Φ -> θ -> C
//! ```
//!
//! Every stage either succeeds or aborts the call with its own error.

use nalgebra::DMatrix;

use crate::domain::{ExperimentData, VrftOptions};
use crate::error::{VrftError, VrftResult};
use crate::math::estimate;
use crate::system::{
    LinearSystem, TransferFunction, ensure_sampling_period, simulate, validate_system,
};
use crate::vrft::controller::synthesize;
use crate::vrft::reference::virtual_reference;
use crate::vrft::regressor::build_regressor;

/// All artifacts of one VRFT run.
#[derive(Debug, Clone)]
pub struct VrftOutput {
    pub theta: Vec<f64>,
    pub virtual_reference: Vec<f64>,
    /// `(k, N - delay)`, one row per basis element.
    pub regressor: DMatrix<f64>,
    pub filtered_error: Vec<f64>,
    pub filtered_input: Vec<f64>,
    pub controller: TransferFunction,
    pub condition_number: f64,
    pub residual_rms: f64,
    /// Samples dropped from the end of the record by the inversion.
    pub delay: usize,
}

/// Tune a controller from one experiment.
///
/// `design_filter` (`L`) is applied to both the tracking error and the
/// recorded input before the regression.
pub fn compute_vrft<M, B>(
    data: &ExperimentData,
    reference_model: &M,
    basis: &[B],
    design_filter: Option<&dyn LinearSystem>,
    opts: &VrftOptions,
) -> VrftResult<VrftOutput>
where
    M: LinearSystem + ?Sized,
    B: LinearSystem + Sync,
{
    // 1) Validate every system before doing any work.
    let ts = data.ts();
    validate_system(reference_model, "reference model")?;
    ensure_sampling_period(reference_model, ts, "reference model")?;
    if basis.is_empty() {
        return Err(VrftError::validation("basis set is empty"));
    }
    for (i, element) in basis.iter().enumerate() {
        let what = format!("basis element {i}");
        validate_system(element, &what)?;
        ensure_sampling_period(element, ts, &what)?;
    }
    if let Some(filter) = design_filter {
        validate_system(filter, "design filter")?;
        ensure_sampling_period(filter, ts, "design filter")?;
    }

    // 2) Virtual reference.
    let reference = virtual_reference(data, reference_model)?;
    let n = reference.signal.len();
    tracing::debug!(samples = n, delay = reference.delay, "virtual reference reconstructed");
    if reference.anticausal_zeros > 0 {
        tracing::warn!(
            zeros = reference.anticausal_zeros,
            "reference model is non-minimum-phase; \
             the last samples of the virtual reference are approximate"
        );
    }

    // 3) Tracking error, aligned with the reference.
    let error: Vec<f64> = reference
        .signal
        .iter()
        .zip(data.y()[..n].iter())
        .map(|(r, y)| r - y)
        .collect();
    let input = &data.u()[..n];

    // 4) Optional pre-filter on both signals.
    let (filtered_error, filtered_input) = match design_filter {
        Some(filter) => (apply_filter(filter, &error)?, apply_filter(filter, input)?),
        None => (error, input.to_vec()),
    };

    // 5) Regressor.
    let regressor = build_regressor(basis, &filtered_error, ts, opts)?;

    // 6) Least squares.
    let est = estimate(&regressor, &filtered_input, opts)?;

    // 7) Controller.
    let controller = synthesize(&est.theta, basis)?;

    tracing::info!(
        theta = ?est.theta,
        condition_number = est.condition_number,
        residual_rms = est.residual_rms,
        "VRFT estimate"
    );

    Ok(VrftOutput {
        theta: est.theta,
        virtual_reference: reference.signal,
        regressor,
        filtered_error,
        filtered_input,
        controller,
        condition_number: est.condition_number,
        residual_rms: est.residual_rms,
        delay: reference.delay,
    })
}

/// [`compute_vrft`] with [`VrftOptions::default`].
pub fn compute_vrft_default<M, B>(
    data: &ExperimentData,
    reference_model: &M,
    basis: &[B],
    design_filter: Option<&dyn LinearSystem>,
) -> VrftResult<VrftOutput>
where
    M: LinearSystem + ?Sized,
    B: LinearSystem + Sync,
{
    compute_vrft(data, reference_model, basis, design_filter, &VrftOptions::default())
}

fn apply_filter(filter: &dyn LinearSystem, signal: &[f64]) -> VrftResult<Vec<f64>> {
    let out = simulate(filter, signal, None)?.output;
    if out.len() != signal.len() {
        return Err(VrftError::internal(format!(
            "design filter returned {} samples for {} inputs",
            out.len(),
            signal.len()
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tf(num: &[f64], den: &[f64], ts: f64) -> TransferFunction {
        TransferFunction::new(num.to_vec(), den.to_vec(), ts).unwrap()
    }

    fn square_wave(n: usize) -> Vec<f64> {
        (0..n).map(|k| if (k / 50) % 2 == 0 { 1.0 } else { -0.5 }).collect()
    }

    #[test]
    fn recovers_the_ideal_pi_controller() {
        // Plant G = 0.5 / (z - 0.9), model M = 0.6 / (z - 0.4).
        // C* = M / (G (1 - M)) = 1.2 (z - 0.9) / (z - 1): a PI in the span of
        // {1/(z-1), z/(z-1)} with θ = [-1.08, 1.2].
        let ts = 0.01;
        let plant = tf(&[0.5], &[1.0, -0.9], ts);
        let model = tf(&[0.6], &[1.0, -0.4], ts);
        let basis = vec![tf(&[1.0], &[1.0, -1.0], ts), tf(&[1.0, 0.0], &[1.0, -1.0], ts)];

        let u = square_wave(1000);
        let y = simulate(&plant, &u, None).unwrap().output;
        let data = ExperimentData::new(y, u, ts, vec![0.0]).unwrap();

        let out = compute_vrft(&data, &model, &basis, None, &VrftOptions::default()).unwrap();
        assert!((out.theta[0] + 1.08).abs() < 1e-6, "{:?}", out.theta);
        assert!((out.theta[1] - 1.2).abs() < 1e-6, "{:?}", out.theta);
        assert_eq!(out.regressor.shape(), (2, 999));
        assert_eq!(out.virtual_reference.len(), 999);
        assert_eq!(out.controller.den(), &[1.0, -1.0]);

        // With the ideal controller the closed loop reproduces M.
        let loop_tf = (&out.controller * &plant).unwrap().feedback().unwrap();
        assert!((loop_tf.dc_gain() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn design_filter_keeps_exact_recovery() {
        let ts = 0.01;
        let plant = tf(&[0.5], &[1.0, -0.9], ts);
        let model = tf(&[0.6], &[1.0, -0.4], ts);
        let one = TransferFunction::one(ts).unwrap();
        let l = (&model * &(&one - &model).unwrap()).unwrap();
        let basis = vec![tf(&[1.0], &[1.0, -1.0], ts), tf(&[1.0, 0.0], &[1.0, -1.0], ts)];

        let u = square_wave(800);
        let y = simulate(&plant, &u, None).unwrap().output;
        let data = ExperimentData::new(y, u, ts, vec![0.0]).unwrap();

        let out = compute_vrft(&data, &model, &basis, Some(&l), &VrftOptions::default()).unwrap();
        assert!((out.theta[0] + 1.08).abs() < 1e-6, "{:?}", out.theta);
        assert!((out.theta[1] - 1.2).abs() < 1e-6, "{:?}", out.theta);
        assert_eq!(out.filtered_error.len(), 799);
        assert_eq!(out.filtered_input.len(), 799);
    }

    #[test]
    fn default_options_variant_matches_explicit_defaults() {
        let ts = 0.01;
        let plant = tf(&[0.5], &[1.0, -0.9], ts);
        let model = tf(&[0.6], &[1.0, -0.4], ts);
        let basis = vec![tf(&[1.0], &[1.0, -1.0], ts), tf(&[1.0, 0.0], &[1.0, -1.0], ts)];

        let u = square_wave(400);
        let y = simulate(&plant, &u, None).unwrap().output;
        let data = ExperimentData::new(y, u, ts, vec![0.0]).unwrap();

        let explicit = compute_vrft(&data, &model, &basis, None, &VrftOptions::default()).unwrap();
        let default = compute_vrft_default(&data, &model, &basis, None).unwrap();
        assert_eq!(default.theta, explicit.theta);
        assert_eq!(default.controller, explicit.controller);
        assert!((default.theta[1] - 1.2).abs() < 1e-6, "{:?}", default.theta);

        let empty: Vec<TransferFunction> = Vec::new();
        let err = compute_vrft_default(&data, &model, &empty, None).unwrap_err();
        assert!(matches!(err, VrftError::Validation(_)));
    }

    #[test]
    fn validation_happens_before_any_work() {
        let ts = 0.01;
        let data = ExperimentData::new(vec![0.0; 20], vec![1.0; 20], ts, vec![0.0]).unwrap();
        let model = tf(&[0.6], &[1.0, -0.4], ts);
        let basis = vec![tf(&[1.0], &[1.0, -1.0], ts)];

        let empty: Vec<TransferFunction> = Vec::new();
        let err = compute_vrft(&data, &model, &empty, None, &VrftOptions::default()).unwrap_err();
        assert!(matches!(err, VrftError::Validation(_)));

        let other_ts = tf(&[1.0], &[1.0, -0.5], 0.02);
        let err = compute_vrft(&data, &model, &basis, Some(&other_ts), &VrftOptions::default())
            .unwrap_err();
        assert!(matches!(err, VrftError::Validation(_)));

        let constant = tf(&[2.0], &[3.0], ts);
        let err =
            compute_vrft(&data, &constant, &basis, None, &VrftOptions::default()).unwrap_err();
        assert!(matches!(err, VrftError::Validation(_)));
    }

    #[test]
    fn dependent_basis_propagates_numerical_error() {
        let ts = 0.01;
        let plant = tf(&[0.5], &[1.0, -0.9], ts);
        let model = tf(&[0.6], &[1.0, -0.4], ts);
        let basis = vec![tf(&[1.0], &[1.0, -1.0], ts), tf(&[2.0], &[2.0, -2.0], ts)];

        let u = square_wave(300);
        let y = simulate(&plant, &u, None).unwrap().output;
        let data = ExperimentData::new(y, u, ts, vec![0.0]).unwrap();

        let err = compute_vrft(&data, &model, &basis, None, &VrftOptions::default()).unwrap_err();
        assert!(matches!(err, VrftError::Numerical(_)), "{err:?}");
    }
}
