//! Reporting utilities: closed-loop assessment and formatted terminal output.

pub mod format;

pub use format::*;

use crate::error::{VrftError, VrftResult};
use crate::system::{TransferFunction, simulate};

/// How well the tuned loop reproduces the reference model.
///
/// Only available when the plant is known (the demo); a real experiment
/// has no plant model to close the loop with.
#[derive(Debug, Clone)]
pub struct LoopAssessment {
    pub closed_loop: TransferFunction,
    pub closed_loop_dc_gain: f64,
    pub model_dc_gain: f64,
    /// RMS gap between the closed-loop and reference-model step responses.
    pub step_rms_gap: f64,
    pub horizon: usize,
}

/// Close the loop `C G / (1 + C G)` and compare its step response with `M`.
pub fn assess_closed_loop(
    plant: &TransferFunction,
    controller: &TransferFunction,
    reference_model: &TransferFunction,
    horizon: usize,
) -> VrftResult<LoopAssessment> {
    if horizon == 0 {
        return Err(VrftError::validation("assessment horizon must be > 0"));
    }
    let closed_loop = controller.try_mul(plant)?.feedback()?;

    let step = vec![1.0; horizon];
    let achieved = simulate(&closed_loop, &step, None)?.output;
    let desired = simulate(reference_model, &step, None)?.output;

    let sse: f64 = achieved
        .iter()
        .zip(desired.iter())
        .map(|(a, d)| (a - d) * (a - d))
        .sum();

    Ok(LoopAssessment {
        closed_loop_dc_gain: closed_loop.dc_gain(),
        model_dc_gain: reference_model.dc_gain(),
        step_rms_gap: (sse / horizon as f64).sqrt(),
        horizon,
        closed_loop,
    })
}
