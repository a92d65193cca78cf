//! Virtual reference reconstruction.
//!
//! If the measured output satisfies `y = M r` with `M = num / den`, then the
//! reference that produced it is `r = (den / num) y`. After degree alignment
//! (`poly::align_for_inversion`) the swapped system `den / (z^d num)` is proper,
//! and in the time domain the inversion is
//!
//! ```text
//! b0 r[t] = Σ_i a_i y[t + d − i] − Σ_{j≥1} b_j r[t − j],   t = 0 … N − d − 1
//! ```
//!
//! so the reference has `N − d` samples. Output samples before the record come
//! from the experiment's initial conditions; references before the record are
//! zero.
//!
//! Numerator zeros inside the unit circle are inverted causally (the recursion
//! above). Zeros on or outside it would make that recursion diverge, so they
//! are split off and inverted anti-causally, running backwards from the end of
//! the record with zero terminal state. In that case the last few samples
//! (decaying like `|zero|^-(N - d - t)`) carry the truncation error; the rest
//! of the record is exact.

use nalgebra::Complex;

use crate::domain::ExperimentData;
use crate::error::{VrftError, VrftResult};
use crate::system::poly::{self, InversionAlignment};
use crate::system::{LinearSystem, validate_system};

/// Zeros with modulus at or below this bound are inverted causally.
const CAUSAL_ZERO_BOUND: f64 = 1.0 + 1e-9;

/// Output of [`compute_virtual_reference`].
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualReference {
    /// Reconstructed reference, `N - delay` samples.
    pub signal: Vec<f64>,
    /// The last `delay` output samples of the record, most recent first.
    ///
    /// Same layout as `ExperimentData::initial_conditions`, so it can seed the
    /// inversion of a record that directly follows this one.
    pub final_state: Vec<f64>,
    /// Relative degree of the reference model.
    pub delay: usize,
    /// Number of numerator zeros inverted anti-causally.
    pub anticausal_zeros: usize,
}

/// Reconstruct the virtual reference for `data` through the model `num / den`.
pub fn compute_virtual_reference(
    data: &ExperimentData,
    numerator: &[f64],
    denominator: &[f64],
) -> VrftResult<VirtualReference> {
    let aligned = poly::align_for_inversion(numerator, denominator)?;
    invert(data, &aligned)
}

/// [`compute_virtual_reference`] for any [`LinearSystem`].
///
/// The model's sampling period must match the experiment's.
pub fn virtual_reference<S: LinearSystem + ?Sized>(
    data: &ExperimentData,
    model: &S,
) -> VrftResult<VirtualReference> {
    validate_system(model, "reference model")?;
    crate::system::ensure_sampling_period(model, data.ts(), "reference model")?;
    compute_virtual_reference(data, model.numerator(), model.denominator())
}

fn invert(data: &ExperimentData, aligned: &InversionAlignment) -> VrftResult<VirtualReference> {
    let d = aligned.delay;
    let y = data.y();
    let ic = data.initial_conditions();

    if ic.len() != d {
        return Err(VrftError::validation(format!(
            "initial conditions have length {}, the reference model needs {d} (relative degree)",
            ic.len()
        )));
    }
    if y.len() <= d {
        return Err(VrftError::validation(format!(
            "record of {} samples is too short for a model with relative degree {d}",
            y.len()
        )));
    }

    let len = y.len() - d;
    let den = &aligned.denominator;
    let core = aligned.numerator_core();
    let b0 = core[0];

    // Output sample at (possibly negative) time `k`.
    let past = |k: isize| -> f64 {
        if k >= 0 {
            y[k as usize]
        } else {
            ic.get((-k - 1) as usize).copied().unwrap_or(0.0)
        }
    };

    // den(q) applied to the output, shifted by the delay, scaled by 1/b0.
    let mut v = Vec::with_capacity(len);
    for t in 0..len {
        let mut acc = 0.0;
        for (i, &a) in den.iter().enumerate() {
            acc += a * past(t as isize + d as isize - i as isize);
        }
        v.push(acc / b0);
    }

    let zeros = poly::roots(core);
    let (inside, outside): (Vec<Complex<f64>>, Vec<Complex<f64>>) =
        zeros.into_iter().partition(|z| z.norm() <= CAUSAL_ZERO_BOUND);

    let signal = if outside.is_empty() {
        let monic: Vec<f64> = core.iter().map(|c| c / b0).collect();
        causal_inverse(&v, &monic)
    } else {
        tracing::debug!(
            anticausal = outside.len(),
            "reference model has zeros outside the unit circle; inverting them backwards in time"
        );
        let w = anticausal_inverse(&v, &poly::from_roots(&outside));
        causal_inverse(&w, &poly::from_roots(&inside))
    };

    let final_state: Vec<f64> = y.iter().rev().take(d).copied().collect();

    Ok(VirtualReference {
        signal,
        final_state,
        delay: d,
        anticausal_zeros: outside.len(),
    })
}

/// Solve `Σ_j c_j r[t − j] = x[t]` forwards with `c_0 = 1` and rest before `t = 0`.
fn causal_inverse(x: &[f64], monic: &[f64]) -> Vec<f64> {
    let mut r = Vec::with_capacity(x.len());
    for t in 0..x.len() {
        let mut acc = x[t];
        for (j, &c) in monic.iter().enumerate().skip(1) {
            if t >= j {
                acc -= c * r[t - j];
            }
        }
        r.push(acc);
    }
    r
}

/// Solve `Σ_j c_j w[t − j] = x[t]` backwards, with `w` and `x` zero past the end.
///
/// Stable when every root of `c` lies outside the unit circle.
fn anticausal_inverse(x: &[f64], monic: &[f64]) -> Vec<f64> {
    let len = x.len();
    let m = monic.len() - 1;
    let last = monic[m];
    let mut w = vec![0.0; len];
    for idx in (0..len).rev() {
        let t = idx + m;
        let mut acc = if t < len { x[t] } else { 0.0 };
        for (j, &c) in monic.iter().enumerate().take(m) {
            let k = t - j;
            if k < len {
                acc -= c * w[k];
            }
        }
        w[idx] = acc / last;
    }
    w
}
