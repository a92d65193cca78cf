//! Polynomial helpers for transfer-function coefficients.
//!
//! Convention: coefficient vectors are ordered by **descending** powers of `z`,
//! so `[1.0, -0.9]` is `z - 0.9`. Two polynomials of different lengths are
//! therefore aligned at their *last* (constant) coefficient when added.

use nalgebra::{Complex, DMatrix};

use crate::error::{VrftError, VrftResult};

/// Drop leading zero coefficients.
///
/// An all-zero (or empty) input collapses to `[0.0]`, the zero polynomial.
pub fn trim_leading_zeros(coeffs: &[f64]) -> Vec<f64> {
    match coeffs.iter().position(|c| *c != 0.0) {
        Some(first) => coeffs[first..].to_vec(),
        None => vec![0.0],
    }
}

/// `true` when every coefficient is exactly zero.
pub fn is_zero(coeffs: &[f64]) -> bool {
    coeffs.iter().all(|c| *c == 0.0)
}

/// Polynomial product.
pub fn mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return vec![0.0];
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        for (j, &bj) in b.iter().enumerate() {
            out[i + j] += ai * bj;
        }
    }
    out
}

/// Polynomial sum (aligned at the constant term).
pub fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    let len = a.len().max(b.len());
    let mut out = vec![0.0; len];
    for (i, &ai) in a.iter().enumerate() {
        out[len - a.len() + i] += ai;
    }
    for (i, &bi) in b.iter().enumerate() {
        out[len - b.len() + i] += bi;
    }
    trim_leading_zeros(&out)
}

pub fn scale(a: &[f64], k: f64) -> Vec<f64> {
    a.iter().map(|c| c * k).collect()
}

/// Horner evaluation at a real point.
pub fn eval(a: &[f64], z: f64) -> f64 {
    a.iter().fold(0.0, |acc, c| acc * z + c)
}

/// Zero-pad at the high-order end so that `coeffs.len() == len`.
///
/// Used by the simulator, where `num / den` is realised with both polynomials
/// of the denominator's degree.
pub fn pad_front(coeffs: &[f64], len: usize) -> Vec<f64> {
    if coeffs.len() >= len {
        return coeffs.to_vec();
    }
    let mut out = vec![0.0; len - coeffs.len()];
    out.extend_from_slice(coeffs);
    out
}

/// Roots of a polynomial via the eigenvalues of its companion matrix.
///
/// Leading zeros are ignored. Constants have no roots.
pub fn roots(coeffs: &[f64]) -> Vec<Complex<f64>> {
    let p = trim_leading_zeros(coeffs);
    let degree = p.len() - 1;
    if degree == 0 {
        return Vec::new();
    }
    let lead = p[0];
    if degree == 1 {
        return vec![Complex::new(-p[1] / lead, 0.0)];
    }

    let mut companion = DMatrix::<f64>::zeros(degree, degree);
    for j in 0..degree {
        companion[(0, j)] = -p[j + 1] / lead;
    }
    for i in 1..degree {
        companion[(i, i - 1)] = 1.0;
    }
    companion.complex_eigenvalues().iter().copied().collect()
}

/// Monic polynomial with the given roots.
///
/// Complex roots are expected in conjugate pairs; the imaginary residue of the
/// expansion is discarded.
pub fn from_roots(roots: &[Complex<f64>]) -> Vec<f64> {
    let mut out = vec![Complex::new(1.0, 0.0)];
    for &root in roots {
        let mut next = vec![Complex::new(0.0, 0.0); out.len() + 1];
        for (i, &c) in out.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * root;
        }
        out = next;
    }
    out.iter().map(|c| c.re).collect()
}

/// Numerator and denominator prepared for swapping roles.
///
/// Invariant: `numerator.len() == denominator.len() == order + 1` and
/// `numerator[0] != 0`. The numerator is the original one (leading zeros
/// removed) multiplied by `z^delay`.
#[derive(Debug, Clone, PartialEq)]
pub struct InversionAlignment {
    pub numerator: Vec<f64>,
    pub denominator: Vec<f64>,
    /// Relative degree of the model: samples by which the reference leads the
    /// output. This is the number of initial conditions the inversion consumes.
    pub delay: usize,
}

impl InversionAlignment {
    /// Model order (`len(den) - 1`).
    pub fn order(&self) -> usize {
        self.denominator.len() - 1
    }

    /// The numerator without its `z^delay` padding.
    pub fn numerator_core(&self) -> &[f64] {
        &self.numerator[..self.numerator.len() - self.delay]
    }
}

/// Align `num` and `den` to the same degree so that `den / num` is proper.
///
/// Leading numerator zeros are pure delays: they are stripped first, so they
/// count towards `delay` instead of the raw input length.
pub fn align_for_inversion(num: &[f64], den: &[f64]) -> VrftResult<InversionAlignment> {
    if num.is_empty() || den.is_empty() {
        return Err(VrftError::validation(
            "numerator and denominator must both have at least one coefficient",
        ));
    }
    if num.iter().chain(den.iter()).any(|c| !c.is_finite()) {
        return Err(VrftError::validation("model coefficients must be finite"));
    }
    if den[0] == 0.0 {
        return Err(VrftError::validation(
            "leading denominator coefficient must be non-zero",
        ));
    }
    if den.len() < 2 {
        return Err(VrftError::validation(
            "model has order 0 (constant gain) and cannot be inverted",
        ));
    }
    if is_zero(num) {
        return Err(VrftError::validation("model numerator is identically zero"));
    }

    let core = trim_leading_zeros(num);
    if core.len() > den.len() {
        return Err(VrftError::validation(format!(
            "model is improper: numerator degree {} exceeds denominator degree {}",
            core.len() - 1,
            den.len() - 1
        )));
    }

    let delay = den.len() - core.len();
    let mut numerator = core;
    numerator.resize(den.len(), 0.0);

    Ok(InversionAlignment {
        numerator,
        denominator: den.to_vec(),
        delay,
    })
}

/// Format a polynomial in `z` for display, e.g. `z^2 - 1.6 z + 0.63`.
pub fn format_poly(coeffs: &[f64]) -> String {
    let p = trim_leading_zeros(coeffs);
    let degree = p.len() - 1;
    let mut out = String::new();

    for (i, &c) in p.iter().enumerate() {
        let power = degree - i;
        if c == 0.0 && p.len() > 1 {
            continue;
        }
        let magnitude = c.abs();
        let sign = if c < 0.0 { "-" } else { "+" };
        if out.is_empty() {
            if c < 0.0 {
                out.push('-');
            }
        } else {
            out.push_str(&format!(" {sign} "));
        }

        let coef = format!("{magnitude}");
        match power {
            0 => out.push_str(&coef),
            _ => {
                if magnitude != 1.0 {
                    out.push_str(&coef);
                    out.push(' ');
                }
                if power == 1 {
                    out.push('z');
                } else {
                    out.push_str(&format!("z^{power}"));
                }
            }
        }
    }

    if out.is_empty() {
        out.push('0');
    }
    out
}
