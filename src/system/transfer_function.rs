//! Discrete-time SISO transfer functions.
//!
//! The estimation pipeline never depends on a concrete system type: anything
//! that exposes coefficients and a sampling period through [`LinearSystem`] is
//! accepted, and is checked with [`validate_system`] at each public entry point.

use serde::{Deserialize, Serialize};

use crate::error::{VrftError, VrftResult};
use crate::system::poly;

/// Relative tolerance used when comparing sampling periods.
pub const TS_REL_TOL: f64 = 1e-9;

/// Capability required of reference models, basis elements and filters.
pub trait LinearSystem {
    /// Numerator coefficients, highest power of `z` first.
    fn numerator(&self) -> &[f64];
    /// Denominator coefficients, highest power of `z` first.
    fn denominator(&self) -> &[f64];
    /// Sampling period in seconds.
    fn sampling_period(&self) -> f64;

    /// `len(den) - 1`.
    fn order(&self) -> usize {
        self.denominator().len().saturating_sub(1)
    }
}

impl<S: LinearSystem + ?Sized> LinearSystem for &S {
    fn numerator(&self) -> &[f64] {
        (**self).numerator()
    }

    fn denominator(&self) -> &[f64] {
        (**self).denominator()
    }

    fn sampling_period(&self) -> f64 {
        (**self).sampling_period()
    }
}

/// Check the structural invariants of a system.
///
/// `what` names the argument in error messages (e.g. `"reference model"`).
pub fn validate_system<S: LinearSystem + ?Sized>(system: &S, what: &str) -> VrftResult<()> {
    let num = system.numerator();
    let den = system.denominator();
    let ts = system.sampling_period();

    if num.is_empty() || den.is_empty() {
        return Err(VrftError::validation(format!(
            "{what}: numerator and denominator must be non-empty"
        )));
    }
    if num.iter().chain(den.iter()).any(|c| !c.is_finite()) {
        return Err(VrftError::validation(format!("{what}: coefficients must be finite")));
    }
    if den[0] == 0.0 {
        return Err(VrftError::validation(format!(
            "{what}: leading denominator coefficient must be non-zero"
        )));
    }
    if poly::trim_leading_zeros(num).len() > den.len() {
        return Err(VrftError::validation(format!(
            "{what}: system is improper (numerator degree exceeds denominator degree)"
        )));
    }
    if !(ts.is_finite() && ts > 0.0) {
        return Err(VrftError::validation(format!(
            "{what}: sampling period must be finite and > 0, got {ts}"
        )));
    }
    Ok(())
}

/// `true` when two sampling periods agree to [`TS_REL_TOL`].
pub fn same_sampling_period(a: f64, b: f64) -> bool {
    (a - b).abs() <= TS_REL_TOL * a.abs().max(b.abs())
}

/// Require `system` to be sampled at `ts`.
pub fn ensure_sampling_period<S: LinearSystem + ?Sized>(
    system: &S,
    ts: f64,
    what: &str,
) -> VrftResult<()> {
    if same_sampling_period(system.sampling_period(), ts) {
        Ok(())
    } else {
        Err(VrftError::validation(format!(
            "{what}: sampling period {} does not match experiment sampling period {ts}",
            system.sampling_period()
        )))
    }
}

/// A validated discrete-time transfer function `num(z) / den(z)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTransferFunction", into = "RawTransferFunction")]
pub struct TransferFunction {
    num: Vec<f64>,
    den: Vec<f64>,
    ts: f64,
}

/// Serialized form of [`TransferFunction`] (validated on load).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransferFunction {
    pub num: Vec<f64>,
    pub den: Vec<f64>,
    pub ts: f64,
}

impl TryFrom<RawTransferFunction> for TransferFunction {
    type Error = VrftError;

    fn try_from(raw: RawTransferFunction) -> Result<Self, Self::Error> {
        TransferFunction::new(raw.num, raw.den, raw.ts)
    }
}

impl From<TransferFunction> for RawTransferFunction {
    fn from(tf: TransferFunction) -> Self {
        RawTransferFunction {
            num: tf.num,
            den: tf.den,
            ts: tf.ts,
        }
    }
}

impl TransferFunction {
    /// Build and validate a transfer function.
    ///
    /// Leading zeros of the numerator are dropped; the denominator is kept as given.
    pub fn new(num: Vec<f64>, den: Vec<f64>, ts: f64) -> VrftResult<Self> {
        let raw = RawTransferFunction { num, den, ts };
        validate_system(&raw, "transfer function")?;
        Ok(Self {
            num: poly::trim_leading_zeros(&raw.num),
            den: raw.den,
            ts: raw.ts,
        })
    }

    /// Copy any [`LinearSystem`] into an owned transfer function.
    pub fn from_system<S: LinearSystem + ?Sized>(system: &S) -> VrftResult<Self> {
        Self::new(
            system.numerator().to_vec(),
            system.denominator().to_vec(),
            system.sampling_period(),
        )
    }

    /// Static gain `k`.
    pub fn gain(k: f64, ts: f64) -> VrftResult<Self> {
        Self::new(vec![k], vec![1.0], ts)
    }

    /// Unit gain.
    pub fn one(ts: f64) -> VrftResult<Self> {
        Self::gain(1.0, ts)
    }

    /// Pure delay `z^-k`.
    pub fn delay(k: usize, ts: f64) -> VrftResult<Self> {
        let mut den = vec![0.0; k + 1];
        den[0] = 1.0;
        Self::new(vec![1.0], den, ts)
    }

    pub fn num(&self) -> &[f64] {
        &self.num
    }

    pub fn den(&self) -> &[f64] {
        &self.den
    }

    pub fn ts(&self) -> f64 {
        self.ts
    }

    /// Relative degree `deg(den) - deg(num)`.
    pub fn relative_degree(&self) -> usize {
        self.den.len() - self.num.len()
    }

    /// Gain at `z = 1`. Infinite for systems with a pole at `z = 1`.
    pub fn dc_gain(&self) -> f64 {
        let n = poly::eval(&self.num, 1.0);
        let d = poly::eval(&self.den, 1.0);
        if d == 0.0 {
            if n == 0.0 { f64::NAN } else { f64::INFINITY.copysign(n) }
        } else {
            n / d
        }
    }

    /// Crate-internal constructor for results of arithmetic on validated operands.
    pub(crate) fn from_parts(num: Vec<f64>, den: Vec<f64>, ts: f64) -> Self {
        Self {
            num: poly::trim_leading_zeros(&num),
            den: poly::trim_leading_zeros(&den),
            ts,
        }
    }
}

impl LinearSystem for TransferFunction {
    fn numerator(&self) -> &[f64] {
        &self.num
    }

    fn denominator(&self) -> &[f64] {
        &self.den
    }

    fn sampling_period(&self) -> f64 {
        self.ts
    }
}

impl LinearSystem for RawTransferFunction {
    fn numerator(&self) -> &[f64] {
        &self.num
    }

    fn denominator(&self) -> &[f64] {
        &self.den
    }

    fn sampling_period(&self) -> f64 {
        self.ts
    }
}

impl std::fmt::Display for TransferFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}) / ({})  [dt = {}]",
            poly::format_poly(&self.num),
            poly::format_poly(&self.den),
            self.ts
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_validates_and_trims() {
        let tf = TransferFunction::new(vec![0.0, 0.5], vec![1.0, -0.9], 0.01).unwrap();
        assert_eq!(tf.num(), &[0.5]);
        assert_eq!(tf.order(), 1);
        assert_eq!(tf.relative_degree(), 1);

        assert!(TransferFunction::new(vec![1.0], vec![0.0, 1.0], 0.01).is_err());
        assert!(TransferFunction::new(vec![1.0, 0.0, 0.0], vec![1.0, 1.0], 0.01).is_err());
        assert!(TransferFunction::new(vec![1.0], vec![1.0], 0.0).is_err());
        assert!(TransferFunction::new(vec![], vec![1.0], 0.1).is_err());
    }

    #[test]
    fn dc_gain_of_first_order_lag() {
        let tf = TransferFunction::new(vec![0.6], vec![1.0, -0.4], 0.01).unwrap();
        assert!((tf.dc_gain() - 1.0).abs() < 1e-12);

        let integrator = TransferFunction::new(vec![1.0], vec![1.0, -1.0], 0.01).unwrap();
        assert!(integrator.dc_gain().is_infinite());
    }

    #[test]
    fn serde_rejects_invalid_systems() {
        let ok: TransferFunction =
            serde_json::from_str(r#"{"num":[0.6],"den":[1,-0.4],"ts":0.01}"#).unwrap();
        assert_eq!(ok.den(), &[1.0, -0.4]);
        let bad = serde_json::from_str::<TransferFunction>(r#"{"num":[1],"den":[0,1],"ts":0.01}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn display_shows_both_polynomials() {
        let tf = TransferFunction::new(vec![0.6], vec![1.0, -0.4], 0.01).unwrap();
        assert_eq!(tf.to_string(), "(0.6) / (z - 0.4)  [dt = 0.01]");
    }

    #[test]
    fn delay_helper_builds_pure_delay() {
        let d = TransferFunction::delay(2, 1.0).unwrap();
        assert_eq!(d.den(), &[1.0, 0.0, 0.0]);
        assert_eq!(d.relative_degree(), 2);
    }
}
