//! Transfer-function arithmetic.
//!
//! Binary operators on `&TransferFunction` return `VrftResult<TransferFunction>`
//! because operands must share a sampling period. Scalar scaling and negation
//! cannot fail and return the system directly.

use std::ops::{Add, Mul, Neg, Sub};

use crate::error::{VrftError, VrftResult};
use crate::system::poly;
use crate::system::transfer_function::{LinearSystem, TransferFunction, same_sampling_period};

fn check_ts(a: &TransferFunction, b: &TransferFunction, op: &str) -> VrftResult<f64> {
    if same_sampling_period(a.ts(), b.ts()) {
        Ok(a.ts())
    } else {
        Err(VrftError::validation(format!(
            "cannot {op} systems with sampling periods {} and {}",
            a.ts(),
            b.ts()
        )))
    }
}

fn checked_result(num: Vec<f64>, den: Vec<f64>, ts: f64, op: &str) -> VrftResult<TransferFunction> {
    let tf = TransferFunction::from_parts(num, den, ts);
    if poly::is_zero(tf.den()) {
        return Err(VrftError::validation(format!("{op}: resulting denominator is zero")));
    }
    if tf.num().len() > tf.den().len() {
        return Err(VrftError::validation(format!("{op}: resulting system is improper")));
    }
    Ok(tf)
}

impl TransferFunction {
    /// Parallel connection `self + other`.
    ///
    /// Operands with identical denominators are summed over that denominator.
    pub fn try_add(&self, other: &TransferFunction) -> VrftResult<TransferFunction> {
        let ts = check_ts(self, other, "add")?;
        if self.den() == other.den() {
            let num = poly::add(self.num(), other.num());
            return checked_result(num, self.den().to_vec(), ts, "add");
        }
        let num = poly::add(
            &poly::mul(self.num(), other.den()),
            &poly::mul(other.num(), self.den()),
        );
        checked_result(num, poly::mul(self.den(), other.den()), ts, "add")
    }

    /// `self - other`.
    pub fn try_sub(&self, other: &TransferFunction) -> VrftResult<TransferFunction> {
        self.try_add(&other.scaled(-1.0))
    }

    /// Series connection `self * other`.
    pub fn try_mul(&self, other: &TransferFunction) -> VrftResult<TransferFunction> {
        let ts = check_ts(self, other, "multiply")?;
        checked_result(
            poly::mul(self.num(), other.num()),
            poly::mul(self.den(), other.den()),
            ts,
            "multiply",
        )
    }

    /// Scalar multiple `k * self`.
    pub fn scaled(&self, k: f64) -> TransferFunction {
        TransferFunction::from_parts(poly::scale(self.num(), k), self.den().to_vec(), self.ts())
    }

    /// Negative feedback through `h`: `self / (1 + self * h)`.
    pub fn feedback_with(&self, h: &TransferFunction) -> VrftResult<TransferFunction> {
        let ts = check_ts(self, h, "close the loop around")?;
        let num = poly::mul(self.num(), h.den());
        let den = poly::add(
            &poly::mul(self.den(), h.den()),
            &poly::mul(self.num(), h.num()),
        );
        checked_result(num, den, ts, "feedback")
    }

    /// Negative unity feedback: `self / (1 + self)`.
    pub fn feedback(&self) -> VrftResult<TransferFunction> {
        let unity = TransferFunction::one(self.sampling_period())?;
        self.feedback_with(&unity)
    }
}

impl Add for &TransferFunction {
    type Output = VrftResult<TransferFunction>;

    fn add(self, rhs: &TransferFunction) -> Self::Output {
        self.try_add(rhs)
    }
}

impl Sub for &TransferFunction {
    type Output = VrftResult<TransferFunction>;

    fn sub(self, rhs: &TransferFunction) -> Self::Output {
        self.try_sub(rhs)
    }
}

impl Mul for &TransferFunction {
    type Output = VrftResult<TransferFunction>;

    fn mul(self, rhs: &TransferFunction) -> Self::Output {
        self.try_mul(rhs)
    }
}

impl Mul<f64> for &TransferFunction {
    type Output = TransferFunction;

    fn mul(self, k: f64) -> TransferFunction {
        self.scaled(k)
    }
}

impl Mul<&TransferFunction> for f64 {
    type Output = TransferFunction;

    fn mul(self, tf: &TransferFunction) -> TransferFunction {
        tf.scaled(self)
    }
}

impl Neg for &TransferFunction {
    type Output = TransferFunction;

    fn neg(self) -> TransferFunction {
        self.scaled(-1.0)
    }
}
