//! Discrete-time simulation of a transfer function.
//!
//! Semantics follow the usual `lfilter`/`dlsim` convention: the numerator is
//! padded at its high-order end to the denominator's degree, both are
//! normalised by the leading denominator coefficient, and the recursion runs
//! in direct form II transposed:
//!
//! ```text
//! y[k]     = b0 x[k] + s0[k]
//! s_i[k+1] = b_{i+1} x[k] + s_{i+1}[k] - a_{i+1} y[k]
//! ```
//!
//! The state vector has one entry per pole (`order`); a zero state is "at rest".

use crate::error::{VrftError, VrftResult};
use crate::system::poly;
use crate::system::transfer_function::LinearSystem;

/// Output of [`simulate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub output: Vec<f64>,
    /// Filter state after the last sample; feed back in to continue the run.
    pub final_state: Vec<f64>,
}

/// Simulate `system` on `input` from `initial_state` (rest when `None`).
///
/// The output always has exactly one sample per input sample.
pub fn simulate<S: LinearSystem + ?Sized>(
    system: &S,
    input: &[f64],
    initial_state: Option<&[f64]>,
) -> VrftResult<Simulation> {
    let den = system.denominator();
    if den.is_empty() || den[0] == 0.0 {
        return Err(VrftError::validation(
            "cannot simulate a system with an empty or zero-leading denominator",
        ));
    }
    let order = den.len() - 1;
    let num = poly::trim_leading_zeros(system.numerator());
    if num.len() > den.len() {
        return Err(VrftError::validation("cannot simulate an improper system"));
    }

    let a0 = den[0];
    let a: Vec<f64> = den.iter().map(|c| c / a0).collect();
    let b: Vec<f64> = poly::pad_front(&num, den.len()).iter().map(|c| c / a0).collect();

    let mut state = match initial_state {
        None => vec![0.0; order],
        Some(s) if s.len() == order => s.to_vec(),
        Some(s) => {
            return Err(VrftError::validation(format!(
                "initial state has length {}, system order is {order}",
                s.len()
            )));
        }
    };

    let mut output = Vec::with_capacity(input.len());
    for &x in input {
        let y = b[0] * x + state.first().copied().unwrap_or(0.0);
        for i in 0..order {
            let next = if i + 1 < order { state[i + 1] } else { 0.0 };
            state[i] = b[i + 1] * x + next - a[i + 1] * y;
        }
        output.push(y);
    }

    Ok(Simulation {
        output,
        final_state: state,
    })
}
