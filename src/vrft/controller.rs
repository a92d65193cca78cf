//! Controller synthesis: `C = Σ θ_i C_i`.

use crate::error::{VrftError, VrftResult};
use crate::system::{LinearSystem, TransferFunction};

/// Combine the basis elements with the estimated weights.
pub fn synthesize<S: LinearSystem>(theta: &[f64], basis: &[S]) -> VrftResult<TransferFunction> {
    if basis.is_empty() {
        return Err(VrftError::validation("basis set is empty"));
    }
    if theta.len() != basis.len() {
        return Err(VrftError::validation(format!(
            "{} parameters supplied for {} basis elements",
            theta.len(),
            basis.len()
        )));
    }

    let mut controller = TransferFunction::from_system(&basis[0])?.scaled(theta[0]);
    for (element, &weight) in basis.iter().zip(theta.iter()).skip(1) {
        let term = TransferFunction::from_system(element)?.scaled(weight);
        controller = controller.try_add(&term)?;
    }
    Ok(controller)
}
