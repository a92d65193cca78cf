//! Regression matrix construction.
//!
//! Each basis controller is simulated on the (filtered) tracking error; its
//! response becomes one row of the `(k, N)` regressor. Rows are independent, so
//! they can be computed on the rayon pool; collection is indexed, so row `i`
//! is always basis element `i`.

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::domain::VrftOptions;
use crate::error::{VrftError, VrftResult};
use crate::system::{LinearSystem, ensure_sampling_period, simulate, validate_system};

/// Build the regressor with every basis element starting at rest.
pub fn build_regressor<S: LinearSystem + Sync>(
    basis: &[S],
    error: &[f64],
    ts: f64,
    opts: &VrftOptions,
) -> VrftResult<DMatrix<f64>> {
    build_regressor_with_states(basis, error, ts, None, opts)
}

/// Build the regressor, optionally overriding each basis element's initial state.
///
/// `initial_states[i]` must have length `basis[i].order()`.
pub fn build_regressor_with_states<S: LinearSystem + Sync>(
    basis: &[S],
    error: &[f64],
    ts: f64,
    initial_states: Option<&[Vec<f64>]>,
    opts: &VrftOptions,
) -> VrftResult<DMatrix<f64>> {
    if basis.is_empty() {
        return Err(VrftError::validation("basis set is empty"));
    }
    if error.is_empty() {
        return Err(VrftError::validation("error signal is empty"));
    }
    for (i, element) in basis.iter().enumerate() {
        let what = format!("basis element {i}");
        validate_system(element, &what)?;
        ensure_sampling_period(element, ts, &what)?;
    }
    if let Some(states) = initial_states {
        if states.len() != basis.len() {
            return Err(VrftError::validation(format!(
                "{} initial states supplied for {} basis elements",
                states.len(),
                basis.len()
            )));
        }
    }

    let simulate_row = |i: usize| -> VrftResult<Vec<f64>> {
        let state = initial_states.map(|s| s[i].as_slice());
        Ok(simulate(&basis[i], error, state)?.output)
    };

    let rows: Vec<Vec<f64>> = if opts.parallel {
        (0..basis.len())
            .into_par_iter()
            .map(simulate_row)
            .collect::<VrftResult<Vec<_>>>()?
    } else {
        (0..basis.len())
            .map(simulate_row)
            .collect::<VrftResult<Vec<_>>>()?
    };

    let phi = assemble_rows(&rows, error.len())?;
    tracing::debug!(
        rows = phi.nrows(),
        samples = phi.ncols(),
        parallel = opts.parallel,
        "regressor built"
    );
    Ok(phi)
}

/// Stack simulated basis responses into a `(k, n)` matrix.
///
/// A row of the wrong length means a simulator broke its contract.
fn assemble_rows(rows: &[Vec<f64>], n: usize) -> VrftResult<DMatrix<f64>> {
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != n) {
        return Err(VrftError::internal(format!(
            "simulation of basis element {i} returned {} samples for {n} inputs",
            row.len()
        )));
    }
    Ok(DMatrix::from_fn(rows.len(), n, |i, j| rows[i][j]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::TransferFunction;

    fn pid_basis(ts: f64) -> Vec<TransferFunction> {
        vec![
            TransferFunction::new(vec![1.0], vec![1.0], ts).unwrap(),
            TransferFunction::new(vec![1.0], vec![1.0, -1.0], ts).unwrap(),
            TransferFunction::new(vec![1.0, -1.0], vec![1.0, 0.0], ts).unwrap(),
        ]
    }

    #[test]
    fn shape_is_basis_by_samples() {
        let error: Vec<f64> = (0..37).map(|k| (k as f64).cos()).collect();
        let phi = build_regressor(&pid_basis(0.1), &error, 0.1, &VrftOptions::default()).unwrap();
        assert_eq!(phi.shape(), (3, 37));

        // Proportional row is the error itself, integral row its running sum.
        let mut sum = 0.0;
        for (j, &e) in error.iter().enumerate() {
            assert!((phi[(0, j)] - e).abs() < 1e-12);
            assert!((phi[(1, j)] - sum).abs() < 1e-9);
            sum += e;
        }
    }

    #[test]
    fn parallel_and_sequential_rows_agree() {
        let error: Vec<f64> = (0..500).map(|k| (k as f64 * 0.05).sin()).collect();
        let basis = pid_basis(0.01);
        let par = build_regressor(&basis, &error, 0.01, &VrftOptions::default()).unwrap();
        let seq = build_regressor(
            &basis,
            &error,
            0.01,
            &VrftOptions {
                parallel: false,
                ..VrftOptions::default()
            },
        )
        .unwrap();
        assert_eq!(par, seq);
    }

    #[test]
    fn explicit_initial_states_shift_rows() {
        let basis = vec![TransferFunction::new(vec![1.0], vec![1.0, -1.0], 1.0).unwrap()];
        let error = vec![0.0; 4];
        let states = vec![vec![2.0]];
        let opts = VrftOptions::default();
        let phi = build_regressor_with_states(&basis, &error, 1.0, Some(&states), &opts).unwrap();
        for j in 0..4 {
            assert!((phi[(0, j)] - 2.0).abs() < 1e-12);
        }

        let wrong = vec![vec![1.0, 2.0]];
        assert!(build_regressor_with_states(&basis, &error, 1.0, Some(&wrong), &opts).is_err());
    }

    #[test]
    fn rejects_empty_basis_and_mismatched_sampling() {
        let error = vec![1.0; 10];
        let empty: Vec<TransferFunction> = Vec::new();
        assert!(matches!(
            build_regressor(&empty, &error, 0.1, &VrftOptions::default()),
            Err(VrftError::Validation(_))
        ));
        assert!(matches!(
            build_regressor(&pid_basis(0.2), &error, 0.1, &VrftOptions::default()),
            Err(VrftError::Validation(_))
        ));
    }

    #[test]
    fn short_simulation_rows_are_internal_errors() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0]];
        let err = assemble_rows(&rows, 3).unwrap_err();
        assert!(matches!(err, VrftError::Internal(_)), "{err:?}");
        assert!(err.to_string().contains("basis element 1"));

        let phi = assemble_rows(&rows[..1], 3).unwrap();
        assert_eq!(phi.shape(), (1, 3));
        assert_eq!(phi[(0, 2)], 3.0);
    }
}
