//! Synthetic open-loop experiment for `vrft demo`.
//!
//! Scenario:
//! - plant `G = 0.5 / (z - 0.9)`, sampled at 10 ms
//! - input: unit step switched off on samples 200..400 and 600..800
//! - output noise: seeded Gaussian noise through a unit-DC-gain low-pass
//! - reference model `M = 0.6 / (z - 0.4)`, PI basis `{1/(z-1), z/(z-1)}`
//!
//! With noise disabled the ideal controller `1.2 (z - 0.9) / (z - 1)` lies in
//! the basis span, so the demo doubles as a sanity check of the pipeline.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::domain::{DemoConfig, ExperimentData};
use crate::error::AppError;
use crate::system::{TransferFunction, simulate};

/// Sampling period of the demo experiment.
pub const DEMO_TS: f64 = 1e-2;

/// Pole of the noise-colouring low-pass.
const NOISE_POLE: f64 = 0.5;

/// Everything needed to run and assess the demo.
#[derive(Debug, Clone)]
pub struct DemoScenario {
    pub plant: TransferFunction,
    pub reference_model: TransferFunction,
    pub basis: Vec<TransferFunction>,
    pub design_filter: Option<TransferFunction>,
    pub data: ExperimentData,
}

pub fn generate_demo(config: &DemoConfig) -> Result<DemoScenario, AppError> {
    if config.samples < 10 {
        return Err(AppError::new(2, "Demo needs at least 10 samples."));
    }
    if !(config.noise_std.is_finite() && config.noise_std >= 0.0) {
        return Err(AppError::new(2, "Noise standard deviation must be finite and >= 0."));
    }

    let plant = TransferFunction::new(vec![0.5], vec![1.0, -0.9], DEMO_TS)?;
    let reference_model = TransferFunction::new(vec![0.6], vec![1.0, -0.4], DEMO_TS)?;
    let basis = vec![
        TransferFunction::new(vec![1.0], vec![1.0, -1.0], DEMO_TS)?,
        TransferFunction::new(vec![1.0, 0.0], vec![1.0, -1.0], DEMO_TS)?,
    ];
    let design_filter = config.filter.build(&reference_model)?;

    let u = demo_input(config.samples);
    let mut y = simulate(&plant, &u, None)?.output;

    if config.noise_std > 0.0 {
        let noise = coloured_noise(config.samples, config.noise_std, config.seed)?;
        for (yk, nk) in y.iter_mut().zip(noise) {
            *yk += nk;
        }
    }

    // Relative degree of M is 1: one pre-record output sample, at rest.
    let data = ExperimentData::new(y, u, DEMO_TS, vec![0.0])?;

    Ok(DemoScenario {
        plant,
        reference_model,
        basis,
        design_filter,
        data,
    })
}

/// Step input with two off windows (scaled with the record length).
pub fn demo_input(samples: usize) -> Vec<f64> {
    let off_windows = [(samples / 5, 2 * samples / 5), (3 * samples / 5, 4 * samples / 5)];
    (0..samples)
        .map(|k| {
            if off_windows.iter().any(|&(a, b)| k >= a && k < b) {
                0.0
            } else {
                1.0
            }
        })
        .collect()
}

fn coloured_noise(samples: usize, std: f64, seed: u64) -> Result<Vec<f64>, AppError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, std)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;
    let white: Vec<f64> = (0..samples).map(|_| normal.sample(&mut rng)).collect();

    let lowpass = TransferFunction::new(vec![1.0 - NOISE_POLE], vec![1.0, -NOISE_POLE], DEMO_TS)?;
    Ok(simulate(&lowpass, &white, None)?.output)
}
