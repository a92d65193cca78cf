//! Shared tuning workflow behind both subcommands.
//!
//! ```text
//! demo: synthetic experiment -> VRFT -> closed-loop assessment
//! fit : CSV + design JSON    -> VRFT
//! ```

use crate::data::{DemoScenario, generate_demo};
use crate::domain::{DemoConfig, ExperimentData, FitConfig, VrftOptions};
use crate::error::AppError;
use crate::io::{Design, load_design, load_signals};
use crate::report::{LoopAssessment, assess_closed_loop};
use crate::system::LinearSystem;
use crate::vrft::{VrftOutput, compute_vrft};

/// All computed outputs of a `vrft demo` run.
#[derive(Debug, Clone)]
pub struct DemoRun {
    pub scenario: DemoScenario,
    pub output: VrftOutput,
    pub assessment: LoopAssessment,
}

/// All computed outputs of a `vrft fit` run.
#[derive(Debug, Clone)]
pub struct FitRun {
    pub design: Design,
    pub data: ExperimentData,
    pub output: VrftOutput,
}

pub fn run_demo(config: &DemoConfig) -> Result<DemoRun, AppError> {
    let scenario = generate_demo(config)?;
    let opts = VrftOptions {
        parallel: config.parallel,
        ..VrftOptions::default()
    };

    let output = compute_vrft(
        &scenario.data,
        &scenario.reference_model,
        &scenario.basis,
        scenario.design_filter.as_ref().map(|l| l as &dyn LinearSystem),
        &opts,
    )?;

    let assessment = assess_closed_loop(
        &scenario.plant,
        &output.controller,
        &scenario.reference_model,
        scenario.data.len(),
    )?;

    Ok(DemoRun {
        scenario,
        output,
        assessment,
    })
}

pub fn run_fit(config: &FitConfig) -> Result<FitRun, AppError> {
    let design = load_design(&config.design_path)?;
    let signals = load_signals(&config.data_path)?;
    tracing::info!(
        samples = signals.len(),
        basis = design.basis.len(),
        "experiment and design loaded"
    );

    let data = ExperimentData::new(
        signals.y,
        signals.u,
        design.ts,
        design.initial_conditions.clone(),
    )?;
    let output = compute_vrft(
        &data,
        &design.reference_model,
        &design.basis,
        design.design_filter.as_ref().map(|l| l as &dyn LinearSystem),
        &design.options(config.parallel),
    )?;

    Ok(FitRun { design, data, output })
}
