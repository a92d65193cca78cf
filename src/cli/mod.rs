//! Command-line parsing for the VRFT controller tuner.
//!
//! Argument parsing and command dispatch stay separate from the estimation code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::FilterKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "vrft",
    version,
    about = "Virtual Reference Feedback Tuning of linear controllers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Tune a PI controller on a synthetic first-order plant and check the closed loop.
    Demo(DemoArgs),
    /// Tune a controller from a recorded experiment (CSV) and a design file (JSON).
    Fit(FitArgs),
}

/// Options for the synthetic demo.
#[derive(Debug, Parser, Clone)]
pub struct DemoArgs {
    /// Number of samples in the synthetic experiment.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub samples: usize,

    /// Random seed for the measurement noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Standard deviation of the white noise driving the coloured output noise.
    /// Pass `0` for noiseless data.
    #[arg(long, default_value_t = 0.01)]
    pub noise: f64,

    /// Design filter applied to the error and input before the regression.
    #[arg(long, value_enum, default_value_t = FilterKind::Standard)]
    pub filter: FilterKind,

    /// Shorthand for `--filter none`.
    #[arg(long)]
    pub no_filter: bool,

    /// Simulate the basis elements on one thread.
    #[arg(long)]
    pub sequential: bool,
}

/// Options for tuning from recorded data.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Experiment CSV with `u` and `y` columns.
    #[arg(long, value_name = "CSV")]
    pub data: PathBuf,

    /// Design JSON (reference model, basis, filter, initial conditions).
    #[arg(long, value_name = "JSON")]
    pub design: PathBuf,

    /// Export the estimate (theta, controller, diagnostics) to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Simulate the basis elements on one thread.
    #[arg(long)]
    pub sequential: bool,
}
