//! Top-level application orchestration.
//!
//! `src/main.rs` only sets up logging; this module is the "real main" that:
//! - parses CLI arguments
//! - builds the run configuration
//! - runs the tuning pipeline
//! - prints the report and writes the optional export

use clap::Parser;

use crate::cli::{Command, DemoArgs, FitArgs};
use crate::domain::{DemoConfig, FilterKind, FitConfig};
use crate::error::AppError;
use crate::report::{RunContext, format_run_summary};

pub mod pipeline;

/// Entry point for the `vrft` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Demo(args) => handle_demo(&args),
        Command::Fit(args) => handle_fit(&args),
    }
}

fn handle_demo(args: &DemoArgs) -> Result<(), AppError> {
    let config = demo_config_from_args(args);
    let run = pipeline::run_demo(&config)?;

    let ctx = RunContext {
        title: "synthetic demo",
        reference_model: &run.scenario.reference_model,
        basis: &run.scenario.basis,
        design_filter: run.scenario.design_filter.as_ref(),
    };
    println!(
        "{}",
        format_run_summary(&ctx, &run.scenario.data, &run.output, Some(&run.assessment))
    );
    Ok(())
}

fn handle_fit(args: &FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(args);
    let run = pipeline::run_fit(&config)?;

    let title = format!("fit {}", config.data_path.display());
    let ctx = RunContext {
        title: &title,
        reference_model: &run.design.reference_model,
        basis: &run.design.basis,
        design_filter: run.design.design_filter.as_ref(),
    };
    println!("{}", format_run_summary(&ctx, &run.data, &run.output, None));

    if let Some(path) = &config.export_path {
        crate::io::write_result_json(path, &run.output)?;
        tracing::info!(path = %path.display(), "estimate exported");
    }
    Ok(())
}

pub fn demo_config_from_args(args: &DemoArgs) -> DemoConfig {
    DemoConfig {
        samples: args.samples,
        seed: args.seed,
        noise_std: args.noise,
        filter: if args.no_filter { FilterKind::None } else { args.filter },
        parallel: !args.sequential,
    }
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        data_path: args.data.clone(),
        design_path: args.design.clone(),
        export_path: args.export.clone(),
        parallel: !args.sequential,
    }
}
