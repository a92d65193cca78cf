//! Design JSON: reference model, basis, design filter and initial conditions.
//!
//! The schema is defined by `domain::DesignFile`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::domain::{DesignFile, VrftOptions};
use crate::error::AppError;
use crate::system::TransferFunction;

/// A design file resolved into systems sharing the file's sampling period.
#[derive(Debug, Clone)]
pub struct Design {
    pub ts: f64,
    pub initial_conditions: Vec<f64>,
    pub reference_model: TransferFunction,
    pub basis: Vec<TransferFunction>,
    pub design_filter: Option<TransferFunction>,
    pub max_condition_number: Option<f64>,
}

impl Design {
    /// Library options for this design; `parallel` comes from the command line.
    pub fn options(&self, parallel: bool) -> VrftOptions {
        let mut opts = VrftOptions {
            parallel,
            ..VrftOptions::default()
        };
        if let Some(max) = self.max_condition_number {
            opts.max_condition_number = max;
        }
        opts
    }
}

pub fn load_design(path: &Path) -> Result<Design, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open design JSON '{}': {e}", path.display()))
    })?;
    read_design(file)
}

pub fn read_design<R: Read>(source: R) -> Result<Design, AppError> {
    let raw: DesignFile = serde_json::from_reader(source)
        .map_err(|e| AppError::new(2, format!("Invalid design JSON: {e}")))?;
    resolve_design(raw)
}

fn resolve_design(raw: DesignFile) -> Result<Design, AppError> {
    let ts = raw.ts;
    let reference_model = raw
        .reference_model
        .to_system(ts)
        .map_err(|e| AppError::new(2, format!("Invalid reference model: {e}")))?;

    let basis = raw
        .basis
        .iter()
        .enumerate()
        .map(|(i, c)| {
            c.to_system(ts)
                .map_err(|e| AppError::new(2, format!("Invalid basis element {i}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let design_filter = raw
        .filter
        .build(&reference_model, ts)
        .map_err(|e| AppError::new(2, format!("Invalid design filter: {e}")))?;

    Ok(Design {
        ts,
        initial_conditions: raw.initial_conditions,
        reference_model,
        basis,
        design_filter,
        max_condition_number: raw.max_condition_number,
    })
}
