//! Export a VRFT estimate to JSON.
//!
//! The file is meant to be easy to consume from scripts: the controller is
//! stored with the same `{num, den, ts}` layout the design file uses.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Local;

use crate::domain::ResultFile;
use crate::error::AppError;
use crate::vrft::VrftOutput;

/// Build the exported document for one run.
pub fn result_file(output: &VrftOutput) -> ResultFile {
    ResultFile {
        tool: "vrft".to_string(),
        generated_at: Local::now(),
        theta: output.theta.clone(),
        controller: output.controller.clone().into(),
        condition_number: output.condition_number,
        residual_rms: output.residual_rms,
        virtual_reference: output.virtual_reference.clone(),
        filtered_error: output.filtered_error.clone(),
    }
}

/// Write the result JSON file.
pub fn write_result_json(path: &Path, output: &VrftOutput) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create result JSON '{}': {e}", path.display()))
    })?;
    write_result(file, output)
}

pub fn write_result<W: Write>(sink: W, output: &VrftOutput) -> Result<(), AppError> {
    serde_json::to_writer_pretty(sink, &result_file(output))
        .map_err(|e| AppError::new(2, format!("Failed to write result JSON: {e}")))
}
