//! Formatted terminal output for a VRFT run.
//!
//! Formatting lives here so the estimation code stays free of presentation
//! concerns and output changes stay localized.

use crate::domain::ExperimentData;
use crate::report::LoopAssessment;
use crate::system::TransferFunction;
use crate::vrft::VrftOutput;

/// What produced the data, shown in the header.
#[derive(Debug, Clone)]
pub struct RunContext<'a> {
    pub title: &'a str,
    pub reference_model: &'a TransferFunction,
    pub basis: &'a [TransferFunction],
    pub design_filter: Option<&'a TransferFunction>,
}

/// Format the full run summary (experiment + diagnostics + controller).
pub fn format_run_summary(
    ctx: &RunContext<'_>,
    data: &ExperimentData,
    output: &VrftOutput,
    assessment: Option<&LoopAssessment>,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== vrft - {} ===\n", ctx.title));
    out.push_str(&format!(
        "Experiment: n={} | dt={} | u=[{:.3}, {:.3}] | y=[{:.3}, {:.3}]\n",
        data.len(),
        data.ts(),
        min(data.u()),
        max(data.u()),
        min(data.y()),
        max(data.y()),
    ));
    out.push_str(&format!("Reference model: {}\n", ctx.reference_model));
    match ctx.design_filter {
        Some(l) => out.push_str(&format!("Design filter:   {l}\n")),
        None => out.push_str("Design filter:   none\n"),
    }

    out.push_str("\nEstimate:\n");
    out.push_str(&format_basis_table(ctx.basis, &output.theta));
    out.push_str(&format!("- theta: {}\n", fmt_vec(&output.theta)));
    out.push_str(&format!(
        "- samples used: {} (last {} dropped by inversion)\n",
        output.virtual_reference.len(),
        output.delay
    ));
    out.push_str(&format!("- condition number: {:.3e}\n", output.condition_number));
    out.push_str(&format!("- residual RMS: {:.6}\n", output.residual_rms));

    out.push_str("\nController:\n");
    out.push_str(&format!("  C(z) = {}\n", output.controller));

    if let Some(a) = assessment {
        out.push_str("\nClosed loop (known plant):\n");
        out.push_str(&format!("  T(z) = {}\n", a.closed_loop));
        out.push_str(&format!(
            "- DC gain: {:.6} (model {:.6})\n",
            a.closed_loop_dc_gain, a.model_dc_gain
        ));
        out.push_str(&format!(
            "- step response RMS gap vs model: {:.6} over {} samples\n",
            a.step_rms_gap, a.horizon
        ));
    }

    out
}

fn format_basis_table(basis: &[TransferFunction], theta: &[f64]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<4} {:>14}  {}\n", "i", "theta_i", "C_i(z)"));
    out.push_str(&format!("{:-<4} {:-<14}  {:-<24}\n", "", "", ""));
    for (i, (element, weight)) in basis.iter().zip(theta.iter()).enumerate() {
        let shown = truncate(&element.to_string(), 48);
        out.push_str(&format!("{i:<4} {weight:>14.6}  {shown}\n"));
    }
    out
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

fn min(v: &[f64]) -> f64 {
    v.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max(v: &[f64]) -> f64 {
    v.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
