//! Shared domain types.
//!
//! - [`ExperimentData`]: one recorded input/output experiment
//! - [`VrftOptions`]: library knobs for the estimation pipeline
//! - design/result file schemas (serde) and the binary's run configuration

use std::path::PathBuf;

use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{VrftError, VrftResult};
use crate::system::{RawTransferFunction, TransferFunction};

/// Default ceiling for the regressor's condition number.
pub const DEFAULT_MAX_CONDITION_NUMBER: f64 = 1e10;

/// One input/output experiment on the plant.
///
/// `initial_conditions` holds the output samples that precede the record,
/// most recent first (`y[-1], y[-2], ...`). Its length is checked against the
/// reference model when the virtual reference is computed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentData {
    y: Vec<f64>,
    u: Vec<f64>,
    ts: f64,
    initial_conditions: Vec<f64>,
}

impl ExperimentData {
    pub fn new(
        y: Vec<f64>,
        u: Vec<f64>,
        ts: f64,
        initial_conditions: Vec<f64>,
    ) -> VrftResult<Self> {
        if y.len() != u.len() {
            return Err(VrftError::validation(format!(
                "output has {} samples but input has {}",
                y.len(),
                u.len()
            )));
        }
        if !(ts.is_finite() && ts > 0.0) {
            return Err(VrftError::validation(format!(
                "sampling period must be finite and > 0, got {ts}"
            )));
        }
        if let Some(i) = y.iter().position(|v| !v.is_finite()) {
            return Err(VrftError::validation(format!("non-finite output sample at index {i}")));
        }
        if let Some(i) = u.iter().position(|v| !v.is_finite()) {
            return Err(VrftError::validation(format!("non-finite input sample at index {i}")));
        }
        if initial_conditions.iter().any(|v| !v.is_finite()) {
            return Err(VrftError::validation("initial conditions must be finite"));
        }
        Ok(Self {
            y,
            u,
            ts,
            initial_conditions,
        })
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn u(&self) -> &[f64] {
        &self.u
    }

    pub fn ts(&self) -> f64 {
        self.ts
    }

    pub fn initial_conditions(&self) -> &[f64] {
        &self.initial_conditions
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// Estimation options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VrftOptions {
    /// Largest accepted condition number of the regressor cross-product `ΦΦᵀ`.
    pub max_condition_number: f64,
    /// Simulate basis elements on the rayon pool.
    pub parallel: bool,
}

impl Default for VrftOptions {
    fn default() -> Self {
        Self {
            max_condition_number: DEFAULT_MAX_CONDITION_NUMBER,
            parallel: true,
        }
    }
}

/// Polynomial pair in a design file; the sampling period comes from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub num: Vec<f64>,
    pub den: Vec<f64>,
}

impl Coefficients {
    pub fn to_system(&self, ts: f64) -> VrftResult<TransferFunction> {
        TransferFunction::new(self.num.clone(), self.den.clone(), ts)
    }
}

/// Built-in choices for the experiment-design filter `L`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// No pre-filtering.
    None,
    /// `L = M`.
    Reference,
    /// `L = M (1 - M)`, the usual choice for noise-free plant data.
    Standard,
}

/// Design-filter entry of a design file: a built-in kind or explicit coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterChoice {
    Kind(FilterKind),
    Custom(Coefficients),
}

impl FilterKind {
    /// Build `L` for the given reference model.
    pub fn build(self, reference_model: &TransferFunction) -> VrftResult<Option<TransferFunction>> {
        match self {
            FilterKind::None => Ok(None),
            FilterKind::Reference => Ok(Some(reference_model.clone())),
            FilterKind::Standard => {
                let one = TransferFunction::one(reference_model.ts())?;
                let complement = one.try_sub(reference_model)?;
                Ok(Some(reference_model.try_mul(&complement)?))
            }
        }
    }
}

impl Default for FilterChoice {
    fn default() -> Self {
        FilterChoice::Kind(FilterKind::None)
    }
}

impl FilterChoice {
    pub fn build(
        &self,
        reference_model: &TransferFunction,
        ts: f64,
    ) -> VrftResult<Option<TransferFunction>> {
        match self {
            FilterChoice::Kind(kind) => kind.build(reference_model),
            FilterChoice::Custom(coeffs) => coeffs.to_system(ts).map(Some),
        }
    }
}

/// A VRFT design file (JSON).
///
/// ```json
/// {
///   "ts": 0.01,
///   "initial_conditions": [0.0],
///   "reference_model": { "num": [0.6], "den": [1.0, -0.4] },
///   "basis": [
///     { "num": [1.0], "den": [1.0, -1.0] },
///     { "num": [1.0, 0.0], "den": [1.0, -1.0] }
///   ],
///   "filter": "standard"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignFile {
    pub ts: f64,
    #[serde(default)]
    pub initial_conditions: Vec<f64>,
    pub reference_model: Coefficients,
    pub basis: Vec<Coefficients>,
    #[serde(default)]
    pub filter: FilterChoice,
    #[serde(default)]
    pub max_condition_number: Option<f64>,
}

/// Exported estimation result (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultFile {
    pub tool: String,
    pub generated_at: DateTime<Local>,
    pub theta: Vec<f64>,
    pub controller: RawTransferFunction,
    pub condition_number: f64,
    pub residual_rms: f64,
    pub virtual_reference: Vec<f64>,
    pub filtered_error: Vec<f64>,
}

/// `vrft demo` configuration (derived from CLI flags).
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub samples: usize,
    pub seed: u64,
    pub noise_std: f64,
    pub filter: FilterKind,
    pub parallel: bool,
}

/// `vrft fit` configuration (derived from CLI flags).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub data_path: PathBuf,
    pub design_path: PathBuf,
    pub export_path: Option<PathBuf>,
    pub parallel: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experiment_rejects_mismatched_lengths_and_bad_ts() {
        assert!(ExperimentData::new(vec![1.0], vec![1.0, 1.0], 0.1, vec![]).is_err());
        assert!(ExperimentData::new(vec![1.0], vec![1.0], 0.0, vec![]).is_err());
        assert!(ExperimentData::new(vec![1.0], vec![1.0], f64::NAN, vec![]).is_err());
        assert!(ExperimentData::new(vec![f64::INFINITY], vec![1.0], 0.1, vec![]).is_err());

        let ok = ExperimentData::new(vec![0.0, 1.0], vec![1.0, 1.0], 0.1, vec![0.0]).unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok.initial_conditions(), &[0.0]);
    }

    #[test]
    fn design_file_parses_builtin_and_custom_filters() {
        let text = r#"{
            "ts": 0.01,
            "initial_conditions": [0.0],
            "reference_model": { "num": [0.6], "den": [1.0, -0.4] },
            "basis": [{ "num": [1.0], "den": [1.0, -1.0] }],
            "filter": "standard"
        }"#;
        let design: DesignFile = serde_json::from_str(text).unwrap();
        assert_eq!(design.filter, FilterChoice::Kind(FilterKind::Standard));
        assert_eq!(design.max_condition_number, None);

        let text = r#"{
            "ts": 0.01,
            "reference_model": { "num": [0.6], "den": [1.0, -0.4] },
            "basis": [],
            "filter": { "num": [1.0], "den": [1.0, -0.5] }
        }"#;
        let design: DesignFile = serde_json::from_str(text).unwrap();
        assert!(matches!(design.filter, FilterChoice::Custom(_)));
        assert!(design.initial_conditions.is_empty());
    }

    #[test]
    fn builtin_filters_follow_the_reference_model() {
        let m = TransferFunction::new(vec![0.6], vec![1.0, -0.4], 0.01).unwrap();
        assert_eq!(FilterKind::None.build(&m).unwrap(), None);
        assert_eq!(FilterKind::Reference.build(&m).unwrap(), Some(m.clone()));

        // M (1 - M) = 0.6 (z - 1) / (z - 0.4)^2
        let l = FilterKind::Standard.build(&m).unwrap().unwrap();
        assert!(l.dc_gain().abs() < 1e-12);
        assert_eq!(l.relative_degree(), 1);
    }
}
