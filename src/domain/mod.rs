//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the experiment record (`ExperimentData`)
//! - estimation options (`VrftOptions`)
//! - design and result file schemas (`DesignFile`, `ResultFile`)
//! - run configurations for the binary (`DemoConfig`, `FitConfig`)

pub mod types;

pub use types::*;
