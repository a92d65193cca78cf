//! `vrft` library crate: Virtual Reference Feedback Tuning.
//!
//! Tunes a linear discrete-time controller, a weighted sum of user-chosen
//! basis transfer functions, from a single open-loop input/output record so
//! that the closed loop approaches a reference model.
//!
//! The binary (`vrft`) is a thin wrapper around this library so that the
//! estimation code is testable without spawning processes.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod report;
pub mod system;
pub mod vrft;

pub use domain::{ExperimentData, VrftOptions};
pub use error::{ErrorKind, VrftError, VrftResult};
pub use system::{LinearSystem, Simulation, TransferFunction, simulate};
pub use vrft::{
    VirtualReference, VrftOutput, compute_virtual_reference, compute_vrft, compute_vrft_default,
};
