//! Virtual Reference Feedback Tuning.
//!
//! Responsibilities:
//!
//! - reconstruct the virtual reference from the measured output (`reference`)
//! - simulate the basis controllers on the tracking error (`regressor`)
//! - combine basis and estimated weights into a controller (`controller`)
//! - sequence the stages (`algo`)

pub mod algo;
pub mod controller;
pub mod reference;
pub mod regressor;

pub use algo::*;
pub use controller::*;
pub use reference::*;
pub use regressor::*;
