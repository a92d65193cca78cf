//! Input/output helpers.
//!
//! - experiment CSV ingest + validation (`ingest`)
//! - design JSON read (`design`)
//! - result JSON export (`export`)

pub mod design;
pub mod export;
pub mod ingest;

pub use design::*;
pub use export::*;
pub use ingest::*;
