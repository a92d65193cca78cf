//! Data sources: synthetic experiment generation.

pub mod sample;

pub use sample::*;
