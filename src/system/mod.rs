//! Discrete-time linear systems: representation, simulation and arithmetic.

pub mod arith;
pub mod poly;
pub mod simulate;
pub mod transfer_function;

pub use simulate::*;
pub use transfer_function::*;
