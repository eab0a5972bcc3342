//! Mathematical utilities: least squares solvers, small statistics helpers and
//! stable seed derivation.

pub mod ols;
pub mod seed;
pub mod stats;

pub use ols::*;
pub use seed::*;
pub use stats::*;
