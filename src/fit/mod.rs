//! Fitting causal mechanisms to observed data.
//!
//! Responsibilities:
//!
//! - fit every node's mechanism in topological order (`fitter`)
//! - commit the fitted state atomically
//! - reconstruct per-row noise from fitted invertible models (`noise`)

pub mod fitter;
pub mod noise;

pub use fitter::*;
pub use noise::*;
