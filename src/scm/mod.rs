//! Structural causal model composition.

pub mod model;

pub use model::*;
