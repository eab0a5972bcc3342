//! Sampling from fitted structural causal models.
//!
//! - intervention types (`intervention`)
//! - observational / interventional forward simulation (`sampler`)
//! - counterfactuals for observed rows (`counterfactual`)

pub mod counterfactual;
pub mod intervention;
pub mod sampler;

pub use counterfactual::*;
pub use intervention::*;
pub use sampler::*;
