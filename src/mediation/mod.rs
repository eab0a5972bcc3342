//! Natural direct and indirect effects.
//!
//! - estimand types (`estimand`)
//! - graphical identification (`identify`)
//! - two-stage regression estimation (`estimate`)
//! - bootstrap and analytic inference (`intervals`)

pub mod estimand;
pub mod estimate;
pub mod identify;
pub mod intervals;

pub use estimand::*;
pub use estimate::{EffectEstimate, EstimateOptions, MediationReport, estimate_effect, estimate_mediation_effects};
pub use identify::*;
pub use intervals::{Inference, IntervalMethod};
