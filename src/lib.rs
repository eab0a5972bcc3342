//! `causal-scm` library crate.
//!
//! Structural causal models over a DAG of named variables:
//!
//! - build a graph and attach one mechanism per node (`graph`, `mechanisms`, `scm`)
//! - fit every mechanism from a data table (`fit`)
//! - draw observational, interventional and counterfactual samples (`sampling`)
//! - identify and estimate natural direct / indirect effects (`mediation`)
//!
//! Ambient pieces: the error taxonomy (`error`), layered configuration
//! (`config`), and small numeric helpers (`math`).

pub mod config;
pub mod domain;
pub mod error;
pub mod fit;
pub mod graph;
pub mod math;
pub mod mechanisms;
pub mod mediation;
pub mod sampling;
pub mod scm;

pub use config::EngineConfig;
pub use domain::{Column, DataTable, Variable};
pub use error::{CausalError, ErrorCategory, Result};
pub use graph::CausalGraph;
pub use mechanisms::{Mechanism, MechanismRegistry};
pub use scm::StructuralCausalModel;
