//! Causal graph structure.
//!
//! - DAG storage with cycle rejection (`dag`)
//! - deterministic topological ordering

pub mod dag;

pub use dag::*;
