//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - variable identifiers (`Variable`)
//! - the in-memory observation table (`DataTable`, `Column`)

pub mod types;

pub use types::*;
