//! Error taxonomy for graph construction, fitting, sampling and identification.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors are grouped
//! into coarse [`ErrorCategory`] buckets so callers can branch on the kind of
//! failure without matching every variant.

use thiserror::Error;

/// Coarse classification of a [`CausalError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Graph/model/table shape problems detected before any mutation.
    Structural,
    /// Numeric failure while fitting a mechanism.
    Fit,
    /// Sampling was requested from a model that has not been fitted.
    SamplingPrecondition,
    /// The requested effect cannot be identified from the graph.
    Identification,
    /// Malformed arguments, tables or configuration.
    InvalidInput,
}

#[derive(Debug, Error)]
pub enum CausalError {
    #[error("Adding edge {parent} -> {child} would create a cycle.")]
    Cycle { parent: String, child: String },

    #[error("Node '{0}' is not part of the causal graph.")]
    UnknownNode(String),

    #[error("Data table has no column for node '{0}'.")]
    MissingColumn(String),

    #[error("No causal mechanism assigned to node '{0}'.")]
    MissingMechanism(String),

    #[error("Mechanism for node '{node}' is incompatible: {reason}")]
    MechanismMismatch { node: String, reason: String },

    #[error("Failed to fit mechanism for node '{node}': {reason}")]
    Fit { node: String, reason: String },

    #[error("The causal model has not been fitted yet.")]
    NotFitted,

    #[error("Effect is not identifiable: {0}")]
    NonIdentifiable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CausalError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CausalError::Cycle { .. }
            | CausalError::UnknownNode(_)
            | CausalError::MissingColumn(_)
            | CausalError::MissingMechanism(_)
            | CausalError::MechanismMismatch { .. } => ErrorCategory::Structural,
            CausalError::Fit { .. } => ErrorCategory::Fit,
            CausalError::NotFitted => ErrorCategory::SamplingPrecondition,
            CausalError::NonIdentifiable(_) => ErrorCategory::Identification,
            CausalError::InvalidInput(_) | CausalError::Config(_) => ErrorCategory::InvalidInput,
        }
    }

    pub(crate) fn fit(node: impl Into<String>, reason: impl Into<String>) -> Self {
        CausalError::Fit {
            node: node.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        CausalError::InvalidInput(message.into())
    }
}

impl From<serde_json::Error> for CausalError {
    fn from(value: serde_json::Error) -> Self {
        CausalError::Config(format!("Invalid JSON configuration: {value}"))
    }
}

impl From<std::io::Error> for CausalError {
    fn from(value: std::io::Error) -> Self {
        CausalError::Config(format!("Failed to read configuration: {value}"))
    }
}

pub type Result<T> = std::result::Result<T, CausalError>;
