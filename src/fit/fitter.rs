//! Fit pass over a structural causal model.
//!
//! Given:
//! - a model whose every node carries a mechanism
//! - a table with one column per node (extra columns are ignored)
//!
//! we fit, in topological order:
//! - roots: the empirical distribution stores the column verbatim
//! - non-roots: the regressor is trained on parent columns → node column and
//!   the noise model on the resulting residuals
//!
//! Mechanisms are fitted on a staged copy of the registry. The copy replaces
//! the model's registry only after every node succeeds, so a failed pass
//! leaves the model exactly as it was.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{DataTable, Variable};
use crate::error::{CausalError, Result};
use crate::mechanisms::{Mechanism, MechanismKind};
use crate::scm::StructuralCausalModel;

/// Per-node outcome of a fit pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeFitReport {
    pub node: Variable,
    pub kind: MechanismKind,
    pub parents: Vec<Variable>,
    /// Regressor name for additive-noise nodes.
    pub regressor: Option<String>,
    pub n_obs: usize,
    /// In-sample root mean squared residual for additive-noise nodes.
    pub rmse: Option<f64>,
}

/// Outcome of a whole fit pass, in the order nodes were fitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitSummary {
    pub n_rows: usize,
    pub nodes: Vec<NodeFitReport>,
}

impl FitSummary {
    pub fn node(&self, name: &str) -> Option<&NodeFitReport> {
        self.nodes.iter().find(|r| r.node.as_str() == name)
    }
}

/// Fit every mechanism of `scm` to `data`.
///
/// Errors:
/// - `MissingMechanism` / `MechanismMismatch` if the model is incomplete
/// - `MissingColumn` if any graph node has no column (checked up front)
/// - `Fit` if a mechanism fails numerically; the model keeps its previous state
pub fn fit(scm: &mut StructuralCausalModel, data: &DataTable) -> Result<FitSummary> {
    scm.validate()?;
    let graph = scm.graph();
    for node in graph.nodes() {
        data.require_column(node.as_str())?;
    }
    if data.is_empty() {
        return Err(CausalError::invalid("Cannot fit a causal model on an empty table."));
    }

    info!(
        nodes = graph.node_count(),
        rows = data.n_rows(),
        "fitting structural causal model"
    );

    let mut staged = scm.mechanisms().clone();
    let mut reports = Vec::with_capacity(graph.node_count());

    for node in graph.topological_order() {
        let mechanism = staged
            .get_mut(node.as_str())
            .ok_or_else(|| CausalError::MissingMechanism(node.to_string()))?;
        let parents = graph.parents_of(node.as_str())?;

        let report = match mechanism {
            Mechanism::Empirical(dist) => {
                let values = data.require_column(node.as_str())?;
                dist.fit(values).map_err(|e| attach_node(e, node))?;
                NodeFitReport {
                    node: node.clone(),
                    kind: MechanismKind::EmpiricalDistribution,
                    parents,
                    regressor: None,
                    n_obs: values.len(),
                    rmse: None,
                }
            }
            Mechanism::AdditiveNoise(model) => {
                let x = data.matrix(&parents)?;
                let y = data.vector(node.as_str())?;
                let stats = model.fit(&x, &y).map_err(|e| attach_node(e, node))?;
                NodeFitReport {
                    node: node.clone(),
                    kind: MechanismKind::AdditiveNoiseModel,
                    parents,
                    regressor: Some(model.regressor().name().to_string()),
                    n_obs: stats.n_obs,
                    rmse: Some(stats.rmse),
                }
            }
        };

        debug!(
            node = %report.node,
            kind = ?report.kind,
            n_obs = report.n_obs,
            rmse = ?report.rmse,
            "fitted mechanism"
        );
        reports.push(report);
    }

    let summary = FitSummary {
        n_rows: data.n_rows(),
        nodes: reports,
    };
    scm.commit_fit(staged);
    info!(nodes = summary.nodes.len(), "causal model fitted");
    Ok(summary)
}

/// Regressors and distributions report fit errors without a node name.
fn attach_node(err: CausalError, node: &Variable) -> CausalError {
    match err {
        CausalError::Fit { node: n, reason } if n.is_empty() => CausalError::fit(node.as_str(), reason),
        other => other,
    }
}
