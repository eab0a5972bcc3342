//! Structural causal model: graph + one mechanism per node + fitted flag.

use tracing::debug;

use crate::domain::{DataTable, Variable};
use crate::error::{CausalError, Result};
use crate::fit::{FitSummary, fit};
use crate::graph::CausalGraph;
use crate::mechanisms::{Mechanism, MechanismRegistry};
use crate::sampling::{InterventionSpec, SamplingOptions, draw_samples, interventional_samples};

#[derive(Debug, Clone)]
pub struct StructuralCausalModel {
    graph: CausalGraph,
    mechanisms: MechanismRegistry,
    fitted: bool,
}

impl StructuralCausalModel {
    /// Wrap a graph. The graph is frozen from here on; mechanisms are assigned
    /// separately.
    pub fn new(graph: CausalGraph) -> Self {
        Self {
            graph,
            mechanisms: MechanismRegistry::new(),
            fitted: false,
        }
    }

    pub fn graph(&self) -> &CausalGraph {
        &self.graph
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Assign `mechanism` to `node`, replacing any previous one.
    ///
    /// Roots take an empirical distribution, non-roots an additive-noise model.
    /// Assigning resets the model to unfit.
    pub fn set_causal_mechanism(&mut self, node: &str, mechanism: impl Into<Mechanism>) -> Result<()> {
        let mechanism = mechanism.into();
        check_role(&self.graph, node, &mechanism)?;
        self.mechanisms.insert(Variable::from(node), mechanism);
        self.fitted = false;
        Ok(())
    }

    pub fn causal_mechanism(&self, node: &str) -> Result<&Mechanism> {
        if !self.graph.contains(node) {
            return Err(CausalError::UnknownNode(node.to_string()));
        }
        self.mechanisms
            .get(node)
            .ok_or_else(|| CausalError::MissingMechanism(node.to_string()))
    }

    /// Give every node without a mechanism a default one: empirical for roots,
    /// linear additive-noise for the rest. Returns how many were assigned.
    pub fn assign_default_mechanisms(&mut self) -> Result<usize> {
        let mut assigned = 0;
        let nodes: Vec<Variable> = self.graph.nodes().cloned().collect();
        for node in nodes {
            if self.mechanisms.contains(node.as_str()) {
                continue;
            }
            let mechanism = if self.graph.is_root(node.as_str())? {
                Mechanism::empirical()
            } else {
                Mechanism::linear()
            };
            debug!(node = %node, kind = ?mechanism.kind(), "assigned default mechanism");
            self.mechanisms.insert(node, mechanism);
            assigned += 1;
        }
        if assigned > 0 {
            self.fitted = false;
        }
        Ok(assigned)
    }

    /// Check that every node carries a mechanism suited to its role.
    pub fn validate(&self) -> Result<()> {
        for node in self.graph.nodes() {
            let mechanism = self
                .mechanisms
                .get(node.as_str())
                .ok_or_else(|| CausalError::MissingMechanism(node.to_string()))?;
            check_role(&self.graph, node.as_str(), mechanism)?;
        }
        Ok(())
    }

    /// Fit every mechanism to `data`. See [`crate::fit::fit`].
    pub fn fit(&mut self, data: &DataTable) -> Result<FitSummary> {
        fit(self, data)
    }

    /// Observational samples. See [`crate::sampling::draw_samples`].
    pub fn draw_samples(&self, n: usize, options: &SamplingOptions) -> Result<DataTable> {
        draw_samples(self, n, options)
    }

    /// Samples under hard interventions.
    pub fn interventional_samples(
        &self,
        interventions: &InterventionSpec,
        n: usize,
        options: &SamplingOptions,
    ) -> Result<DataTable> {
        interventional_samples(self, interventions, n, options)
    }

    pub(crate) fn mechanisms(&self) -> &MechanismRegistry {
        &self.mechanisms
    }

    /// Swap in a fully fitted registry.
    pub(crate) fn commit_fit(&mut self, mechanisms: MechanismRegistry) {
        self.mechanisms = mechanisms;
        self.fitted = true;
    }

    /// Fitted mechanism for `node`, or `NotFitted`.
    pub(crate) fn fitted_mechanism(&self, node: &str) -> Result<&Mechanism> {
        if !self.fitted {
            return Err(CausalError::NotFitted);
        }
        let mechanism = self.causal_mechanism(node)?;
        if !mechanism.is_fitted() {
            return Err(CausalError::NotFitted);
        }
        Ok(mechanism)
    }
}

fn check_role(graph: &CausalGraph, node: &str, mechanism: &Mechanism) -> Result<()> {
    let is_root = graph.is_root(node)?;
    let mismatch = |reason: &str| CausalError::MechanismMismatch {
        node: node.to_string(),
        reason: reason.to_string(),
    };
    match (is_root, mechanism) {
        (true, Mechanism::AdditiveNoise(_)) => {
            Err(mismatch("root nodes need an unconditional distribution"))
        }
        (false, Mechanism::Empirical(_)) => {
            Err(mismatch("non-root nodes need a functional model of their parents"))
        }
        (false, Mechanism::AdditiveNoise(m)) => {
            let parents = graph.parents_of(node)?.len();
            match m.input_dim() {
                Some(dim) if dim != parents => Err(mismatch(&format!(
                    "fitted model takes {dim} inputs but the node has {parents} parents"
                ))),
                _ => Ok(()),
            }
        }
        (true, Mechanism::Empirical(_)) => Ok(()),
    }
}
