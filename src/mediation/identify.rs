//! Graphical identification of natural direct / indirect effects.
//!
//! Rules:
//! 1. The treatment must reach the outcome along a directed path.
//! 2. Exactly one node (the mediator) may lie strictly inside directed
//!    treatment → outcome paths, and it must be a child of the treatment and a
//!    parent of the outcome. A direct treatment → outcome edge is allowed.
//! 3. The adjustment set is every parent of treatment, mediator or outcome
//!    (other than treatment and mediator). None of them may be a descendant of
//!    the treatment; such a node confounds mediator and outcome while being
//!    affected by treatment, which rules out natural effects.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::Variable;
use crate::error::{CausalError, Result};
use crate::graph::CausalGraph;
use crate::mediation::estimand::{EffectEstimand, EffectKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifyOptions {
    /// Return an estimand even when the graph fails the checks above, as long
    /// as a mediator can be named.
    pub proceed_when_unidentifiable: bool,
    /// Use this mediator instead of the one discovered from the graph.
    pub mediator: Option<Variable>,
}

pub fn identify_effect(
    graph: &CausalGraph,
    kind: EffectKind,
    treatment: &str,
    outcome: &str,
    options: &IdentifyOptions,
) -> Result<EffectEstimand> {
    for node in [treatment, outcome] {
        if !graph.contains(node) {
            return Err(CausalError::UnknownNode(node.to_string()));
        }
    }
    if let Some(m) = &options.mediator {
        if !graph.contains(m.as_str()) {
            return Err(CausalError::UnknownNode(m.to_string()));
        }
    }
    if treatment == outcome {
        return Err(CausalError::invalid("Treatment and outcome must differ."));
    }

    let mut problems: Vec<String> = Vec::new();

    if !graph.has_directed_path(treatment, outcome)? {
        problems.push(format!("no directed path from {treatment} to {outcome}"));
    }

    let mut candidates = Vec::new();
    for node in graph.nodes() {
        let name = node.as_str();
        if name == treatment || name == outcome {
            continue;
        }
        if graph.has_directed_path(treatment, name)? && graph.has_directed_path(name, outcome)? {
            candidates.push(node.clone());
        }
    }

    let Some(mediator) = options.mediator.clone().or_else(|| candidates.first().cloned()) else {
        return Err(CausalError::NonIdentifiable(format!(
            "no mediator between {treatment} and {outcome}"
        )));
    };

    if candidates.len() != 1 || candidates[0] != mediator {
        let names: Vec<&str> = candidates.iter().map(|v| v.as_str()).collect();
        problems.push(format!(
            "expected {mediator} to be the only mediator, found [{}]",
            names.join(", ")
        ));
    }
    if !graph.has_edge(treatment, mediator.as_str()) {
        problems.push(format!("missing edge {treatment} -> {mediator}"));
    }
    if !graph.has_edge(mediator.as_str(), outcome) {
        problems.push(format!("missing edge {mediator} -> {outcome}"));
    }

    let mut parent_union: Vec<Variable> = Vec::new();
    for node in [treatment, mediator.as_str(), outcome] {
        parent_union.extend(graph.parents_of(node)?);
    }
    let descendants = graph.descendants_of(treatment)?;
    let mut confounders = Vec::new();
    for node in graph.nodes() {
        if node.as_str() == treatment || *node == mediator || !parent_union.contains(node) {
            continue;
        }
        if descendants.contains(node) {
            problems.push(format!("{node} is affected by {treatment} and confounds the mediator or outcome"));
            continue;
        }
        confounders.push(node.clone());
    }

    let identified = problems.is_empty();
    if !identified {
        let reason = problems.join("; ");
        if !options.proceed_when_unidentifiable {
            return Err(CausalError::NonIdentifiable(reason));
        }
        warn!(
            effect = %kind,
            treatment,
            outcome,
            reason = %reason,
            "proceeding with an unidentifiable estimand"
        );
    }

    let estimand = EffectEstimand {
        kind,
        treatment: Variable::from(treatment),
        outcome: Variable::from(outcome),
        mediator,
        confounders,
        identified,
    };
    debug!(estimand = %estimand, identified, "identified effect");
    Ok(estimand)
}
