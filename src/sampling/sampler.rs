//! Forward simulation of a fitted structural causal model.
//!
//! Nodes are materialized one column at a time in topological order, so a
//! node only ever reads parent columns that already exist.
//!
//! Randomness: the caller's seed is expanded into one `StdRng` per node
//! (seed mixed with an FNV-1a hash of the node name). Because no two nodes
//! share a stream, roots can be sampled on the rayon pool and the resulting
//! table is bit-identical to the sequential run.

use std::collections::HashMap;

use nalgebra::DMatrix;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{DataTable, Variable};
use crate::error::{CausalError, Result};
use crate::math::{derive_seed, fnv1a};
use crate::mechanisms::Mechanism;
use crate::sampling::intervention::InterventionSpec;
use crate::scm::StructuralCausalModel;

/// Knobs for a sampling call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingOptions {
    pub seed: u64,
    /// Sample non-intervened roots on the rayon pool.
    pub parallel_roots: bool,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            parallel_roots: false,
        }
    }
}

impl SamplingOptions {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

/// Independent random stream for `node` under `seed`.
pub(crate) fn node_rng(seed: u64, node: &Variable) -> StdRng {
    StdRng::seed_from_u64(derive_seed(seed, fnv1a(node.as_str())))
}

/// Stack already-sampled parent columns into a design matrix.
pub(crate) fn parent_matrix(
    columns: &HashMap<Variable, Vec<f64>>,
    parents: &[Variable],
    n: usize,
) -> Result<DMatrix<f64>> {
    let mut cols = Vec::with_capacity(parents.len());
    for parent in parents {
        let col = columns
            .get(parent)
            .ok_or_else(|| CausalError::MissingColumn(parent.to_string()))?;
        cols.push(col.as_slice());
    }
    Ok(DMatrix::from_fn(n, cols.len(), |i, j| cols[j][i]))
}

/// Order `columns` by graph insertion order.
pub(crate) fn assemble(
    scm: &StructuralCausalModel,
    mut columns: HashMap<Variable, Vec<f64>>,
) -> Result<DataTable> {
    let mut table = DataTable::new();
    for node in scm.graph().nodes() {
        let values = columns
            .remove(node)
            .ok_or_else(|| CausalError::MissingColumn(node.to_string()))?;
        table.push_column(node.clone(), values)?;
    }
    Ok(table)
}

/// Observational samples: `n` rows, one column per node.
pub fn draw_samples(scm: &StructuralCausalModel, n: usize, options: &SamplingOptions) -> Result<DataTable> {
    interventional_samples(scm, &InterventionSpec::new(), n, options)
}

/// Samples under hard interventions.
///
/// An intervened node ignores its mechanism and parents entirely; every other
/// node is simulated from its fitted mechanism.
pub fn interventional_samples(
    scm: &StructuralCausalModel,
    interventions: &InterventionSpec,
    n: usize,
    options: &SamplingOptions,
) -> Result<DataTable> {
    if !scm.is_fitted() {
        return Err(CausalError::NotFitted);
    }
    let graph = scm.graph();
    interventions.validate(graph)?;

    let mut roots = Vec::new();
    for node in graph.nodes() {
        if graph.is_root(node.as_str())? && !interventions.contains(node.as_str()) {
            roots.push(node);
        }
    }

    let sample_root = |node: &&Variable| -> Result<(Variable, Vec<f64>)> {
        let mut rng = node_rng(options.seed, node);
        let values = match scm.fitted_mechanism(node.as_str())? {
            Mechanism::Empirical(dist) => dist.sample(n, &mut rng)?,
            Mechanism::AdditiveNoise(_) => {
                return Err(CausalError::MechanismMismatch {
                    node: node.to_string(),
                    reason: "root nodes need an unconditional distribution".to_string(),
                });
            }
        };
        Ok(((*node).clone(), values))
    };
    let root_columns: Vec<(Variable, Vec<f64>)> = if options.parallel_roots {
        roots.par_iter().map(sample_root).collect::<Result<_>>()?
    } else {
        roots.iter().map(sample_root).collect::<Result<_>>()?
    };

    let mut columns: HashMap<Variable, Vec<f64>> = root_columns.into_iter().collect();

    for node in graph.topological_order() {
        if columns.contains_key(node) {
            continue;
        }
        let mut rng = node_rng(options.seed, node);
        let values = match interventions.get(node.as_str()) {
            Some(intervention) => intervention.values(n, &mut rng),
            None => match scm.fitted_mechanism(node.as_str())? {
                Mechanism::Empirical(dist) => dist.sample(n, &mut rng)?,
                Mechanism::AdditiveNoise(model) => {
                    let x = parent_matrix(&columns, &graph.parents_of(node.as_str())?, n)?;
                    model.draw_samples(&x, &mut rng)?.iter().copied().collect()
                }
            },
        };
        columns.insert(node.clone(), values);
    }

    debug!(
        rows = n,
        interventions = interventions.len(),
        seed = options.seed,
        parallel_roots = options.parallel_roots,
        "drew samples"
    );
    assemble(scm, columns)
}
