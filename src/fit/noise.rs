//! Noise reconstruction for invertible models.
//!
//! For an additive-noise node the noise of a row is `observed - f(parents)`;
//! for a root it is the observed value itself.

use crate::domain::DataTable;
use crate::error::{CausalError, Result};
use crate::mechanisms::Mechanism;
use crate::scm::StructuralCausalModel;

/// Per-row noise for every node, one column per node in graph order.
pub fn compute_noise_from_data(scm: &StructuralCausalModel, observed: &DataTable) -> Result<DataTable> {
    if !scm.is_fitted() {
        return Err(CausalError::NotFitted);
    }
    let graph = scm.graph();
    for node in graph.nodes() {
        observed.require_column(node.as_str())?;
    }

    let mut out = DataTable::new();
    for node in graph.nodes() {
        let values = observed.require_column(node.as_str())?;
        let noise = match scm.fitted_mechanism(node.as_str())? {
            Mechanism::Empirical(_) => values.to_vec(),
            Mechanism::AdditiveNoise(model) => {
                let parents = observed.matrix(&graph.parents_of(node.as_str())?)?;
                model.estimate_noise(values, &parents)?.iter().copied().collect()
            }
        };
        out.push_column(node.clone(), noise)?;
    }
    Ok(out)
}
