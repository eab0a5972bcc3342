//! Counterfactual samples for observed rows.
//!
//! Three steps per row:
//! 1. abduction: reconstruct each node's noise from the observation
//! 2. action: overwrite intervened nodes
//! 3. prediction: recompute descendants with the reconstructed noise

use std::collections::HashMap;

use crate::domain::{DataTable, Variable};
use crate::error::Result;
use crate::fit::compute_noise_from_data;
use crate::mechanisms::Mechanism;
use crate::sampling::intervention::InterventionSpec;
use crate::sampling::sampler::{SamplingOptions, assemble, node_rng, parent_matrix};
use crate::scm::StructuralCausalModel;

/// What each observed row would have looked like under `interventions`.
///
/// `options.seed` only matters for generator interventions.
pub fn counterfactual_samples(
    scm: &StructuralCausalModel,
    interventions: &InterventionSpec,
    observed: &DataTable,
    options: &SamplingOptions,
) -> Result<DataTable> {
    let noise = compute_noise_from_data(scm, observed)?;
    let graph = scm.graph();
    interventions.validate(graph)?;

    let n = observed.n_rows();
    let mut columns: HashMap<Variable, Vec<f64>> = HashMap::new();

    for node in graph.topological_order() {
        let values = match interventions.get(node.as_str()) {
            Some(intervention) => intervention.values(n, &mut node_rng(options.seed, node)),
            None => {
                let eps = noise.require_column(node.as_str())?;
                match scm.fitted_mechanism(node.as_str())? {
                    Mechanism::Empirical(_) => eps.to_vec(),
                    Mechanism::AdditiveNoise(model) => {
                        let x = parent_matrix(&columns, &graph.parents_of(node.as_str())?, n)?;
                        model.evaluate(&x, eps)?.iter().copied().collect()
                    }
                }
            }
        };
        columns.insert(node.clone(), values);
    }

    assemble(scm, columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CausalError;
    use crate::graph::CausalGraph;
    use crate::sampling::Intervention;

    fn fitted() -> (StructuralCausalModel, DataTable) {
        let graph = CausalGraph::from_edges([("X", "Y"), ("Y", "Z")]).unwrap();
        let mut scm = StructuralCausalModel::new(graph);
        scm.assign_default_mechanisms().unwrap();
        let x = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().enumerate().map(|(i, v)| 2.0 * v + [0.3, -0.3, 0.1, -0.1, 0.2, -0.2][i]).collect();
        let z: Vec<f64> = y.iter().enumerate().map(|(i, v)| -v + [0.1, 0.0, -0.1, 0.2, -0.2, 0.0][i]).collect();
        let data = DataTable::from_columns([("X", x), ("Y", y), ("Z", z)]).unwrap();
        scm.fit(&data).unwrap();
        (scm, data)
    }

    #[test]
    fn no_intervention_reproduces_observations() {
        let (scm, data) = fitted();
        let cf = counterfactual_samples(&scm, &InterventionSpec::new(), &data, &SamplingOptions::default())
            .unwrap();
        for name in ["X", "Y", "Z"] {
            for (a, b) in cf.column(name).unwrap().iter().zip(data.column(name).unwrap()) {
                assert!((a - b).abs() < 1e-9, "{name}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn intervention_shifts_descendants_by_fitted_slope() {
        let (scm, data) = fitted();
        let spec = InterventionSpec::new().with("X", Intervention::constant(10.0));
        let cf = counterfactual_samples(&scm, &spec, &data, &SamplingOptions::default()).unwrap();

        let slope = match scm.causal_mechanism("Y").unwrap() {
            Mechanism::AdditiveNoise(m) => {
                let p0 = m.predict(&nalgebra::DMatrix::from_element(1, 1, 0.0)).unwrap()[0];
                let p1 = m.predict(&nalgebra::DMatrix::from_element(1, 1, 1.0)).unwrap()[0];
                p1 - p0
            }
            other => panic!("unexpected mechanism {other:?}"),
        };
        let x_obs = data.column("X").unwrap();
        let y_obs = data.column("Y").unwrap();
        let y_cf = cf.column("Y").unwrap();
        for i in 0..x_obs.len() {
            let expected = y_obs[i] + slope * (10.0 - x_obs[i]);
            assert!((y_cf[i] - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn requires_every_node_column() {
        let (scm, _) = fitted();
        let partial = DataTable::from_columns([("X", vec![1.0]), ("Y", vec![2.0])]).unwrap();
        let err = counterfactual_samples(&scm, &InterventionSpec::new(), &partial, &SamplingOptions::default())
            .unwrap_err();
        assert!(matches!(err, CausalError::MissingColumn(n) if n == "Z"));
    }
}
