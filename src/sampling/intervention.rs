//! Hard interventions (`do(X = ...)`).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;

use crate::domain::Variable;
use crate::error::{CausalError, Result};
use crate::graph::CausalGraph;

/// Value generator for randomized interventions; called once per row with the
/// intervened node's random stream.
pub type GeneratorFn = Arc<dyn Fn(&mut StdRng) -> f64 + Send + Sync>;

/// What an intervened node is set to.
#[derive(Clone)]
pub enum Intervention {
    Constant(f64),
    Generator(GeneratorFn),
}

impl Intervention {
    pub fn constant(value: f64) -> Self {
        Intervention::Constant(value)
    }

    pub fn generator<F>(f: F) -> Self
    where
        F: Fn(&mut StdRng) -> f64 + Send + Sync + 'static,
    {
        Intervention::Generator(Arc::new(f))
    }

    pub(crate) fn values(&self, n: usize, rng: &mut StdRng) -> Vec<f64> {
        match self {
            Intervention::Constant(v) => vec![*v; n],
            Intervention::Generator(f) => (0..n).map(|_| f(&mut *rng)).collect(),
        }
    }
}

impl fmt::Debug for Intervention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intervention::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Intervention::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// Set of interventions applied during one sampling call.
#[derive(Debug, Clone, Default)]
pub struct InterventionSpec {
    entries: BTreeMap<Variable, Intervention>,
}

impl InterventionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, node: impl Into<Variable>, intervention: Intervention) -> Self {
        self.insert(node, intervention);
        self
    }

    pub fn insert(&mut self, node: impl Into<Variable>, intervention: Intervention) {
        self.entries.insert(node.into(), intervention);
    }

    pub fn get(&self, node: &str) -> Option<&Intervention> {
        self.entries.get(node)
    }

    pub fn contains(&self, node: &str) -> bool {
        self.entries.contains_key(node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Variable> {
        self.entries.keys()
    }

    /// Every intervened node must exist in `graph`.
    pub fn validate(&self, graph: &CausalGraph) -> Result<()> {
        match self.entries.keys().find(|v| !graph.contains(v.as_str())) {
            Some(unknown) => Err(CausalError::UnknownNode(unknown.to_string())),
            None => Ok(()),
        }
    }
}
