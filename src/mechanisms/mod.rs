//! Causal mechanisms attached to graph nodes.
//!
//! - root marginals and noise terms (`stochastic`)
//! - additive-noise functional models (`additive_noise`)
//! - regressor plugins (`regressor`)
//!
//! [`Mechanism`] is the closed set of variants the fit and sampling engines
//! dispatch on; [`MechanismRegistry`] owns one mechanism per node.

pub mod additive_noise;
pub mod regressor;
pub mod stochastic;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use additive_noise::*;
pub use regressor::*;
pub use stochastic::*;

use crate::domain::Variable;

/// Discriminant of [`Mechanism`], used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MechanismKind {
    EmpiricalDistribution,
    AdditiveNoiseModel,
}

#[derive(Debug, Clone)]
pub enum Mechanism {
    /// Unconditional model for a root node.
    Empirical(EmpiricalDistribution),
    /// Functional model for a non-root node.
    AdditiveNoise(AdditiveNoiseModel),
}

impl Mechanism {
    pub fn empirical() -> Self {
        Mechanism::Empirical(EmpiricalDistribution::new())
    }

    pub fn additive_noise(regressor: impl Regressor + 'static) -> Self {
        Mechanism::AdditiveNoise(AdditiveNoiseModel::new(Box::new(regressor), NoiseKind::Empirical))
    }

    /// Additive-noise model with a linear regressor and empirical noise.
    pub fn linear() -> Self {
        Mechanism::AdditiveNoise(AdditiveNoiseModel::linear())
    }

    pub fn kind(&self) -> MechanismKind {
        match self {
            Mechanism::Empirical(_) => MechanismKind::EmpiricalDistribution,
            Mechanism::AdditiveNoise(_) => MechanismKind::AdditiveNoiseModel,
        }
    }

    pub fn is_fitted(&self) -> bool {
        match self {
            Mechanism::Empirical(d) => d.is_fitted(),
            Mechanism::AdditiveNoise(m) => m.is_fitted(),
        }
    }

    /// True for mechanisms that take no parent inputs.
    pub fn is_stochastic(&self) -> bool {
        matches!(self, Mechanism::Empirical(_))
    }
}

impl From<AdditiveNoiseModel> for Mechanism {
    fn from(value: AdditiveNoiseModel) -> Self {
        Mechanism::AdditiveNoise(value)
    }
}

impl From<EmpiricalDistribution> for Mechanism {
    fn from(value: EmpiricalDistribution) -> Self {
        Mechanism::Empirical(value)
    }
}

/// Node → mechanism ownership map.
#[derive(Debug, Clone, Default)]
pub struct MechanismRegistry {
    mechanisms: HashMap<Variable, Mechanism>,
}

impl MechanismRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns the previous mechanism.
    pub fn insert(&mut self, node: Variable, mechanism: Mechanism) -> Option<Mechanism> {
        self.mechanisms.insert(node, mechanism)
    }

    pub fn get(&self, node: &str) -> Option<&Mechanism> {
        self.mechanisms.get(node)
    }

    pub fn get_mut(&mut self, node: &str) -> Option<&mut Mechanism> {
        self.mechanisms.get_mut(node)
    }

    pub fn contains(&self, node: &str) -> bool {
        self.mechanisms.contains_key(node)
    }

    pub fn len(&self) -> usize {
        self.mechanisms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mechanisms.is_empty()
    }
}
