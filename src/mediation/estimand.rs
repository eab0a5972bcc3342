//! Mediation estimands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::Variable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Effect of the treatment not transmitted through the mediator.
    NaturalDirectEffect,
    /// Effect of the treatment transmitted through the mediator.
    NaturalIndirectEffect,
}

impl EffectKind {
    pub fn short_name(self) -> &'static str {
        match self {
            EffectKind::NaturalDirectEffect => "NDE",
            EffectKind::NaturalIndirectEffect => "NIE",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Output of identification, input of estimation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectEstimand {
    pub kind: EffectKind,
    pub treatment: Variable,
    pub outcome: Variable,
    pub mediator: Variable,
    /// Pre-treatment adjustment set, in graph order.
    pub confounders: Vec<Variable>,
    /// False when identification failed and was overridden.
    pub identified: bool,
}

impl fmt::Display for EffectEstimand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({} -> {} -> {})",
            self.kind, self.treatment, self.mediator, self.outcome
        )?;
        if !self.confounders.is_empty() {
            let names: Vec<&str> = self.confounders.iter().map(|v| v.as_str()).collect();
            write!(f, " | {}", names.join(", "))?;
        }
        Ok(())
    }
}
