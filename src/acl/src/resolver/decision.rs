//! Explained access decisions

use serde::Serialize;
use std::fmt;

/// Where an access decision came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionSource {
    /// A rule of `role` (the queried role or one of its ancestors)
    Rule { role: String, definition: String },

    /// The default evaluator of `role`
    RoleDefault { role: String, evaluator: String },

    /// The resolver's global default evaluator
    GlobalDefault { evaluator: String },
}

impl fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rule { role, definition } => write!(f, "rule '{}' of role '{}'", definition, role),
            Self::RoleDefault { role, evaluator } => {
                write!(f, "default evaluator '{}' of role '{}'", evaluator, role)
            }
            Self::GlobalDefault { evaluator } => write!(f, "global default evaluator '{}'", evaluator),
        }
    }
}

/// Access decision with the data that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// Queried role
    pub role: String,

    /// Queried resource
    pub resource: String,

    /// Whether access is granted
    pub allowed: bool,

    /// Specificity of the deciding rule; `None` for default evaluators
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<usize>,

    pub source: DecisionSource,
}
