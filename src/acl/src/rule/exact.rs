use super::{MatchOutcome, Rule};
use crate::evaluator::Evaluator;

/// Matches a resource equal to its definition, always at level 0
///
/// Wildcard characters have no meaning here; `"docs.*"` only matches the
/// literal resource `"docs.*"`.
#[derive(Debug, Clone)]
pub struct ExactRule {
    definition: String,
    evaluator: Evaluator,
}

impl ExactRule {
    pub fn new(definition: impl Into<String>, evaluator: Evaluator) -> Self {
        Self {
            definition: definition.into(),
            evaluator,
        }
    }
}

impl Rule for ExactRule {
    fn definition(&self) -> &str {
        &self.definition
    }

    fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    fn match_resource(&self, resource: &str) -> MatchOutcome {
        if self.definition == resource {
            MatchOutcome::Matched { level: 0 }
        } else {
            MatchOutcome::NotMatched
        }
    }
}
