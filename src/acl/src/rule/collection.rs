use super::{resolve_dyn, Rule, RuleResult};
use crate::role::Role;
use std::sync::Arc;

/// Winning rule of a collection together with its result
#[derive(Debug, Clone, Copy)]
pub struct RuleMatch<'a> {
    pub rule: &'a dyn Rule,
    pub result: RuleResult,
}

/// Ordered rules of a single role
///
/// Insertion order breaks ties between equally specific matches.
#[derive(Debug, Clone, Default)]
pub struct RuleCollection {
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule after all existing ones
    pub fn push(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Rule>> {
        self.rules.iter()
    }

    /// Find the most specific matching rule
    ///
    /// An exact (level 0) match is returned as soon as it is seen. Otherwise the
    /// lowest level wins, and the first inserted rule wins among equal levels.
    pub fn best_match(&self, role: &Role, resource: &str) -> Option<RuleMatch<'_>> {
        let mut best: Option<RuleMatch<'_>> = None;

        for rule in &self.rules {
            let Some(result) = resolve_dyn(rule.as_ref(), role, resource) else {
                continue;
            };

            let candidate = RuleMatch {
                rule: rule.as_ref(),
                result,
            };

            if result.is_exact() {
                return Some(candidate);
            }

            // Strict comparison keeps the earlier rule on ties
            if best.map_or(true, |b| result.level < b.result.level) {
                best = Some(candidate);
            }
        }

        best
    }

    /// [`best_match`](Self::best_match) without the rule
    pub fn best_result(&self, role: &Role, resource: &str) -> Option<RuleResult> {
        self.best_match(role, resource).map(|m| m.result)
    }
}

impl FromIterator<Arc<dyn Rule>> for RuleCollection {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Rule>>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}
