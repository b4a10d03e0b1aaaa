//! Rules match resources and delegate the allow/deny decision to an evaluator
//!
//! Matching never fails with an error: a rule either reports the specificity
//! level of the match or [`MatchOutcome::NotMatched`]. Level 0 is an exact
//! match; larger levels are less specific.
//!
//! # Example
//!
//! ```rust
//! use rolegate_acl::{Evaluator, MatchOutcome, Rule, WildcardSuffixRule};
//!
//! let rule = WildcardSuffixRule::new("foo.bar.foo-bar.*", Evaluator::allow());
//!
//! assert_eq!(rule.match_resource("foo.bar.foo-bar.my.resource"), MatchOutcome::Matched { level: 2 });
//! assert_eq!(rule.match_resource("foo.bar.foo-bar"), MatchOutcome::NotMatched);
//! ```

mod collection;
mod exact;
mod wildcard;

pub use collection::{RuleCollection, RuleMatch};
pub use exact::ExactRule;
pub use wildcard::WildcardSuffixRule;

use crate::evaluator::Evaluator;
use crate::role::Role;
use std::fmt;

/// Separator between resource segments
pub const SEGMENT_DELIMITER: char = '.';

/// Trailing segment that turns a definition into a prefix match
pub const WILDCARD: &str = "*";

/// Outcome of matching a resource against a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The rule applies with the given specificity (0 = exact)
    Matched { level: usize },
    /// The rule does not apply to the resource
    NotMatched,
}

impl MatchOutcome {
    pub fn level(self) -> Option<usize> {
        match self {
            Self::Matched { level } => Some(level),
            Self::NotMatched => None,
        }
    }

    pub fn is_match(self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

/// Decision produced by a matching rule (or a fallback evaluator)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleResult {
    /// Whether access is granted
    pub allowed: bool,

    /// Inverted priority: 0 wins over everything
    pub level: usize,
}

impl RuleResult {
    /// Level reported for decisions made by a default evaluator
    pub const FALLBACK_LEVEL: usize = usize::MAX;

    pub fn new(allowed: bool, level: usize) -> Self {
        Self { allowed, level }
    }

    /// Result of a default evaluator; never preferred over a real match
    pub fn fallback(allowed: bool) -> Self {
        Self::new(allowed, Self::FALLBACK_LEVEL)
    }

    pub fn is_exact(&self) -> bool {
        self.level == 0
    }
}

/// A resource-matching strategy bound to an evaluator
pub trait Rule: fmt::Debug + Send + Sync {
    /// Definition string the rule was built from
    fn definition(&self) -> &str;

    /// Evaluator invoked when the rule matches
    fn evaluator(&self) -> &Evaluator;

    /// Match a resource; must be pure
    fn match_resource(&self, resource: &str) -> MatchOutcome;

    /// Match and, on success, evaluate
    fn resolve(&self, role: &Role, resource: &str) -> Option<RuleResult>
    where
        Self: Sized,
    {
        resolve_dyn(self, role, resource)
    }
}

/// [`Rule::resolve`] for trait objects
pub fn resolve_dyn(rule: &dyn Rule, role: &Role, resource: &str) -> Option<RuleResult> {
    let level = rule.match_resource(resource).level()?;
    let allowed = rule.evaluator().evaluate(role, resource, level, Some(rule));

    Some(RuleResult::new(allowed, level))
}

/// Split a resource or definition into its segments
pub fn split_segments(resource: &str) -> Vec<String> {
    resource
        .split(SEGMENT_DELIMITER)
        .map(str::to_string)
        .collect()
}
