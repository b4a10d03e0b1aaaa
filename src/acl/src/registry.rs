//! Tag lookups for rule types and evaluators
//!
//! External definitions name rule types and evaluators by string tags. The
//! [`Registry`] maps those tags to factories and evaluators, populated at
//! startup, and exposes the operations a configuration loader drives.

use crate::error::{AclError, Result};
use crate::evaluator::Evaluator;
use crate::resolver::AccessResolver;
use crate::role::Role;
use crate::rule::{ExactRule, Rule, WildcardSuffixRule};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds a rule from its definition and evaluator
pub type RuleFactory = Arc<dyn Fn(&str, Evaluator) -> Arc<dyn Rule> + Send + Sync>;

/// Tag tables for rule types and evaluators
#[derive(Clone)]
pub struct Registry {
    rule_factories: HashMap<String, RuleFactory>,
    evaluators: HashMap<String, Evaluator>,
}

impl Registry {
    /// Registry with the built-in rule types and evaluators
    ///
    /// Rule types: `exact` (alias `simple`), `wildcard_suffix` (alias
    /// `wildcardending`). Evaluators: `allow`, `deny`.
    pub fn new() -> Self {
        let mut registry = Self::empty();

        let exact: RuleFactory = Arc::new(exact_rule);
        let wildcard: RuleFactory = Arc::new(wildcard_suffix_rule);

        registry.register_rule_factory("exact", Arc::clone(&exact));
        registry.register_rule_factory("simple", exact);
        registry.register_rule_factory("wildcard_suffix", Arc::clone(&wildcard));
        registry.register_rule_factory("wildcardending", wildcard);

        registry.register_evaluator("allow", Evaluator::allow());
        registry.register_evaluator("deny", Evaluator::deny());

        registry
    }

    /// Registry without any entries
    pub fn empty() -> Self {
        Self {
            rule_factories: HashMap::new(),
            evaluators: HashMap::new(),
        }
    }

    /// Register (or replace) a rule type
    pub fn register_rule_type<F, R>(&mut self, tag: impl Into<String>, factory: F)
    where
        F: Fn(&str, Evaluator) -> R + Send + Sync + 'static,
        R: Rule + 'static,
    {
        self.register_rule_factory(
            tag,
            Arc::new(move |definition: &str, evaluator: Evaluator| -> Arc<dyn Rule> {
                Arc::new(factory(definition, evaluator))
            }),
        );
    }

    /// Register (or replace) a rule type from a ready-made factory
    pub fn register_rule_factory(&mut self, tag: impl Into<String>, factory: RuleFactory) {
        self.rule_factories.insert(tag.into(), factory);
    }

    /// Register (or replace) an evaluator
    pub fn register_evaluator(&mut self, tag: impl Into<String>, evaluator: Evaluator) {
        self.evaluators.insert(tag.into(), evaluator);
    }

    /// Look up an evaluator by tag
    pub fn evaluator(&self, tag: &str) -> Result<Evaluator> {
        self.evaluators
            .get(tag)
            .cloned()
            .ok_or_else(|| AclError::UnknownEvaluator(tag.to_string()))
    }

    pub fn has_rule_type(&self, tag: &str) -> bool {
        self.rule_factories.contains_key(tag)
    }

    /// Build a rule from tags
    ///
    /// # Errors
    ///
    /// `UnknownRuleType` or `UnknownEvaluator` for unregistered tags.
    pub fn build_rule(
        &self,
        definition: &str,
        rule_type: &str,
        evaluator: &str,
    ) -> Result<Arc<dyn Rule>> {
        let factory = self
            .rule_factories
            .get(rule_type)
            .ok_or_else(|| AclError::UnknownRuleType(rule_type.to_string()))?;
        let evaluator = self.evaluator(evaluator)?;

        Ok(factory(definition, evaluator))
    }

    /// Register a role on `resolver`, resolving the default evaluator tag
    pub fn register_role(
        &self,
        resolver: &AccessResolver,
        name: &str,
        parent_names: &[&str],
        default_evaluator: Option<&str>,
    ) -> Result<Arc<Role>> {
        let default_evaluator = default_evaluator
            .map(|tag| self.evaluator(tag))
            .transpose()?;

        resolver.register_role(name, parent_names, default_evaluator)
    }

    /// Build a rule from tags and append it to a role of `resolver`
    pub fn add_rule(
        &self,
        resolver: &AccessResolver,
        role_name: &str,
        definition: &str,
        rule_type: &str,
        evaluator: &str,
    ) -> Result<()> {
        let rule = self.build_rule(definition, rule_type, evaluator)?;
        resolver.add_rule(role_name, rule)
    }
}

fn exact_rule(definition: &str, evaluator: Evaluator) -> Arc<dyn Rule> {
    Arc::new(ExactRule::new(definition, evaluator))
}

fn wildcard_suffix_rule(definition: &str, evaluator: Evaluator) -> Arc<dyn Rule> {
    Arc::new(WildcardSuffixRule::new(definition, evaluator))
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rule_types: Vec<&String> = self.rule_factories.keys().collect();
        rule_types.sort();
        let mut evaluators: Vec<&String> = self.evaluators.keys().collect();
        evaluators.sort();

        f.debug_struct("Registry")
            .field("rule_types", &rule_types)
            .field("evaluators", &evaluators)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::MatchOutcome;

    /// Matches resources by prefix, level = number of extra characters
    #[derive(Debug)]
    struct PrefixRule {
        definition: String,
        evaluator: Evaluator,
    }

    impl Rule for PrefixRule {
        fn definition(&self) -> &str {
            &self.definition
        }

        fn evaluator(&self) -> &Evaluator {
            &self.evaluator
        }

        fn match_resource(&self, resource: &str) -> MatchOutcome {
            match resource.strip_prefix(self.definition.as_str()) {
                Some(rest) => MatchOutcome::Matched { level: rest.len() },
                None => MatchOutcome::NotMatched,
            }
        }
    }

    #[test]
    fn test_builtins() {
        let registry = Registry::new();

        for tag in ["exact", "simple", "wildcard_suffix", "wildcardending"] {
            assert!(registry.has_rule_type(tag), "missing rule type {}", tag);
        }
        assert_eq!(registry.evaluator("allow").unwrap().name(), "allow");
        assert_eq!(registry.evaluator("deny").unwrap().name(), "deny");
    }

    #[test]
    fn test_build_rule() {
        let registry = Registry::new();

        let rule = registry.build_rule("docs.*", "wildcard_suffix", "allow").unwrap();
        assert_eq!(rule.definition(), "docs.*");
        assert_eq!(rule.match_resource("docs.a"), MatchOutcome::Matched { level: 1 });

        let rule = registry.build_rule("docs.*", "simple", "deny").unwrap();
        assert_eq!(rule.match_resource("docs.a"), MatchOutcome::NotMatched);
        assert_eq!(rule.evaluator().name(), "deny");
    }

    #[test]
    fn test_unknown_tags() {
        let registry = Registry::new();

        assert!(matches!(
            registry.build_rule("a", "regex", "allow"),
            Err(AclError::UnknownRuleType(tag)) if tag == "regex"
        ));
        assert!(matches!(
            registry.build_rule("a", "exact", "maybe"),
            Err(AclError::UnknownEvaluator(tag)) if tag == "maybe"
        ));
        assert!(matches!(
            Registry::empty().evaluator("allow"),
            Err(AclError::UnknownEvaluator(_))
        ));
    }

    #[test]
    fn test_custom_rule_type() {
        let mut registry = Registry::new();
        registry.register_rule_type("prefix", |definition, evaluator| PrefixRule {
            definition: definition.to_string(),
            evaluator,
        });

        let rule = registry.build_rule("img/", "prefix", "allow").unwrap();
        assert_eq!(rule.match_resource("img/logo"), MatchOutcome::Matched { level: 4 });
    }

    #[test]
    fn test_external_operations() {
        let registry = Registry::new();
        let acl = AccessResolver::new();

        registry.register_role(&acl, "user", &[], None).unwrap();
        registry
            .register_role(&acl, "presenter", &[], Some("allow"))
            .unwrap();
        registry
            .register_role(&acl, "admin", &["user", "presenter"], None)
            .unwrap();
        registry
            .add_rule(&acl, "user", "index.index", "exact", "allow")
            .unwrap();

        assert!(acl.is_allowed("user", "index.index").unwrap());
        assert!(acl.is_allowed("admin", "default.page").unwrap());

        assert!(matches!(
            registry.register_role(&acl, "guest", &[], Some("maybe")),
            Err(AclError::UnknownEvaluator(_))
        ));
        assert!(matches!(
            registry.register_role(&acl, "user", &[], None),
            Err(AclError::DuplicateRoleName(_))
        ));
        assert!(matches!(
            registry.add_rule(&acl, "ghost", "a", "exact", "allow"),
            Err(AclError::RoleNotFound(_))
        ));
    }
}
