//! Configuration loading
//!
//! Roles, rules and the global default evaluator can be described in TOML and
//! applied to an [`AccessResolver`] through a [`Registry`]:
//!
//! ```toml
//! [global]
//! evaluator = "deny"
//!
//! [[roles]]
//! name = "user"
//!
//! [[roles]]
//! name = "presenter"
//! default_evaluator = "allow"
//!
//! [[roles]]
//! name = "admin"
//! parents = ["user", "presenter"]
//!
//! [[rules]]
//! role = "user"
//! definition = "index.index"
//! type = "exact"
//! evaluator = "allow"
//! ```
//!
//! Roles may be listed in any order; they are registered parents first.
//! Rules keep their file order per role.

use crate::error::{AclError, Result};
use crate::registry::Registry;
use crate::resolver::AccessResolver;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use tracing::info;

/// Complete access-control configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AclConfig {
    #[serde(default)]
    pub global: GlobalSection,

    #[serde(default)]
    pub roles: Vec<RoleDefinition>,

    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalSection {
    /// Global default evaluator tag (`deny` when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluator: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoleDefinition {
    pub name: String,

    /// Parent role names, in order
    #[serde(default)]
    pub parents: Vec<String>,

    /// Default evaluator tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_evaluator: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDefinition {
    /// Owning role name
    pub role: String,

    pub definition: String,

    /// Rule type tag
    #[serde(rename = "type")]
    pub rule_type: String,

    /// Evaluator tag
    pub evaluator: String,
}

impl AclConfig {
    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&source)?;

        info!(
            "Loaded {} roles and {} rules from {:?}",
            config.roles.len(),
            config.rules.len(),
            path.as_ref()
        );
        Ok(config)
    }

    /// Check that every tag resolves in `registry`
    pub fn validate(&self, registry: &Registry) -> Result<()> {
        if let Some(tag) = &self.global.evaluator {
            registry.evaluator(tag)?;
        }

        for role in &self.roles {
            if role.name.trim().is_empty() {
                return Err(AclError::InvalidConfig("role name cannot be empty".to_string()));
            }
            if let Some(tag) = &role.default_evaluator {
                registry.evaluator(tag)?;
            }
        }

        for rule in &self.rules {
            if !registry.has_rule_type(&rule.rule_type) {
                return Err(AclError::UnknownRuleType(rule.rule_type.clone()));
            }
            registry.evaluator(&rule.evaluator)?;
        }

        Ok(())
    }

    /// Role definitions ordered so that every parent precedes its children
    ///
    /// Independent roles keep their declaration order.
    ///
    /// # Errors
    ///
    /// - `DuplicateRoleName` if a name is declared twice
    /// - `CyclicOrUnresolvedDependency` naming the roles that can never be
    ///   registered (cycle, or a parent that is not defined)
    pub fn role_order(&self) -> Result<Vec<&RoleDefinition>> {
        self.role_order_with(|_| false)
    }

    /// Like [`role_order`](Self::role_order), treating names accepted by
    /// `registered` as already available parents
    ///
    /// A declared name accepted by `registered` is a duplicate.
    fn role_order_with(&self, registered: impl Fn(&str) -> bool) -> Result<Vec<&RoleDefinition>> {
        // Names must be unique for the per-declaration in-degrees below
        let mut declared: HashSet<&str> = HashSet::with_capacity(self.roles.len());
        for role in &self.roles {
            if !declared.insert(role.name.as_str()) || registered(&role.name) {
                return Err(AclError::DuplicateRoleName(role.name.clone()));
            }
        }

        // Kahn's algorithm over parent -> child edges
        let mut in_degree: Vec<usize> = vec![0; self.roles.len()];
        let mut children: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut unresolved = false;

        for (idx, role) in self.roles.iter().enumerate() {
            for parent in &role.parents {
                if declared.contains(parent.as_str()) {
                    in_degree[idx] += 1;
                    children.entry(parent.as_str()).or_default().push(idx);
                } else if !registered(parent.as_str()) {
                    unresolved = true;
                    // Never becomes ready
                    in_degree[idx] += 1;
                }
            }
        }

        let mut queue: VecDeque<usize> = (0..self.roles.len())
            .filter(|&idx| in_degree[idx] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.roles.len());

        while let Some(idx) = queue.pop_front() {
            let role = &self.roles[idx];
            order.push(role);

            if let Some(dependents) = children.get(role.name.as_str()) {
                for &child in dependents {
                    in_degree[child] -= 1;
                    if in_degree[child] == 0 {
                        queue.push_back(child);
                    }
                }
            }
        }

        if order.len() != self.roles.len() {
            let stuck: Vec<&str> = self
                .roles
                .iter()
                .zip(&in_degree)
                .filter(|(_, degree)| **degree > 0)
                .map(|(role, _)| role.name.as_str())
                .collect();

            let reason = if unresolved { "unresolved parent or cycle" } else { "cycle" };
            return Err(AclError::CyclicOrUnresolvedDependency(format!(
                "{} ({})",
                stuck.join(", "),
                reason
            )));
        }

        Ok(order)
    }

    /// Register roles and rules on an existing resolver
    ///
    /// Parents and rule owners may refer to roles already registered on
    /// `resolver`. Tags, names and role references are all checked before the
    /// resolver is touched. The decision cache is cleared afterwards, also when
    /// registration fails.
    pub fn apply(&self, resolver: &AccessResolver, registry: &Registry) -> Result<()> {
        self.validate(registry)?;

        let existing: HashSet<String> = resolver.role_names().into_iter().collect();
        let order = self.role_order_with(|name| existing.contains(name))?;

        if let Some(rule) = self.rules.iter().find(|rule| {
            !existing.contains(&rule.role) && !self.roles.iter().any(|role| role.name == rule.role)
        }) {
            return Err(AclError::RoleNotFound(rule.role.clone()));
        }

        let result = self.register(resolver, registry, order);
        resolver.clear_cache();
        result?;

        info!(
            "Applied configuration: {} roles, {} rules",
            self.roles.len(),
            self.rules.len()
        );
        Ok(())
    }

    fn register(
        &self,
        resolver: &AccessResolver,
        registry: &Registry,
        order: Vec<&RoleDefinition>,
    ) -> Result<()> {
        for role in order {
            let parents: Vec<&str> = role.parents.iter().map(String::as_str).collect();
            registry.register_role(
                resolver,
                &role.name,
                &parents,
                role.default_evaluator.as_deref(),
            )?;
        }

        for rule in &self.rules {
            registry.add_rule(
                resolver,
                &rule.role,
                &rule.definition,
                &rule.rule_type,
                &rule.evaluator,
            )?;
        }

        Ok(())
    }

    /// Create a new resolver from this configuration
    pub fn build(&self, registry: &Registry) -> Result<AccessResolver> {
        let resolver = match &self.global.evaluator {
            Some(tag) => AccessResolver::with_default_evaluator(registry.evaluator(tag)?),
            None => AccessResolver::new(),
        };

        self.apply(&resolver, registry)?;
        Ok(resolver)
    }
}
