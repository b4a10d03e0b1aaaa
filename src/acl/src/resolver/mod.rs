//! Access resolver
//!
//! Orchestrates the role graph, the per-role rule collections and the
//! evaluators, and memoizes decisions.
//!
//! ```text
//! is_allowed(role, resource)
//!     → [Cache] ── hit ─────────────────────────────→ bool
//!     → rule search over role + ancestors (BFS) ─────┐
//!     → default evaluator search over role + ancestors ┤
//!     → global default evaluator ─────────────────────┘→ [Cache] → bool
//! ```
//!
//! # Concurrency
//!
//! Roles and rules sit behind one read-write lock. Queries hold the read lock
//! for the whole computation, cache write included; mutations and
//! [`AccessResolver::clear_cache`] take the write lock. Evaluators run under
//! the read lock and must not call back into the resolver.

pub mod cache;
pub mod decision;

pub use cache::{CacheStats, DecisionCache};
pub use decision::{Decision, DecisionSource};

use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::role::{Role, RoleGraph};
use crate::rule::{Rule, RuleCollection, RuleMatch};

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Roles and rules, guarded together
#[derive(Debug, Default)]
struct Tables {
    roles: RoleGraph,

    /// Rule collections by role name; a missing entry is an empty collection
    rules: HashMap<String, RuleCollection>,
}

/// How a query was decided (borrowed from the tables)
enum Outcome<'a> {
    Rule {
        owner: &'a Role,
        matched: RuleMatch<'a>,
    },
    RoleDefault {
        owner: &'a Role,
        evaluator: &'a Evaluator,
        allowed: bool,
    },
    GlobalDefault {
        allowed: bool,
    },
}

impl Outcome<'_> {
    fn allowed(&self) -> bool {
        match self {
            Self::Rule { matched, .. } => matched.result.allowed,
            Self::RoleDefault { allowed, .. } | Self::GlobalDefault { allowed } => *allowed,
        }
    }
}

/// Answers "may this role access this resource"
///
/// # Example
///
/// ```rust
/// use rolegate_acl::{AccessResolver, Evaluator, ExactRule};
/// use std::sync::Arc;
///
/// let acl = AccessResolver::new();
/// acl.register_role("user", &[], None).unwrap();
/// acl.register_role("presenter", &[], Some(Evaluator::allow())).unwrap();
/// acl.register_role("admin", &["user", "presenter"], None).unwrap();
/// acl.add_rule("user", Arc::new(ExactRule::new("index.index", Evaluator::allow()))).unwrap();
///
/// assert!(acl.is_allowed("user", "index.index").unwrap());
/// assert!(acl.is_allowed("admin", "default.page").unwrap());
/// assert!(!acl.is_allowed("user", "default.page").unwrap());
/// ```
#[derive(Debug)]
pub struct AccessResolver {
    tables: RwLock<Tables>,

    /// Used when no role in the ancestor closure has a default evaluator
    default_evaluator: Evaluator,

    cache: DecisionCache,
}

impl AccessResolver {
    /// Create a resolver whose global default is `deny`
    pub fn new() -> Self {
        Self::with_default_evaluator(Evaluator::deny())
    }

    /// Create a resolver with a custom global default evaluator
    pub fn with_default_evaluator(default_evaluator: Evaluator) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            default_evaluator,
            cache: DecisionCache::new(),
        }
    }

    pub fn default_evaluator(&self) -> &Evaluator {
        &self.default_evaluator
    }

    /// Add an already constructed role
    ///
    /// Parents must be roles previously returned by this resolver.
    pub fn add_role(&self, role: Role) -> Result<Arc<Role>> {
        let role = self.tables.write().roles.add_role(role)?;
        info!("Registered role '{}'", role.name());
        Ok(role)
    }

    /// Register a role from the names of already registered parents
    ///
    /// # Errors
    ///
    /// - `RoleNotFound` if a parent name is unknown
    /// - `DuplicateRoleName` if `name` is taken
    pub fn register_role(
        &self,
        name: &str,
        parent_names: &[&str],
        default_evaluator: Option<Evaluator>,
    ) -> Result<Arc<Role>> {
        let role = self
            .tables
            .write()
            .roles
            .create_role(name, parent_names, default_evaluator)?;

        info!(
            "Registered role '{}' with parents {:?}",
            role.name(),
            parent_names
        );
        Ok(role)
    }

    /// Append a rule to a role's collection
    ///
    /// Cached decisions are kept; call [`clear_cache`](Self::clear_cache) afterwards.
    pub fn add_rule(&self, role_name: &str, rule: Arc<dyn Rule>) -> Result<()> {
        let mut tables = self.tables.write();
        let role = tables.roles.get_role(role_name)?;

        debug!("Adding rule '{}' to role '{}'", rule.definition(), role.name());
        tables
            .rules
            .entry(role.name().to_string())
            .or_default()
            .push(rule);

        Ok(())
    }

    /// Look up a role by name
    pub fn role(&self, name: &str) -> Result<Arc<Role>> {
        self.tables.read().roles.get_role(name)
    }

    /// Role names in registration order
    pub fn role_names(&self) -> Vec<String> {
        self.tables.read().roles.names()
    }

    /// Rules of a role, in insertion order
    pub fn rules_for(&self, role_name: &str) -> Result<Vec<Arc<dyn Rule>>> {
        let tables = self.tables.read();
        let role = tables.roles.get_role(role_name)?;

        Ok(tables
            .rules
            .get(role.name())
            .map(|rules| rules.iter().cloned().collect())
            .unwrap_or_default())
    }

    /// Decide whether `role_name` may access `resource`
    ///
    /// Decisions are cached per `(role, resource)` until [`clear_cache`](Self::clear_cache).
    ///
    /// # Errors
    ///
    /// `RoleNotFound` if the role is not registered.
    pub fn is_allowed(&self, role_name: &str, resource: &str) -> Result<bool> {
        let tables = self.tables.read();
        let role = tables.roles.get_role(role_name)?;

        if let Some(allowed) = self.cache.get(role.name(), resource) {
            debug!("Cache hit for ({}, {})", role.name(), resource);
            return Ok(allowed);
        }

        let allowed = Self::resolve(&tables, &role, resource, &self.default_evaluator).allowed();
        self.cache.put(role.name(), resource, allowed);

        Ok(allowed)
    }

    /// Compute a decision and report what produced it
    ///
    /// Bypasses the cache in both directions.
    pub fn explain(&self, role_name: &str, resource: &str) -> Result<Decision> {
        let tables = self.tables.read();
        let role = tables.roles.get_role(role_name)?;

        let outcome = Self::resolve(&tables, &role, resource, &self.default_evaluator);
        let allowed = outcome.allowed();

        let (level, source) = match outcome {
            Outcome::Rule { owner, matched } => (
                Some(matched.result.level),
                DecisionSource::Rule {
                    role: owner.name().to_string(),
                    definition: matched.rule.definition().to_string(),
                },
            ),
            Outcome::RoleDefault {
                owner, evaluator, ..
            } => (
                None,
                DecisionSource::RoleDefault {
                    role: owner.name().to_string(),
                    evaluator: evaluator.name().to_string(),
                },
            ),
            Outcome::GlobalDefault { .. } => (
                None,
                DecisionSource::GlobalDefault {
                    evaluator: self.default_evaluator.name().to_string(),
                },
            ),
        };

        Ok(Decision {
            role: role.name().to_string(),
            resource: resource.to_string(),
            allowed,
            level,
            source,
        })
    }

    /// Drop every cached decision
    ///
    /// Waits for in-flight queries so none of them re-populates the cache
    /// with a decision computed before the clear.
    pub fn clear_cache(&self) {
        let _tables = self.tables.write();
        self.cache.clear();
        debug!("Decision cache cleared");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Rule search, then default evaluator search, then the global default
    fn resolve<'a>(
        tables: &'a Tables,
        role: &'a Role,
        resource: &str,
        global_default: &Evaluator,
    ) -> Outcome<'a> {
        if let Some((owner, matched)) = Self::search_best_rule(tables, role, resource) {
            debug!(
                "Role '{}' resource '{}' decided by rule '{}' of '{}' at level {}",
                role.name(),
                resource,
                matched.rule.definition(),
                owner.name(),
                matched.result.level
            );
            return Outcome::Rule { owner, matched };
        }

        let role_default = role
            .ancestors()
            .find_map(|current| current.default_evaluator().map(|e| (current, e)));

        match role_default {
            Some((owner, evaluator)) => {
                let allowed = evaluator.evaluate(role, resource, 0, None);
                debug!(
                    "Role '{}' resource '{}' decided by default evaluator '{}' of '{}'",
                    role.name(),
                    resource,
                    evaluator.name(),
                    owner.name()
                );
                Outcome::RoleDefault {
                    owner,
                    evaluator,
                    allowed,
                }
            }
            None => {
                let allowed = global_default.evaluate(role, resource, 0, None);
                debug!(
                    "Role '{}' resource '{}' decided by global default '{}'",
                    role.name(),
                    resource,
                    global_default.name()
                );
                Outcome::GlobalDefault { allowed }
            }
        }
    }

    /// Best rule over the role and its ancestors, breadth-first
    ///
    /// A level 0 match stops the search. Otherwise the lowest level wins and
    /// the first role visited wins among equal levels.
    fn search_best_rule<'a>(
        tables: &'a Tables,
        role: &'a Role,
        resource: &str,
    ) -> Option<(&'a Role, RuleMatch<'a>)> {
        let mut best: Option<(&'a Role, RuleMatch<'a>)> = None;

        for current in role.ancestors() {
            let Some(rules) = tables.rules.get(current.name()) else {
                continue;
            };
            let Some(matched) = rules.best_match(current, resource) else {
                continue;
            };

            if matched.result.is_exact() {
                return Some((current, matched));
            }

            if best.map_or(true, |(_, b)| matched.result.level < b.result.level) {
                best = Some((current, matched));
            }
        }

        best
    }
}

impl Default for AccessResolver {
    fn default() -> Self {
        Self::new()
    }
}
