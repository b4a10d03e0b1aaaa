//! Roles and the role inheritance graph
//!
//! A [`Role`] is immutable once shared: its name, its ordered parents and its
//! optional default evaluator are fixed at construction. The [`RoleGraph`] owns
//! every role of a resolver and enforces unique names.
//!
//! # Example
//!
//! ```rust
//! use rolegate_acl::{Evaluator, RoleGraph};
//!
//! let mut graph = RoleGraph::new();
//! graph.create_role("user", &[], None).unwrap();
//! graph.create_role("presenter", &[], Some(Evaluator::allow())).unwrap();
//! let admin = graph.create_role("admin", &["user", "presenter"], None).unwrap();
//!
//! let order: Vec<&str> = admin.ancestors().map(|r| r.name()).collect();
//! assert_eq!(order, vec!["admin", "user", "presenter"]);
//! ```

use crate::error::{AclError, Result};
use crate::evaluator::Evaluator;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

/// Named principal with ordered parents and an optional fallback evaluator
pub struct Role {
    /// Unique role name
    name: String,

    /// Parent roles, in declared order
    parents: Vec<Arc<Role>>,

    /// Evaluator used when no rule matches anywhere in the ancestor closure
    default_evaluator: Option<Evaluator>,
}

impl Role {
    /// Create a role without parents or default evaluator
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: Vec::new(),
            default_evaluator: None,
        }
    }

    /// Set the parent roles (order is significant)
    pub fn with_parents(mut self, parents: Vec<Arc<Role>>) -> Self {
        self.parents = parents;
        self
    }

    /// Set the default evaluator
    pub fn with_default_evaluator(mut self, evaluator: Evaluator) -> Self {
        self.default_evaluator = Some(evaluator);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parents(&self) -> &[Arc<Role>] {
        &self.parents
    }

    pub fn default_evaluator(&self) -> Option<&Evaluator> {
        self.default_evaluator.as_ref()
    }

    /// Breadth-first walk over this role and its ancestors
    ///
    /// Yields `self` first, then parents in declared order, then grandparents.
    /// A role reachable along several paths is yielded once.
    pub fn ancestors(&self) -> Ancestors<'_> {
        let mut queue = VecDeque::new();
        queue.push_back(self);

        Ancestors {
            queue,
            visited: HashSet::new(),
        }
    }
}

impl fmt::Debug for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parents: Vec<&str> = self.parents.iter().map(|p| p.name()).collect();

        f.debug_struct("Role")
            .field("name", &self.name)
            .field("parents", &parents)
            .field("default_evaluator", &self.default_evaluator)
            .finish()
    }
}

/// Iterator returned by [`Role::ancestors`]
pub struct Ancestors<'a> {
    queue: VecDeque<&'a Role>,
    visited: HashSet<&'a str>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Role;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.queue.pop_front() {
            if !self.visited.insert(current.name()) {
                continue;
            }

            self.queue
                .extend(current.parents().iter().map(|parent| parent.as_ref()));
            return Some(current);
        }

        None
    }
}

/// Owns all roles of a resolver, keyed by unique name
#[derive(Debug, Default)]
pub struct RoleGraph {
    /// Roles by name
    roles: HashMap<String, Arc<Role>>,

    /// Names in registration order
    order: Vec<String>,
}

impl RoleGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an already constructed role
    ///
    /// # Errors
    ///
    /// - `DuplicateRoleName` if the name is taken
    /// - `RoleNotFound` if a parent is not a member of this graph
    pub fn add_role(&mut self, role: Role) -> Result<Arc<Role>> {
        if self.roles.contains_key(role.name()) {
            return Err(AclError::DuplicateRoleName(role.name().to_string()));
        }

        for parent in role.parents() {
            match self.roles.get(parent.name()) {
                Some(member) if Arc::ptr_eq(member, parent) => {}
                _ => return Err(AclError::RoleNotFound(parent.name().to_string())),
            }
        }

        let role = Arc::new(role);
        self.order.push(role.name().to_string());
        self.roles.insert(role.name().to_string(), Arc::clone(&role));

        Ok(role)
    }

    /// Create a role from parent names and add it
    pub fn create_role(
        &mut self,
        name: impl Into<String>,
        parent_names: &[&str],
        default_evaluator: Option<Evaluator>,
    ) -> Result<Arc<Role>> {
        let parents = parent_names
            .iter()
            .map(|parent| self.get_role(parent))
            .collect::<Result<Vec<_>>>()?;

        let mut role = Role::new(name).with_parents(parents);
        if let Some(evaluator) = default_evaluator {
            role = role.with_default_evaluator(evaluator);
        }

        self.add_role(role)
    }

    /// Look up a role by name
    pub fn get_role(&self, name: &str) -> Result<Arc<Role>> {
        self.roles
            .get(name)
            .cloned()
            .ok_or_else(|| AclError::RoleNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.roles.contains_key(name)
    }

    /// Role names in registration order
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
