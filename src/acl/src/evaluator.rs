//! Evaluators turn a successful match (or a fallback) into allow/deny.

use crate::role::Role;
use crate::rule::Rule;
use std::fmt;
use std::sync::Arc;

/// Signature shared by every evaluator: `(role, resource, level, matched_rule) -> allowed`
pub type EvaluatorFn = dyn Fn(&Role, &str, usize, Option<&dyn Rule>) -> bool + Send + Sync;

/// Named, stateless decision function
///
/// Cloning is cheap; clones share the same function.
#[derive(Clone)]
pub struct Evaluator {
    name: Arc<str>,
    func: Arc<EvaluatorFn>,
}

impl Evaluator {
    /// Wrap a closure under a name used for logging and `Debug`
    pub fn new<F>(name: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&Role, &str, usize, Option<&dyn Rule>) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Always grants access
    pub fn allow() -> Self {
        Self::new("allow", |_, _, _, _| true)
    }

    /// Always refuses access
    pub fn deny() -> Self {
        Self::new("deny", |_, _, _, _| false)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the evaluator
    ///
    /// `rule` is `None` when the evaluator is used as a default (no rule matched).
    pub fn evaluate(
        &self,
        role: &Role,
        resource: &str,
        level: usize,
        rule: Option<&dyn Rule>,
    ) -> bool {
        (self.func)(role, resource, level, rule)
    }

    /// True if both handles share the same function
    pub fn ptr_eq(&self, other: &Evaluator) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Evaluator").field(&self.name).finish()
    }
}
