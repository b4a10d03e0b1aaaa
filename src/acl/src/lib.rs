//! # Rolegate Access Control
//!
//! Role-based access-control decision engine: given a role and a resource
//! string, decide whether access is allowed.
//!
//! ## Features
//!
//! - **Role inheritance** with ordered parents and per-role default evaluators
//! - **Specificity-based rule matching** (exact and trailing-wildcard rules)
//! - **Pluggable evaluators** for role- or resource-specific decisions
//! - **Decision cache** shared across threads, cleared explicitly
//! - **TOML configuration** resolved through rule-type and evaluator tags
//!
//! ## Example
//!
//! ```rust
//! use rolegate_acl::{AclConfig, Registry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AclConfig::from_toml_str(r#"
//!     [[roles]]
//!     name = "user"
//!
//!     [[roles]]
//!     name = "editor"
//!     parents = ["user"]
//!
//!     [[rules]]
//!     role = "user"
//!     definition = "docs.*"
//!     type = "wildcard_suffix"
//!     evaluator = "allow"
//!
//!     [[rules]]
//!     role = "editor"
//!     definition = "docs.drafts.*"
//!     type = "wildcard_suffix"
//!     evaluator = "allow"
//! "#)?;
//!
//! let acl = config.build(&Registry::new())?;
//!
//! assert!(acl.is_allowed("editor", "docs.drafts.intro")?);
//! assert!(acl.is_allowed("user", "docs.readme")?);
//! assert!(!acl.is_allowed("user", "admin.panel")?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod evaluator;
pub mod registry;
pub mod resolver;
pub mod role;
pub mod rule;

// Re-export commonly used types
pub use config::{AclConfig, RoleDefinition, RuleDefinition};
pub use error::{AclError, Result};
pub use evaluator::Evaluator;
pub use registry::{Registry, RuleFactory};
pub use resolver::{AccessResolver, CacheStats, Decision, DecisionSource};
pub use role::{Role, RoleGraph};
pub use rule::{
    ExactRule, MatchOutcome, Rule, RuleCollection, RuleMatch, RuleResult, WildcardSuffixRule,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
