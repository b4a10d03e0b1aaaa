//! Error types for the access-control engine

use thiserror::Error;

/// Access-control engine errors
#[derive(Debug, Error)]
pub enum AclError {
    /// Role name is not registered
    #[error("Role not found: {0}")]
    RoleNotFound(String),

    /// Role name is already registered
    #[error("Duplicate role name: {0}")]
    DuplicateRoleName(String),

    /// No rule factory registered under this tag
    #[error("Unknown rule type: {0}")]
    UnknownRuleType(String),

    /// No evaluator registered under this tag
    #[error("Unknown evaluator: {0}")]
    UnknownEvaluator(String),

    /// Roles whose parents can never be registered first
    #[error("Unable to resolve role dependencies: {0}")]
    CyclicOrUnresolvedDependency(String),

    /// Structurally invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for access-control operations
pub type Result<T> = std::result::Result<T, AclError>;
