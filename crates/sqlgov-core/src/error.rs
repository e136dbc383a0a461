//! Error types for sqlgov-core
//!
//! Centralized error handling using `thiserror` for ergonomic error definitions.
//!
//! Matching itself never fails: malformed rules and candidates degrade to
//! "no match". These errors cover the surfaces around the engine (rule
//! validation, rule files, configuration and injected collaborators).

use thiserror::Error;

/// Main error type for sqlgov-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path to the missing config file
        path: String,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    ConfigValue {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    /// A filter rule failed validation
    #[error("Invalid rule {id}: {reason}")]
    InvalidRule {
        /// Rule identifier
        id: u64,
        /// Why the rule was rejected
        reason: String,
    },

    /// Rule file could not be read or parsed
    #[error("Rule file error for '{path}': {message}")]
    RuleFile {
        /// Path to the rule file
        path: String,
        /// Error message
        message: String,
    },

    /// Rule source (storage collaborator) failed
    #[error("Rule source error: {0}")]
    RuleSource(String),

    /// Fingerprint collaborator rejected a statement
    #[error("Fingerprint error: {0}")]
    Fingerprint(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config value error
    pub fn config_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValue {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create an invalid rule error
    pub fn invalid_rule(id: u64, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            id,
            reason: reason.into(),
        }
    }

    /// Create a rule file error
    pub fn rule_file(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RuleFile {
            path: path.into(),
            message: message.into(),
        }
    }
}
