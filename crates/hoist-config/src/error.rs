//! Error types for configuration access.

use thiserror::Error;

/// Errors that can occur while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The name matches no configured remote and is not usable as a URL.
    #[error("remote not found: {name}")]
    RemoteNotFound { name: String },

    /// A configuration value could not be interpreted.
    #[error("invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },

    /// A stored refspec or ref name is malformed.
    #[error(transparent)]
    Ref(#[from] hoist_refs::RefError),

    /// A TOML document could not be parsed.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The underlying repository could not be read.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// A lock guarding the store was poisoned.
    #[error("config store lock poisoned: {0}")]
    Poisoned(String),
}

/// Convenience type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
