//! Error types for refspec handling.

use thiserror::Error;

/// Errors that can occur while parsing refspecs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefError {
    /// The refspec text could not be parsed.
    #[error("invalid refspec '{spec}': {reason}")]
    InvalidRefspec { spec: String, reason: String },
}

/// Convenience type alias for ref operations.
pub type Result<T> = std::result::Result<T, RefError>;
