//! Error types for transport operations.

use std::time::Duration;

use thiserror::Error;

/// Errors a transport or one of its connections can report.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The endpoint could not be reached or refused the session.
    #[error("unable to access '{url}': {message}")]
    Connect { url: String, message: String },

    /// The remote side failed the push as a whole.
    #[error("remote error: {0}")]
    Remote(String),

    /// A source refspec names nothing locally.
    #[error("src refspec {0} does not match any")]
    NoMatch(String),

    /// A destination could not be turned into a full ref name.
    #[error("unable to push to '{dst}': {reason}")]
    BadDestination { dst: String, reason: String },

    /// A `--force-with-lease` value could not be parsed.
    #[error("invalid --force-with-lease value: {0}")]
    InvalidLease(String),

    /// The transport cannot do what was asked of it.
    #[error("{0} is not supported by this transport")]
    Unsupported(String),

    /// The connection did not finish within its timeout.
    #[error("timed out after {after:?} pushing to '{url}'")]
    Timeout { url: String, after: Duration },

    /// A background task panicked or was cancelled.
    #[error("transport task failed: {0}")]
    Task(String),

    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Ref(#[from] hoist_refs::RefError),
}

/// Convenience type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;
