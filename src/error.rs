//! Crate-wide error type.
//!
//! Every fallible operation in the library returns [`Result`]. The variants
//! mirror how a failure should be surfaced at the service boundary: store
//! readiness problems are retryable, `NotFound` / `InvalidArgument` are the
//! caller's fault, everything else is an internal failure.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the store accessor, the resolvers, and configuration.
#[derive(Debug, Error)]
pub enum CpgError {
    /// The store file is missing, still being populated, or lacks the
    /// expected tables.
    #[error("graph store not ready at {}: {reason}", path.display())]
    StoreUnavailable { path: PathBuf, reason: String },

    /// A referenced node id does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A required argument was missing or unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl CpgError {
    /// Shorthand for a [`CpgError::StoreUnavailable`].
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// `true` when the caller caused the failure (bad id, bad argument).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::InvalidArgument(_))
    }

    /// `true` when retrying later may succeed without any change by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }
}

impl From<serde_yaml::Error> for CpgError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, CpgError>;
