//! Error types raised by repository implementations.

use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository lock was poisoned")]
    LockPoisoned,

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("storage backend failed: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
