//! Error types raised by session stores.

use thiserror::Error;

/// Errors surfaced by `SessionStore` implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("store is rejecting writes")]
    Unavailable,
}

pub type Result<T> = std::result::Result<T, StoreError>;
