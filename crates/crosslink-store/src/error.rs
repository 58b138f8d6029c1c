use thiserror::Error;

use crosslink_types::AppError;

/// Errors from keyed store operations.
///
/// Anything that is not `NotFound` or a pagination misuse is a fatal
/// internal failure that aborts the enclosing operation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The requested key is not set.
    #[error("key not set: {0}")]
    NotFound(String),

    /// The page request is malformed (e.g. both cursor and offset given).
    #[error("invalid pagination: {0}")]
    InvalidPagination(String),

    /// Fatal failure in the underlying storage backend.
    #[error("internal store failure: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => AppError::NotFound(key),
            StoreError::InvalidPagination(msg) => AppError::InvalidRequest(msg),
            StoreError::Internal(msg) => AppError::Store(msg),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
