use thiserror::Error;

/// Shared error taxonomy for keeper operations on both chains.
///
/// Every variant is returned to the immediate caller or becomes the content
/// of a cross-chain acknowledgement; none of them trigger automatic retries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    /// The caller's identity string does not decode as an account.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A required field is missing, empty, or zero.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Create on an index that is already set.
    #[error("index already set: {0}")]
    AlreadyExists(String),

    /// Get/update/delete on an index that is not set.
    #[error("index not set: {0}")]
    NotFound(String),

    /// The caller is not the owner of the record.
    #[error("incorrect owner")]
    Unauthorized,

    /// Verification failed: the named chunk address is absent on chain A.
    #[error("chunk with index {0} not found")]
    ChunkNotFound(String),

    /// Malformed acknowledgement envelope or payload.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// Fatal failure in the underlying keyed store.
    #[error("store failure: {0}")]
    Store(String),

    /// Wire encoding or decoding failure.
    #[error("codec failure: {0}")]
    Codec(String),
}

/// Result alias for keeper operations.
pub type AppResult<T> = Result<T, AppError>;
