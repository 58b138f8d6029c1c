use thiserror::Error;

use crosslink_types::AppError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The claim payload violates its own contract (empty address list,
    /// empty address, or an address that cannot survive the legacy
    /// encoding).
    #[error("invalid claim: {0}")]
    InvalidClaim(String),

    #[error("packet too large: {size} bytes (max {max})")]
    PacketTooLarge { size: usize, max: usize },

    #[error("framing error: {0}")]
    Framing(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl From<ProtocolError> for AppError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::InvalidClaim(msg) => AppError::InvalidRequest(msg),
            other => AppError::Codec(other.to_string()),
        }
    }
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
