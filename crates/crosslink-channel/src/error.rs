use thiserror::Error;

use crosslink_types::AppError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// A port or channel identifier is empty or malformed.
    #[error("invalid {kind} identifier: {value:?}")]
    InvalidIdentifier { kind: &'static str, value: String },

    /// A handler callback reported a failure back to the channel runtime.
    #[error("handler failure: {0}")]
    Handler(String),
}

impl From<AppError> for ChannelError {
    fn from(err: AppError) -> Self {
        ChannelError::Handler(err.to_string())
    }
}

impl From<ChannelError> for AppError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::InvalidIdentifier { .. } => AppError::InvalidRequest(err.to_string()),
            ChannelError::Handler(msg) => AppError::ProtocolViolation(msg),
        }
    }
}

pub type ChannelResult<T> = Result<T, ChannelError>;
