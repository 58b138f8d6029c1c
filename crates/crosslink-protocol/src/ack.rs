use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, ProtocolResult};

/// Verdict of chunk verification on chain A.
///
/// `Success` is deliberately empty: a successful verification asserts
/// existence and nothing else. `Failure` names the first missing address
/// (fail-fast, not an aggregate report).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationAck {
    Success,
    Failure { reason: String },
}

/// Channel-level acknowledgement envelope.
///
/// `Result` wraps an encoded application acknowledgement; `Error` carries a
/// failure reason produced by the receiving handler. This mirrors the
/// generic success/error envelope of the underlying channel, so the sender
/// dispatches on the envelope first and only then decodes the payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AckEnvelope {
    Result(Vec<u8>),
    Error(String),
}

impl AckEnvelope {
    /// Wrap a successful verification verdict.
    pub fn success() -> ProtocolResult<Self> {
        let bytes = bincode::serialize(&VerificationAck::Success)
            .map_err(|e| ProtocolError::Serialization(e.to_string()))?;
        Ok(Self::Result(bytes))
    }

    /// Wrap a handler failure.
    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error(reason.into())
    }

    /// Serialize the envelope to opaque ack bytes for the channel.
    pub fn to_bytes(&self) -> ProtocolResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| ProtocolError::Serialization(e.to_string()))
    }

    /// Deserialize an envelope from opaque ack bytes.
    pub fn from_bytes(bytes: &[u8]) -> ProtocolResult<Self> {
        bincode::deserialize(bytes).map_err(|e| ProtocolError::Deserialization(e.to_string()))
    }

    /// Decode the inner [`VerificationAck`] of a `Result` envelope.
    ///
    /// Fails on an `Error` envelope and on result bytes that do not decode;
    /// the caller is expected to have dispatched on the envelope shape
    /// first.
    pub fn decode_result(&self) -> ProtocolResult<VerificationAck> {
        match self {
            Self::Result(bytes) => bincode::deserialize(bytes)
                .map_err(|e| ProtocolError::Deserialization(e.to_string())),
            Self::Error(reason) => Err(ProtocolError::Deserialization(format!(
                "error envelope has no result payload: {reason}"
            ))),
        }
    }
}
