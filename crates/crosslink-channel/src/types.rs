use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ChannelError, ChannelResult};

/// Identifier of a port bound by a chain module.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortId(String);

impl PortId {
    pub fn new(id: impl Into<String>) -> ChannelResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(ChannelError::InvalidIdentifier {
                kind: "port",
                value: id,
            });
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one ordered channel between two ports.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> ChannelResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(ChannelError::InvalidIdentifier {
                kind: "channel",
                value: id,
            });
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Consensus height of a counterparty chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Height {
    pub revision: u64,
    pub height: u64,
}

impl Height {
    pub const fn zero() -> Self {
        Self {
            revision: 0,
            height: 0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.revision == 0 && self.height == 0
    }
}

/// Absolute timeout threshold for a packet.
///
/// Senders resolve a relative timeout into an absolute one exactly once,
/// client-side, by adding the counterparty's current consensus timestamp;
/// the receiving side only ever sees the absolute value. The height field is
/// carried for wire fidelity but senders here always use the zero height,
/// so the in-memory link judges expiry by timestamp alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeout {
    pub height: Height,
    /// Absolute timeout timestamp in nanoseconds. Zero means "no timestamp
    /// timeout" and is rejected by the send paths.
    pub timestamp_ns: u64,
}

impl Timeout {
    /// Timeout at an absolute timestamp with zero height.
    pub const fn at_timestamp(timestamp_ns: u64) -> Self {
        Self {
            height: Height::zero(),
            timestamp_ns,
        }
    }

    /// Whether the threshold has passed at the destination's current
    /// consensus timestamp.
    pub fn has_elapsed(&self, now_ns: u64) -> bool {
        self.timestamp_ns != 0 && now_ns >= self.timestamp_ns
    }
}

/// One packet in flight on an ordered channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    /// Sequence number, monotonically increasing per sending endpoint.
    pub sequence: u64,
    pub source_port: PortId,
    pub source_channel: ChannelId,
    pub dest_port: PortId,
    pub dest_channel: ChannelId,
    /// Opaque payload bytes; the channel never interprets them.
    pub data: Vec<u8>,
    pub timeout: Timeout,
}

/// Lifecycle of a sent packet, tracked by the sending endpoint.
///
/// Terminal states are `Acked` and `TimedOut`; the channel delivers exactly
/// one of {acknowledgement, timeout} per packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketState {
    Sent,
    Received,
    Acked { success: bool },
    TimedOut,
}

impl PacketState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Acked { .. } | Self::TimedOut)
    }
}
