use crosslink_protocol::AckEnvelope;

use crate::error::ChannelResult;
use crate::types::Packet;

/// Callbacks a chain module registers for one port.
///
/// The channel runtime dispatches each delivered packet to exactly one of
/// these, synchronously; no callback may block or suspend mid-execution.
/// `on_recv` is infallible by contract: an application error must be turned
/// into an [`AckEnvelope::Error`] so the verdict travels back to the sender
/// instead of stalling the channel.
pub trait PacketHandler: Send + Sync {
    /// A packet arrived on this chain. Returns the acknowledgement envelope
    /// to relay back to the sender.
    fn on_recv(&self, packet: &Packet) -> AckEnvelope;

    /// The acknowledgement for a packet this chain sent has been delivered.
    /// Called at most once per packet, never after `on_timeout`.
    fn on_acknowledgement(&self, packet: &Packet, ack: &AckEnvelope) -> ChannelResult<()>;

    /// A packet this chain sent passed its timeout threshold undelivered.
    /// Called at most once per packet, never after `on_acknowledgement`.
    fn on_timeout(&self, packet: &Packet) -> ChannelResult<()>;
}
