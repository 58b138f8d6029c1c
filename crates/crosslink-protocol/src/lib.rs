//! Wire protocol for Crosslink.
//!
//! This crate defines the two packet payload shapes exchanged between the
//! chains, the acknowledgement envelope returned to the sender, and the
//! codecs that move them through an opaque byte channel:
//!
//! - [`ClaimPacket`] — "this URL maps to these chunk addresses"
//! - [`ChunkPacket`] — a content address plus its data
//! - [`VerificationAck`] / [`AckEnvelope`] — success or first-failure verdict
//! - [`PacketCodec`] — native framed encoding (`[len][tag][payload]`)
//! - [`LegacyClaim`] — compatibility codec for the historical comma-joined
//!   single-field claim encoding; boundary-only, never the internal form

pub mod ack;
pub mod codec;
pub mod error;
pub mod packet;

pub use ack::{AckEnvelope, VerificationAck};
pub use codec::{LegacyClaim, PacketCodec};
pub use error::{ProtocolError, ProtocolResult};
pub use packet::{ChunkPacket, ClaimPacket, PacketData, MAX_PACKET_SIZE, PROTOCOL_VERSION};
