//! Ordered at-most-once packet channel model for Crosslink.
//!
//! The channel is the only shared resource between the two chains. It
//! offers ordered, at-most-once delivery per channel: acknowledgements come
//! back in the order their packets were sent, and every packet ends in
//! exactly one of {acknowledged, timed out}. No ordering holds across
//! different channels.
//!
//! - [`Packet`] / [`Timeout`] / [`PacketState`] — the wire-level model
//! - [`PacketHandler`] — the callbacks a chain module registers
//! - [`OrderedLink`] — the in-memory relayer used by tests and the CLI demo

pub mod error;
pub mod handler;
pub mod link;
pub mod types;

pub use error::{ChannelError, ChannelResult};
pub use handler::PacketHandler;
pub use link::{EndpointConfig, OrderedLink, RelayEvent, Side};
pub use types::{ChannelId, Height, Packet, PacketState, PortId, Timeout};
