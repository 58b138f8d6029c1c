//! Shared fixtures for the keeper and acknowledgement tests.

use std::sync::Arc;

use crosslink_channel::{ChannelId, EndpointConfig, OrderedLink, Packet, PortId, Side, Timeout};
use crosslink_protocol::{ClaimPacket, PacketCodec, PacketData};
use crosslink_store::MemStore;
use crosslink_types::AccountId;

use crate::keeper::MetaKeeper;

pub fn owner() -> String {
    AccountId::derive(b"owner").to_string()
}

fn test_link() -> Arc<OrderedLink> {
    Arc::new(OrderedLink::new(
        EndpointConfig {
            port: PortId::new("datastore").unwrap(),
            channel: ChannelId::new("channel-0").unwrap(),
        },
        EndpointConfig {
            port: PortId::new("metastore").unwrap(),
            channel: ChannelId::new("channel-0").unwrap(),
        },
    ))
}

pub fn keeper_with_link() -> (MetaKeeper, Arc<OrderedLink>) {
    let link = test_link();
    let keeper = MetaKeeper::new(
        Arc::new(MemStore::new()),
        Arc::clone(&link),
        Side::B,
        PortId::new("metastore").unwrap(),
    );
    (keeper, link)
}

/// A claim packet as the link would hand it back to the sender's
/// acknowledgement handler.
pub fn claim_packet(url: &str, addresses: &[&str], creator: &str, sequence: u64) -> Packet {
    let claim = ClaimPacket {
        url: url.to_string(),
        addresses: addresses.iter().map(|s| s.to_string()).collect(),
        creator: creator.to_string(),
    };
    Packet {
        sequence,
        source_port: PortId::new("metastore").unwrap(),
        source_channel: ChannelId::new("channel-0").unwrap(),
        dest_port: PortId::new("datastore").unwrap(),
        dest_channel: ChannelId::new("channel-0").unwrap(),
        data: PacketCodec::encode(&PacketData::Claim(claim)).unwrap(),
        timeout: Timeout::at_timestamp(1_000),
    }
}
