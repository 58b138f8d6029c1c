//! Claim verification: the receive side of the cross-chain protocol.
//!
//! Chain A receives a claim naming chunk addresses and answers with a
//! verdict. Verification is read-only by design: it queries existence and
//! never writes to the chunk store. The policy is fail-fast: the first
//! missing address decides the verdict and later addresses are never
//! queried.

use tracing::{debug, info, warn};

use crosslink_channel::{ChannelResult, Packet, PacketHandler};
use crosslink_protocol::{AckEnvelope, ClaimPacket, PacketCodec, PacketData};
use crosslink_types::{AppError, AppResult};

use crate::keeper::ChunkKeeper;

impl ChunkKeeper {
    /// Check that every address a claim references exists in the chunk
    /// store.
    ///
    /// An empty address list is rejected before any store access. A store
    /// failure aborts immediately and is distinct from "chunk missing".
    pub fn verify_claim(&self, claim: &ClaimPacket) -> AppResult<()> {
        if claim.addresses.is_empty() {
            return Err(AppError::InvalidRequest(
                "addresses list in packet index cannot be empty".into(),
            ));
        }
        for addr in &claim.addresses {
            if !self.store().has(addr)? {
                warn!(address = %addr, "claim names a missing chunk");
                return Err(AppError::ChunkNotFound(addr.clone()));
            }
            debug!(address = %addr, "chunk verified");
        }
        info!(url = %claim.url, count = claim.addresses.len(), "claim verified");
        Ok(())
    }

    fn handle_recv(&self, packet: &Packet) -> AppResult<AckEnvelope> {
        // Accept the native frame and the legacy comma-joined shape alike;
        // the legacy form never leaves the decoder.
        match PacketCodec::decode_compat(&packet.data)? {
            PacketData::Claim(claim) => {
                self.verify_claim(&claim)?;
                Ok(AckEnvelope::success()?)
            }
            PacketData::Chunk(_) => Err(AppError::InvalidRequest(
                "datastore module does not receive chunk packets".into(),
            )),
        }
    }
}

impl PacketHandler for ChunkKeeper {
    fn on_recv(&self, packet: &Packet) -> AckEnvelope {
        match self.handle_recv(packet) {
            Ok(ack) => ack,
            Err(err) => {
                warn!(sequence = packet.sequence, %err, "claim rejected");
                AckEnvelope::error(err.to_string())
            }
        }
    }

    fn on_acknowledgement(&self, packet: &Packet, ack: &AckEnvelope) -> ChannelResult<()> {
        // Acks for outbound chunk packets carry no state to commit on this
        // chain; the verdict is only logged.
        match ack {
            AckEnvelope::Result(_) => {
                info!(sequence = packet.sequence, "chunk packet acknowledged")
            }
            AckEnvelope::Error(reason) => {
                warn!(sequence = packet.sequence, %reason, "chunk packet rejected by counterparty")
            }
        }
        Ok(())
    }

    fn on_timeout(&self, packet: &Packet) -> ChannelResult<()> {
        // No retry: the sender must resubmit explicitly.
        warn!(sequence = packet.sequence, "chunk packet timed out");
        Ok(())
    }
}
