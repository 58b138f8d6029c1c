//! The acknowledgement side of the cross-chain protocol.
//!
//! Chain B sent a claim; chain A answered. On a success verdict the keeper
//! commits a metadata record keyed by the claimed URL. On a failure,
//! malformed acknowledgement, or timeout nothing is mutated — but each path
//! is explicit: every terminal fate of a claim lands in the keeper's
//! outcome log, never in a silent no-op.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crosslink_channel::{ChannelResult, Packet, PacketHandler};
use crosslink_protocol::{AckEnvelope, ClaimPacket, PacketCodec, PacketData, VerificationAck};
use crosslink_types::{AppError, AppResult, StoredMeta};

use crate::keeper::MetaKeeper;

/// Terminal fate of one sent claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimOutcome {
    /// Chain A verified every address; the metadata record was committed.
    Committed { url: String, sequence: u64 },
    /// Chain A rejected the claim; nothing was committed.
    Rejected {
        url: String,
        reason: String,
        sequence: u64,
    },
    /// The claim passed its timeout threshold undelivered.
    TimedOut { url: String, sequence: u64 },
}

impl MetaKeeper {
    /// Decode the original claim out of a packet this keeper sent.
    fn sent_claim(&self, packet: &Packet) -> AppResult<ClaimPacket> {
        match PacketCodec::decode_compat(&packet.data)? {
            PacketData::Claim(claim) => Ok(claim),
            PacketData::Chunk(_) => Err(AppError::ProtocolViolation(
                "acknowledged packet is not a claim".into(),
            )),
        }
    }

    /// Dispatch a delivered acknowledgement for a sent claim.
    ///
    /// Commits the metadata record only on a well-formed success verdict.
    /// The upsert is idempotent: redelivering the same success for the same
    /// claim leaves the store in the same state.
    fn handle_ack(&self, packet: &Packet, ack: &AckEnvelope) -> AppResult<()> {
        let claim = self.sent_claim(packet)?;
        match ack {
            AckEnvelope::Error(reason) => {
                warn!(url = %claim.url, sequence = packet.sequence, %reason, "claim rejected by counterparty");
                self.record_outcome(ClaimOutcome::Rejected {
                    url: claim.url,
                    reason: reason.clone(),
                    sequence: packet.sequence,
                });
                Ok(())
            }
            AckEnvelope::Result(_) => {
                let verdict = ack
                    .decode_result()
                    .map_err(|e| AppError::ProtocolViolation(e.to_string()))?;
                match verdict {
                    VerificationAck::Success => {
                        // Creator comes from the original packet; the
                        // acknowledgement carries no identity.
                        self.store().set(
                            &claim.url,
                            StoredMeta {
                                creator: claim.creator.clone(),
                                index: claim.url.clone(),
                                url: claim.url.clone(),
                                addresses: claim.addresses.clone(),
                            },
                        )?;
                        info!(url = %claim.url, sequence = packet.sequence, "metadata committed");
                        self.record_outcome(ClaimOutcome::Committed {
                            url: claim.url,
                            sequence: packet.sequence,
                        });
                        Ok(())
                    }
                    // A success envelope carrying a failure verdict means a
                    // misbehaving peer: failures travel as error envelopes.
                    VerificationAck::Failure { reason } => Err(AppError::ProtocolViolation(
                        format!("failure verdict in success envelope: {reason}"),
                    )),
                }
            }
        }
    }

    fn handle_timeout(&self, packet: &Packet) -> AppResult<()> {
        let claim = self.sent_claim(packet)?;
        warn!(url = %claim.url, sequence = packet.sequence, "claim timed out; resubmit explicitly to retry");
        self.record_outcome(ClaimOutcome::TimedOut {
            url: claim.url,
            sequence: packet.sequence,
        });
        Ok(())
    }
}

impl PacketHandler for MetaKeeper {
    fn on_recv(&self, packet: &Packet) -> AckEnvelope {
        // This chain sends claims; it never receives packets.
        warn!(sequence = packet.sequence, "unexpected inbound packet");
        AckEnvelope::error("metastore module does not receive packets")
    }

    fn on_acknowledgement(&self, packet: &Packet, ack: &AckEnvelope) -> ChannelResult<()> {
        Ok(self.handle_ack(packet, ack)?)
    }

    fn on_timeout(&self, packet: &Packet) -> ChannelResult<()> {
        Ok(self.handle_timeout(packet)?)
    }
}
