use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, ProtocolResult};
use crate::packet::{ClaimPacket, PacketData, MAX_PACKET_SIZE};

/// Codec for the native framed packet encoding.
pub struct PacketCodec;

impl PacketCodec {
    /// Encode a packet with framing: [4 bytes len][1 byte tag][payload].
    pub fn encode(data: &PacketData) -> ProtocolResult<Vec<u8>> {
        let payload = bincode::serialize(data)
            .map_err(|e| ProtocolError::Serialization(e.to_string()))?;
        if payload.len() > MAX_PACKET_SIZE {
            return Err(ProtocolError::PacketTooLarge {
                size: payload.len(),
                max: MAX_PACKET_SIZE,
            });
        }
        let len = (payload.len() + 1) as u32;
        let mut buf = Vec::with_capacity(4 + 1 + payload.len());
        buf.extend_from_slice(&len.to_be_bytes());
        buf.push(data.type_tag());
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    /// Decode a framed packet. Returns (packet, bytes consumed).
    pub fn decode(data: &[u8]) -> ProtocolResult<(PacketData, usize)> {
        if data.len() < 5 {
            return Err(ProtocolError::Framing("too short".into()));
        }
        let len = u32::from_be_bytes(data[0..4].try_into().unwrap()) as usize;
        if len < 1 {
            return Err(ProtocolError::Framing("zero-length frame".into()));
        }
        if len - 1 > MAX_PACKET_SIZE {
            return Err(ProtocolError::PacketTooLarge {
                size: len - 1,
                max: MAX_PACKET_SIZE,
            });
        }
        let total = 4 + len;
        if data.len() < total {
            return Err(ProtocolError::Framing(format!(
                "incomplete: have {}, need {}",
                data.len(),
                total
            )));
        }
        let payload = &data[5..total];
        let packet: PacketData = bincode::deserialize(payload)
            .map_err(|e| ProtocolError::Deserialization(e.to_string()))?;
        if packet.type_tag() != data[4] {
            return Err(ProtocolError::Framing(format!(
                "tag mismatch: frame says {}, payload is {}",
                data[4],
                packet.type_tag()
            )));
        }
        Ok((packet, total))
    }

    /// Decode wire bytes, accepting both the native framed encoding and the
    /// legacy claim shape.
    ///
    /// The legacy fallback keeps old senders working; whatever arrives is
    /// surfaced as the native [`PacketData`] so nothing downstream ever
    /// handles the legacy form.
    pub fn decode_compat(data: &[u8]) -> ProtocolResult<PacketData> {
        match Self::decode(data) {
            Ok((packet, _)) => Ok(packet),
            Err(_) => {
                let legacy: LegacyClaim = bincode::deserialize(data)
                    .map_err(|e| ProtocolError::Deserialization(e.to_string()))?;
                Ok(PacketData::Claim(legacy.into_claim()?))
            }
        }
    }
}

/// The legacy claim wire shape.
///
/// Historically the claim rode in a chunk-shaped packet: the address list
/// packed into the single `index` field joined by commas, and the remaining
/// claim fields serialized into the free-form `data` field. This form
/// exists only at the wire boundary; decode it immediately into a
/// [`ClaimPacket`] and never use it as the internal representation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyClaim {
    /// Comma-joined chunk addresses.
    pub index: String,
    /// Encoded remainder of the claim (url and creator).
    pub data: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct LegacyClaimBody {
    url: String,
    creator: String,
}

impl LegacyClaim {
    /// Encode a claim into the legacy shape.
    pub fn from_claim(claim: &ClaimPacket) -> ProtocolResult<Self> {
        claim.validate()?;
        let body = LegacyClaimBody {
            url: claim.url.clone(),
            creator: claim.creator.clone(),
        };
        let data = bincode::serialize(&body)
            .map_err(|e| ProtocolError::Serialization(e.to_string()))?;
        Ok(Self {
            index: claim.addresses.join(","),
            data,
        })
    }

    /// Decode the legacy shape back into a claim.
    ///
    /// An empty `index` yields an empty address list; the caller's
    /// validation rejects it before any store access.
    pub fn into_claim(self) -> ProtocolResult<ClaimPacket> {
        let addresses: Vec<String> = if self.index.is_empty() {
            Vec::new()
        } else {
            self.index.split(',').map(String::from).collect()
        };
        let body: LegacyClaimBody = bincode::deserialize(&self.data)
            .map_err(|e| ProtocolError::Deserialization(e.to_string()))?;
        Ok(ClaimPacket {
            url: body.url,
            addresses,
            creator: body.creator,
        })
    }
}
