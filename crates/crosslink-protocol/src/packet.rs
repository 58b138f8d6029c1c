use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, ProtocolResult};

pub const PROTOCOL_VERSION: u32 = 1;
pub const MAX_PACKET_SIZE: usize = 4 * 1024 * 1024;

/// A cross-chain claim: "this URL maps to these chunk addresses".
///
/// Chain B sends this to chain A, which verifies that every referenced
/// address exists in its chunk store. The address list is a genuine
/// repeated field here; the comma-joined single-string form survives only
/// in [`LegacyClaim`](crate::codec::LegacyClaim) for wire compatibility.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimPacket {
    pub url: String,
    /// Chunk addresses the URL is claimed to map to. Never empty in a valid
    /// claim.
    pub addresses: Vec<String>,
    /// Identity string of the claim's issuer. Carried in the packet because
    /// the acknowledgement carries no identity of its own.
    pub creator: String,
}

impl ClaimPacket {
    /// Check the claim's own contract before it is encoded or acted on.
    ///
    /// Addresses containing `,` are rejected because they cannot round-trip
    /// the legacy comma-joined encoding.
    pub fn validate(&self) -> ProtocolResult<()> {
        if self.addresses.is_empty() {
            return Err(ProtocolError::InvalidClaim(
                "addresses list cannot be empty".into(),
            ));
        }
        for addr in &self.addresses {
            if addr.is_empty() {
                return Err(ProtocolError::InvalidClaim("empty address".into()));
            }
            if addr.contains(',') {
                return Err(ProtocolError::InvalidClaim(format!(
                    "address contains ',': {addr}"
                )));
            }
        }
        Ok(())
    }
}

/// An outbound chunk transfer: a content address plus its data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPacket {
    pub index: String,
    pub data: Vec<u8>,
}

/// All packet payload shapes carried over a Crosslink channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketData {
    Claim(ClaimPacket),
    Chunk(ChunkPacket),
}

impl PacketData {
    pub fn type_tag(&self) -> u8 {
        match self {
            Self::Claim(_) => 1,
            Self::Chunk(_) => 2,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Claim(_) => "Claim",
            Self::Chunk(_) => "Chunk",
        }
    }
}
