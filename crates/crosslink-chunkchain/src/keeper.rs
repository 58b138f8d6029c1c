use std::sync::Arc;

use tracing::info;

use crosslink_channel::{OrderedLink, PortId, Side, Timeout};
use crosslink_protocol::{ChunkPacket, PacketCodec, PacketData};
use crosslink_store::{paginate, PageRequest, PageResponse, RecordStore};
use crosslink_types::{validate_creator, AppError, AppResult, StoredChunk};

use crate::params::Params;

/// Keeper for the chunk store on chain A.
///
/// Holds typed handles to the store and the packet link it needs, passed at
/// construction; nothing is resolved through ambient state.
pub struct ChunkKeeper {
    store: Arc<dyn RecordStore<StoredChunk>>,
    link: Arc<OrderedLink>,
    side: Side,
    port: PortId,
    params: Params,
}

impl ChunkKeeper {
    pub fn new(
        store: Arc<dyn RecordStore<StoredChunk>>,
        link: Arc<OrderedLink>,
        side: Side,
        port: PortId,
    ) -> Self {
        Self {
            store,
            link,
            side,
            port,
            params: Params::default(),
        }
    }

    /// The port identifier this keeper is bound to.
    pub fn port(&self) -> &PortId {
        &self.port
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub(crate) fn store(&self) -> &dyn RecordStore<StoredChunk> {
        self.store.as_ref()
    }

    // -----------------------------------------------------------------------
    // CRUD surface
    // -----------------------------------------------------------------------

    /// Insert a new chunk. Fails if the index is already set.
    pub fn create_chunk(&self, creator: &str, index: &str, data: Vec<u8>) -> AppResult<()> {
        validate_creator(creator)?;
        if self.store.has(index)? {
            return Err(AppError::AlreadyExists(index.to_string()));
        }
        self.store.set(
            index,
            StoredChunk {
                creator: creator.to_string(),
                index: index.to_string(),
                data,
            },
        )?;
        info!(index, "chunk created");
        Ok(())
    }

    /// Overwrite an existing chunk's data. Only the original creator may
    /// update; the creator field never changes.
    pub fn update_chunk(&self, creator: &str, index: &str, data: Vec<u8>) -> AppResult<()> {
        validate_creator(creator)?;
        let existing = self.store.get(index)?;
        if existing.creator != creator {
            return Err(AppError::Unauthorized);
        }
        self.store.set(
            index,
            StoredChunk {
                creator: existing.creator,
                index: index.to_string(),
                data,
            },
        )?;
        Ok(())
    }

    /// Remove a chunk. Only the original creator may delete.
    pub fn delete_chunk(&self, creator: &str, index: &str) -> AppResult<()> {
        validate_creator(creator)?;
        let existing = self.store.get(index)?;
        if existing.creator != creator {
            return Err(AppError::Unauthorized);
        }
        self.store.remove(index)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Query surface (read-only, no ownership checks)
    // -----------------------------------------------------------------------

    pub fn get_chunk(&self, index: &str) -> AppResult<StoredChunk> {
        Ok(self.store.get(index)?)
    }

    pub fn list_chunks(
        &self,
        req: &PageRequest,
    ) -> AppResult<(Vec<StoredChunk>, PageResponse)> {
        Ok(paginate(self.store.as_ref(), req)?)
    }

    // -----------------------------------------------------------------------
    // Outbound send path
    // -----------------------------------------------------------------------

    /// Send a chunk over the channel. The timeout timestamp is absolute;
    /// callers resolve relative timeouts against the counterparty's
    /// consensus timestamp before submitting.
    pub fn send_chunk(
        &self,
        creator: &str,
        source_port: &str,
        source_channel: &str,
        index: &str,
        data: Vec<u8>,
        timeout_timestamp_ns: u64,
    ) -> AppResult<u64> {
        validate_creator(creator)?;
        if source_port.is_empty() {
            return Err(AppError::InvalidRequest("invalid packet port".into()));
        }
        if source_channel.is_empty() {
            return Err(AppError::InvalidRequest("invalid packet channel".into()));
        }
        if timeout_timestamp_ns == 0 {
            return Err(AppError::InvalidRequest("invalid packet timeout".into()));
        }

        let packet = PacketData::Chunk(ChunkPacket {
            index: index.to_string(),
            data,
        });
        let bytes = PacketCodec::encode(&packet)?;
        let sequence = self
            .link
            .send(self.side, bytes, Timeout::at_timestamp(timeout_timestamp_ns))?;
        info!(index, sequence, "chunk packet sent");
        Ok(sequence)
    }
}

impl std::fmt::Debug for ChunkKeeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkKeeper")
            .field("port", &self.port)
            .finish()
    }
}
