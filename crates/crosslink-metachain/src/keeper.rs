use std::sync::{Arc, Mutex};

use tracing::info;

use crosslink_channel::{OrderedLink, PortId, Side, Timeout};
use crosslink_protocol::{ClaimPacket, PacketCodec, PacketData};
use crosslink_store::{paginate, PageRequest, PageResponse, RecordStore};
use crosslink_types::{validate_creator, AppError, AppResult, StoredMeta};

use crate::commit::ClaimOutcome;
use crate::params::Params;

/// Keeper for the metadata store on chain B.
///
/// Holds typed handles to its store and the packet link, passed at
/// construction. Besides the CRUD/query surface it owns the claim send path
/// and the append-only outcome log filled in by the acknowledgement and
/// timeout handlers.
pub struct MetaKeeper {
    store: Arc<dyn RecordStore<StoredMeta>>,
    link: Arc<OrderedLink>,
    side: Side,
    port: PortId,
    params: Params,
    outcomes: Mutex<Vec<ClaimOutcome>>,
}

impl MetaKeeper {
    pub fn new(
        store: Arc<dyn RecordStore<StoredMeta>>,
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
            outcomes: Mutex::new(Vec::new()),
        }
    }

    /// The port identifier this keeper is bound to.
    pub fn port(&self) -> &PortId {
        &self.port
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Every claim outcome observed so far, oldest first.
    pub fn outcomes(&self) -> Vec<ClaimOutcome> {
        self.outcomes.lock().expect("lock poisoned").clone()
    }

    pub(crate) fn record_outcome(&self, outcome: ClaimOutcome) {
        self.outcomes.lock().expect("lock poisoned").push(outcome);
    }

    pub(crate) fn store(&self) -> &dyn RecordStore<StoredMeta> {
        self.store.as_ref()
    }

    // -----------------------------------------------------------------------
    // CRUD surface
    // -----------------------------------------------------------------------

    /// Insert a new metadata record. Fails if the index is already set.
    pub fn create_meta(
        &self,
        creator: &str,
        index: &str,
        url: &str,
        addresses: Vec<String>,
    ) -> AppResult<()> {
        validate_creator(creator)?;
        if self.store.has(index)? {
            return Err(AppError::AlreadyExists(index.to_string()));
        }
        self.store.set(
            index,
            StoredMeta {
                creator: creator.to_string(),
                index: index.to_string(),
                url: url.to_string(),
                addresses,
            },
        )?;
        info!(index, "metadata created");
        Ok(())
    }

    /// Overwrite an existing record's payload. Only the original creator
    /// may update; the creator field never changes.
    pub fn update_meta(
        &self,
        creator: &str,
        index: &str,
        url: &str,
        addresses: Vec<String>,
    ) -> AppResult<()> {
        validate_creator(creator)?;
        let existing = self.store.get(index)?;
        if existing.creator != creator {
            return Err(AppError::Unauthorized);
        }
        self.store.set(
            index,
            StoredMeta {
                creator: existing.creator,
                index: index.to_string(),
                url: url.to_string(),
                addresses,
            },
        )?;
        Ok(())
    }

    /// Remove a record. Only the original creator may delete.
    pub fn delete_meta(&self, creator: &str, index: &str) -> AppResult<()> {
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

    pub fn get_meta(&self, index: &str) -> AppResult<StoredMeta> {
        Ok(self.store.get(index)?)
    }

    pub fn list_meta(&self, req: &PageRequest) -> AppResult<(Vec<StoredMeta>, PageResponse)> {
        Ok(paginate(self.store.as_ref(), req)?)
    }

    // -----------------------------------------------------------------------
    // Outbound send path
    // -----------------------------------------------------------------------

    /// Build and send a claim packet. The timeout timestamp is absolute;
    /// callers resolve relative timeouts against the counterparty's
    /// consensus timestamp before submitting.
    pub fn send_claim(
        &self,
        creator: &str,
        source_port: &str,
        source_channel: &str,
        url: &str,
        addresses: Vec<String>,
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

        // The creator rides in the packet because the acknowledgement
        // carries no identity of its own.
        let claim = ClaimPacket {
            url: url.to_string(),
            addresses,
            creator: creator.to_string(),
        };
        claim.validate()?;

        let bytes = PacketCodec::encode(&PacketData::Claim(claim))?;
        let sequence = self
            .link
            .send(self.side, bytes, Timeout::at_timestamp(timeout_timestamp_ns))?;
        info!(url, sequence, "claim packet sent");
        Ok(sequence)
    }
}

impl std::fmt::Debug for MetaKeeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaKeeper")
            .field("port", &self.port)
            .finish()
    }
}
