//! Shared fixtures for the keeper and verification tests.

use std::sync::{Arc, Mutex};

use crosslink_channel::{ChannelId, EndpointConfig, OrderedLink, PortId, Side};
use crosslink_store::{MemStore, RecordStore, StoreResult, Walk};
use crosslink_types::{AccountId, StoredChunk};

use crate::keeper::ChunkKeeper;

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

pub fn keeper_with_link() -> (ChunkKeeper, Arc<OrderedLink>) {
    let link = test_link();
    let keeper = ChunkKeeper::new(
        Arc::new(MemStore::new()),
        Arc::clone(&link),
        Side::A,
        PortId::new("datastore").unwrap(),
    );
    (keeper, link)
}

/// Store wrapper that records which keys `has` was asked about, to prove
/// fail-fast verification stops querying after the first miss.
pub struct CountingStore {
    inner: MemStore<StoredChunk>,
    has_calls: Mutex<Vec<String>>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: MemStore::new(),
            has_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn has_calls(&self) -> Vec<String> {
        self.has_calls.lock().unwrap().clone()
    }

    pub fn reset_has_calls(&self) {
        self.has_calls.lock().unwrap().clear();
    }
}

impl RecordStore<StoredChunk> for CountingStore {
    fn has(&self, key: &str) -> StoreResult<bool> {
        self.has_calls.lock().unwrap().push(key.to_string());
        self.inner.has(key)
    }

    fn get(&self, key: &str) -> StoreResult<StoredChunk> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, record: StoredChunk) -> StoreResult<()> {
        self.inner.set(key, record)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.inner.remove(key)
    }

    fn walk(
        &self,
        start: Option<&str>,
        visit: &mut dyn FnMut(&str, &StoredChunk) -> Walk,
    ) -> StoreResult<()> {
        self.inner.walk(start, visit)
    }

    fn len(&self) -> StoreResult<u64> {
        self.inner.len()
    }
}

pub fn counting_keeper() -> (ChunkKeeper, Arc<CountingStore>) {
    let store = Arc::new(CountingStore::new());
    let keeper = ChunkKeeper::new(
        Arc::clone(&store) as Arc<dyn RecordStore<StoredChunk>>,
        test_link(),
        Side::A,
        PortId::new("datastore").unwrap(),
    );
    (keeper, store)
}
