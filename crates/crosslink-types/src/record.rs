use serde::{Deserialize, Serialize};

/// A record held by a keyed store.
///
/// `index` is the unique key within the store; `creator` is set at creation
/// and never changes implicitly.
pub trait Record: Clone + Send + Sync + 'static {
    /// The unique key of this record within its store.
    fn index(&self) -> &str;

    /// The identity string of the record's owner.
    fn creator(&self) -> &str;
}

/// A content-addressed data chunk held on chain A.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredChunk {
    pub creator: String,
    /// Content address of the chunk, unique within the chunk store.
    pub index: String,
    pub data: Vec<u8>,
}

impl Record for StoredChunk {
    fn index(&self) -> &str {
        &self.index
    }

    fn creator(&self) -> &str {
        &self.creator
    }
}

/// A metadata record held on chain B, keyed by URL.
///
/// `addresses` keeps the chunk addresses the committed claim carried. The
/// field is explicit so deployments that do not want to persist the list can
/// leave it empty without changing the schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMeta {
    pub creator: String,
    /// Equal to `url`; the URL is the primary key of the metadata store.
    pub index: String,
    pub url: String,
    pub addresses: Vec<String>,
}

impl Record for StoredMeta {
    fn index(&self) -> &str {
        &self.index
    }

    fn creator(&self) -> &str {
        &self.creator
    }
}
