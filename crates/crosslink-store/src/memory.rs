//! In-memory record store for chains, tests, and the CLI demo.
//!
//! [`MemStore`] keeps all records in a `BTreeMap` protected by a `RwLock`,
//! which gives the ascending key order the [`RecordStore`] contract
//! requires. Records are cloned on read.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;

use crosslink_types::Record;

use crate::error::{StoreError, StoreResult};
use crate::traits::{RecordStore, Walk};

/// An in-memory, ordered implementation of [`RecordStore`].
///
/// All data lives in a `BTreeMap` behind a `RwLock`. Data is lost when the
/// store is dropped.
pub struct MemStore<R: Record> {
    records: RwLock<BTreeMap<String, R>>,
}

impl<R: Record> MemStore<R> {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// Remove all records from the store.
    pub fn clear(&self) {
        self.records.write().expect("lock poisoned").clear();
    }

    /// All keys in ascending order.
    pub fn keys(&self) -> Vec<String> {
        let map = self.records.read().expect("lock poisoned");
        map.keys().cloned().collect()
    }
}

impl<R: Record> Default for MemStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> RecordStore<R> for MemStore<R> {
    fn has(&self, key: &str) -> StoreResult<bool> {
        let map = self.records.read().expect("lock poisoned");
        Ok(map.contains_key(key))
    }

    fn get(&self, key: &str) -> StoreResult<R> {
        let map = self.records.read().expect("lock poisoned");
        map.get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn set(&self, key: &str, record: R) -> StoreResult<()> {
        let mut map = self.records.write().expect("lock poisoned");
        map.insert(key.to_string(), record);
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut map = self.records.write().expect("lock poisoned");
        map.remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn walk(
        &self,
        start: Option<&str>,
        visit: &mut dyn FnMut(&str, &R) -> Walk,
    ) -> StoreResult<()> {
        let map = self.records.read().expect("lock poisoned");
        let range = match start {
            Some(s) => map.range::<str, _>((Bound::Included(s), Bound::Unbounded)),
            None => map.range::<str, _>(..),
        };
        for (key, record) in range {
            if visit(key, record) == Walk::Stop {
                break;
            }
        }
        Ok(())
    }

    fn len(&self) -> StoreResult<u64> {
        let map = self.records.read().expect("lock poisoned");
        Ok(map.len() as u64)
    }
}

impl<R: Record> std::fmt::Debug for MemStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.records.read().expect("lock poisoned").len();
        f.debug_struct("MemStore")
            .field("record_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosslink_types::StoredChunk;

    fn chunk(index: &str) -> StoredChunk {
        StoredChunk {
            creator: "cl:00".into(),
            index: index.into(),
            data: index.as_bytes().to_vec(),
        }
    }

    fn seeded(indices: &[&str]) -> MemStore<StoredChunk> {
        let store = MemStore::new();
        for idx in indices {
            store.set(idx, chunk(idx)).unwrap();
        }
        store
    }

    // -----------------------------------------------------------------------
    // Core contract
    // -----------------------------------------------------------------------

    #[test]
    fn set_and_get() {
        let store = seeded(&["a"]);
        let rec = store.get("a").unwrap();
        assert_eq!(rec.index, "a");
    }

    #[test]
    fn get_missing_is_not_found() {
        let store: MemStore<StoredChunk> = MemStore::new();
        let err = store.get("missing").unwrap_err();
        assert_eq!(err, StoreError::NotFound("missing".into()));
    }

    #[test]
    fn has_present_and_absent() {
        let store = seeded(&["a"]);
        assert!(store.has("a").unwrap());
        assert!(!store.has("b").unwrap());
    }

    #[test]
    fn set_is_unconditional_overwrite() {
        let store = seeded(&["a"]);
        let mut replacement = chunk("a");
        replacement.data = vec![9, 9, 9];
        store.set("a", replacement.clone()).unwrap();
        assert_eq!(store.get("a").unwrap(), replacement);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn remove_present_then_absent() {
        let store = seeded(&["a"]);
        store.remove("a").unwrap();
        assert!(!store.has("a").unwrap());
        let err = store.remove("a").unwrap_err();
        assert_eq!(err, StoreError::NotFound("a".into()));
    }

    #[test]
    fn len_and_is_empty() {
        let store: MemStore<StoredChunk> = MemStore::new();
        assert!(store.is_empty().unwrap());
        store.set("a", chunk("a")).unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert!(!store.is_empty().unwrap());
    }

    #[test]
    fn clear_removes_all() {
        let store = seeded(&["a", "b"]);
        store.clear();
        assert!(store.is_empty().unwrap());
    }

    // -----------------------------------------------------------------------
    // Walk ordering
    // -----------------------------------------------------------------------

    #[test]
    fn walk_visits_in_key_order() {
        let store = seeded(&["c", "a", "b"]);
        let mut seen = Vec::new();
        store
            .walk(None, &mut |key, _| {
                seen.push(key.to_string());
                Walk::Continue
            })
            .unwrap();
        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[test]
    fn walk_from_start_key_is_inclusive() {
        let store = seeded(&["a", "b", "c"]);
        let mut seen = Vec::new();
        store
            .walk(Some("b"), &mut |key, _| {
                seen.push(key.to_string());
                Walk::Continue
            })
            .unwrap();
        assert_eq!(seen, vec!["b", "c"]);
    }

    #[test]
    fn walk_stop_halts_visitation() {
        let store = seeded(&["a", "b", "c"]);
        let mut seen = Vec::new();
        store
            .walk(None, &mut |key, _| {
                seen.push(key.to_string());
                Walk::Stop
            })
            .unwrap();
        assert_eq!(seen, vec!["a"]);
    }

    #[test]
    fn walk_restarts_from_arbitrary_key() {
        // The start key does not have to exist; visitation resumes at the
        // next key in order.
        let store = seeded(&["a", "c"]);
        let mut seen = Vec::new();
        store
            .walk(Some("b"), &mut |key, _| {
                seen.push(key.to_string());
                Walk::Continue
            })
            .unwrap();
        assert_eq!(seen, vec!["c"]);
    }

    // -----------------------------------------------------------------------
    // Concurrent read safety
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_reads_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(seeded(&["shared"]));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    assert!(store.has("shared").unwrap());
                    assert_eq!(store.get("shared").unwrap().index, "shared");
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }
    }
}
