use crosslink_types::Record;

use crate::error::StoreResult;

/// Whether a [`RecordStore::walk`] visitation should keep going.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Walk {
    Continue,
    Stop,
}

/// Ordered key-value map from a string index to a record.
///
/// All implementations must satisfy these invariants:
/// - Keys are unique; `set` is an unconditional upsert.
/// - `walk` visits records in ascending key order and is restartable from
///   any start key, which is what makes cursor pagination stable relative
///   to key order.
/// - `get` and `remove` of an absent key fail with `NotFound`; every other
///   failure is fatal to the enclosing operation.
pub trait RecordStore<R: Record>: Send + Sync {
    /// Check whether a key is set.
    fn has(&self, key: &str) -> StoreResult<bool>;

    /// Point lookup. Fails with `NotFound` if the key is absent.
    fn get(&self, key: &str) -> StoreResult<R>;

    /// Upsert: insert or unconditionally overwrite the record at `key`.
    fn set(&self, key: &str, record: R) -> StoreResult<()>;

    /// Remove the record at `key`. Fails with `NotFound` if absent.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Visit records in key order, starting at `start` (inclusive) or the
    /// smallest key. The visitor decides whether to continue after each
    /// record.
    fn walk(
        &self,
        start: Option<&str>,
        visit: &mut dyn FnMut(&str, &R) -> Walk,
    ) -> StoreResult<()>;

    /// Number of records currently stored.
    fn len(&self) -> StoreResult<u64>;

    /// Returns `true` if the store holds no records.
    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}
