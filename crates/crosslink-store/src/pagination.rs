//! Cursor/offset pagination over a [`RecordStore`] walk.
//!
//! Cursor pagination is stable relative to key order: mutations strictly
//! after the cursor's position do not disturb earlier pages. Offset
//! pagination is only consistent for a static snapshot of the store; this is
//! a known limitation of offsets over an ordered map, not a bug.

use serde::{Deserialize, Serialize};

use crosslink_types::Record;

use crate::error::{StoreError, StoreResult};
use crate::traits::{RecordStore, Walk};

/// Page size used when a request leaves `limit` at zero.
pub const DEFAULT_PAGE_LIMIT: u64 = 100;

/// A request for one page of records.
///
/// `cursor` and `offset` are mutually exclusive ways to position the page;
/// supplying both is rejected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Opaque continuation token: the key bytes of the first record of the
    /// requested page, as returned in [`PageResponse::next_cursor`].
    pub cursor: Option<Vec<u8>>,
    /// Number of records to skip from the smallest key.
    pub offset: u64,
    /// Maximum number of records to return; zero means the default limit.
    pub limit: u64,
    /// Whether to also report the total record count.
    pub count_total: bool,
}

impl PageRequest {
    /// A request for the first page with the given limit.
    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// A request continuing from a previously returned cursor.
    pub fn with_cursor(cursor: Vec<u8>, limit: u64) -> Self {
        Self {
            cursor: Some(cursor),
            limit,
            ..Self::default()
        }
    }
}

/// Continuation state returned alongside a page of records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse {
    /// Cursor positioning the next page, or `None` when the walk is
    /// exhausted.
    pub next_cursor: Option<Vec<u8>>,
    /// Total record count, present only when the request asked for it.
    pub total: Option<u64>,
}

/// Produce one page of records in key order.
pub fn paginate<R, S>(store: &S, req: &PageRequest) -> StoreResult<(Vec<R>, PageResponse)>
where
    R: Record,
    S: RecordStore<R> + ?Sized,
{
    if req.cursor.is_some() && req.offset > 0 {
        return Err(StoreError::InvalidPagination(
            "cannot use both cursor and offset".into(),
        ));
    }

    let limit = if req.limit == 0 {
        DEFAULT_PAGE_LIMIT
    } else {
        req.limit
    };

    let start = match &req.cursor {
        Some(bytes) => Some(
            String::from_utf8(bytes.clone())
                .map_err(|_| StoreError::InvalidPagination("cursor is not valid UTF-8".into()))?,
        ),
        None => None,
    };

    let mut to_skip = req.offset;
    let mut records: Vec<R> = Vec::new();
    let mut next_cursor: Option<Vec<u8>> = None;

    store.walk(start.as_deref(), &mut |key, record| {
        if to_skip > 0 {
            to_skip -= 1;
            return Walk::Continue;
        }
        if (records.len() as u64) < limit {
            records.push(record.clone());
            Walk::Continue
        } else {
            // First key past the page boundary becomes the continuation
            // token.
            next_cursor = Some(key.as_bytes().to_vec());
            Walk::Stop
        }
    })?;

    let total = if req.count_total {
        Some(store.len()?)
    } else {
        None
    };

    Ok((records, PageResponse { next_cursor, total }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemStore;
    use crosslink_types::StoredChunk;

    fn chunk(index: &str) -> StoredChunk {
        StoredChunk {
            creator: "cl:00".into(),
            index: index.into(),
            data: Vec::new(),
        }
    }

    fn seeded(n: usize) -> MemStore<StoredChunk> {
        let store = MemStore::new();
        for i in 0..n {
            let idx = format!("key-{i:03}");
            store.set(&idx, chunk(&idx)).unwrap();
        }
        store
    }

    // -----------------------------------------------------------------------
    // Limits and defaults
    // -----------------------------------------------------------------------

    #[test]
    fn zero_limit_uses_default() {
        let store = seeded(3);
        let (page, res) = paginate(&store, &PageRequest::default()).unwrap();
        assert_eq!(page.len(), 3);
        assert!(res.next_cursor.is_none());
    }

    #[test]
    fn limit_bounds_page_size() {
        let store = seeded(5);
        let (page, res) = paginate(&store, &PageRequest::with_limit(2)).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].index, "key-000");
        assert_eq!(res.next_cursor, Some(b"key-002".to_vec()));
    }

    // -----------------------------------------------------------------------
    // Cursor continuation
    // -----------------------------------------------------------------------

    #[test]
    fn cursor_pages_cover_all_records_exactly_once() {
        let store = seeded(7);
        let mut seen = Vec::new();
        let mut req = PageRequest::with_limit(3);
        let mut pages = 0;
        loop {
            let (page, res) = paginate(&store, &req).unwrap();
            pages += 1;
            seen.extend(page.into_iter().map(|r| r.index));
            match res.next_cursor {
                Some(cursor) => req = PageRequest::with_cursor(cursor, 3),
                None => break,
            }
        }
        assert_eq!(pages, 3); // ceil(7 / 3)
        assert_eq!(seen.len(), 7);
        let mut deduped = seen.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), 7);
    }

    #[test]
    fn cursor_is_stable_under_later_inserts() {
        let store = seeded(4);
        let (_, res) = paginate(&store, &PageRequest::with_limit(2)).unwrap();
        let cursor = res.next_cursor.unwrap();

        // Insert after the cursor position; the next page is unaffected by
        // anything before it.
        store.set("key-999", chunk("key-999")).unwrap();

        let (page, _) = paginate(&store, &PageRequest::with_cursor(cursor, 2)).unwrap();
        assert_eq!(page[0].index, "key-002");
        assert_eq!(page[1].index, "key-003");
    }

    // -----------------------------------------------------------------------
    // Offset mode
    // -----------------------------------------------------------------------

    #[test]
    fn offset_pages_cover_all_records() {
        let store = seeded(10);
        let mut seen = Vec::new();
        for page_idx in 0..4 {
            let req = PageRequest {
                offset: page_idx * 3,
                limit: 3,
                ..PageRequest::default()
            };
            let (page, _) = paginate(&store, &req).unwrap();
            seen.extend(page.into_iter().map(|r| r.index));
        }
        assert_eq!(seen.len(), 10);
        let mut deduped = seen;
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), 10);
    }

    #[test]
    fn offset_past_end_returns_empty_page() {
        let store = seeded(2);
        let req = PageRequest {
            offset: 5,
            limit: 3,
            ..PageRequest::default()
        };
        let (page, res) = paginate(&store, &req).unwrap();
        assert!(page.is_empty());
        assert!(res.next_cursor.is_none());
    }

    // -----------------------------------------------------------------------
    // Totals and misuse
    // -----------------------------------------------------------------------

    #[test]
    fn count_total_reports_store_size() {
        let store = seeded(6);
        let req = PageRequest {
            limit: 2,
            count_total: true,
            ..PageRequest::default()
        };
        let (_, res) = paginate(&store, &req).unwrap();
        assert_eq!(res.total, Some(6));
    }

    #[test]
    fn cursor_and_offset_together_are_rejected() {
        let store = seeded(3);
        let req = PageRequest {
            cursor: Some(b"key-001".to_vec()),
            offset: 1,
            limit: 2,
            ..PageRequest::default()
        };
        let err = paginate(&store, &req).unwrap_err();
        assert!(matches!(err, StoreError::InvalidPagination(_)));
    }

    #[test]
    fn non_utf8_cursor_is_rejected() {
        let store = seeded(1);
        let req = PageRequest::with_cursor(vec![0xff, 0xfe], 2);
        let err = paginate(&store, &req).unwrap_err();
        assert!(matches!(err, StoreError::InvalidPagination(_)));
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    proptest::proptest! {
        #[test]
        fn cursor_walk_partitions_any_store(n in 0usize..40, limit in 1u64..7) {
            let store = seeded(n);
            let mut seen = Vec::new();
            let mut req = PageRequest::with_limit(limit);
            loop {
                let (page, res) = paginate(&store, &req).unwrap();
                seen.extend(page.into_iter().map(|r| r.index));
                match res.next_cursor {
                    Some(cursor) => req = PageRequest::with_cursor(cursor, limit),
                    None => break,
                }
            }
            proptest::prop_assert_eq!(seen.len(), n);
            let mut sorted = seen.clone();
            sorted.sort();
            sorted.dedup();
            proptest::prop_assert_eq!(sorted, seen);
        }
    }
}
