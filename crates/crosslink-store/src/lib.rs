//! Ordered keyed record stores for Crosslink chains.
//!
//! Each chain owns exactly one store instance: the chunk store on chain A
//! and the metadata store on chain B. A store is an ordered map from a
//! string index to a record, with existence check, point get, upsert,
//! delete, and a restartable key-ordered walk that backs the paginated
//! query surface.
//!
//! # Design Rules
//!
//! 1. A store is owned and mutated only by its local chain's keeper.
//! 2. `set` is an unconditional upsert; ownership checks live in the
//!    keepers, not here.
//! 3. `NotFound` is the only recoverable error; everything else aborts the
//!    enclosing operation.
//! 4. Cursor pagination is stable relative to key order; offset pagination
//!    is only consistent for a static snapshot.

pub mod error;
pub mod memory;
pub mod pagination;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemStore;
pub use pagination::{paginate, PageRequest, PageResponse, DEFAULT_PAGE_LIMIT};
pub use traits::{RecordStore, Walk};
