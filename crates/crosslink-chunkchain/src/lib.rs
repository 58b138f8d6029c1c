//! Chain A of Crosslink: the datastore module.
//!
//! Owns the content-addressed chunk store and exposes three surfaces:
//!
//! 1. An authorization-checked CRUD surface plus paginated queries, used by
//!    record owners independently of the packet protocol.
//! 2. The outbound send path for chunk packets.
//! 3. The claim verification handler: on receipt of a claim packet it
//!    checks every referenced address against the chunk store, fail-fast,
//!    and answers with a success or first-failure acknowledgement. It never
//!    mutates state.

pub mod keeper;
pub mod params;
pub mod verify;

#[cfg(test)]
pub(crate) mod testing;

pub use keeper::ChunkKeeper;
pub use params::Params;
