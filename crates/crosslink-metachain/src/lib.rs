//! Chain B of Crosslink: the metastore module.
//!
//! Owns the metadata store and exposes three surfaces:
//!
//! 1. An authorization-checked CRUD surface plus paginated queries, used by
//!    record owners independently of the packet protocol.
//! 2. The outbound send path for claim packets, which carry the creator
//!    identity alongside the claimed URL and chunk addresses.
//! 3. The verify-then-commit acknowledgement handler: metadata is committed
//!    only when the counterparty's success verdict arrives. Failures,
//!    malformed acknowledgements, and timeouts commit nothing, and every
//!    terminal fate is recorded in the keeper's outcome log.

pub mod commit;
pub mod keeper;
pub mod params;

#[cfg(test)]
pub(crate) mod testing;

pub use commit::ClaimOutcome;
pub use keeper::MetaKeeper;
pub use params::Params;
