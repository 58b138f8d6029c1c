//! Foundation types for Crosslink.
//!
//! This crate provides the identity, record, and error types shared by both
//! chains. Every other Crosslink crate depends on `crosslink-types`.
//!
//! # Key Types
//!
//! - [`AccountId`] — Fallibly-parsed account identity for owners and creators
//! - [`StoredChunk`] — Content-addressed data chunk record (chain A)
//! - [`StoredMeta`] — URL-keyed metadata record (chain B)
//! - [`AppError`] — Shared error taxonomy for keeper operations

pub mod error;
pub mod identity;
pub mod record;

pub use error::{AppError, AppResult};
pub use identity::{validate_creator, AccountId, ACCOUNT_ID_LEN, ACCOUNT_PREFIX};
pub use record::{Record, StoredChunk, StoredMeta};
