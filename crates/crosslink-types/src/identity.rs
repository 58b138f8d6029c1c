use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Length of the raw account identifier in bytes.
pub const ACCOUNT_ID_LEN: usize = 20;

/// Display/parse prefix for rendered account identifiers.
pub const ACCOUNT_PREFIX: &str = "cl:";

/// Account identity for record owners and packet creators.
///
/// An `AccountId` is a 20-byte value derived deterministically from seed
/// material with BLAKE3 and rendered as `cl:<40 hex chars>`. It stands in
/// for a full bech32-style address codec: the rest of the system only needs
/// "bytes ↔ string, may fail", and every mutating operation validates the
/// caller's identity string through [`AccountId::from_str`] before touching
/// any store.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId {
    bytes: [u8; ACCOUNT_ID_LEN],
}

impl AccountId {
    /// Derive an `AccountId` from arbitrary seed material.
    pub fn derive(seed: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"crosslink-account-v1:");
        hasher.update(seed);
        let digest = hasher.finalize();
        let mut bytes = [0u8; ACCOUNT_ID_LEN];
        bytes.copy_from_slice(&digest.as_bytes()[..ACCOUNT_ID_LEN]);
        Self { bytes }
    }

    /// Create a random `AccountId` for tests and demos.
    pub fn ephemeral() -> Self {
        let mut seed = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut seed);
        Self::derive(&seed)
    }

    /// The raw 20-byte identifier.
    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LEN] {
        &self.bytes
    }

    /// Create from raw bytes. Use `derive()` for production code.
    pub fn from_raw(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self { bytes }
    }
}

impl FromStr for AccountId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s
            .strip_prefix(ACCOUNT_PREFIX)
            .ok_or_else(|| AppError::InvalidAddress(format!("missing `{ACCOUNT_PREFIX}` prefix: {s}")))?;
        let bytes = hex::decode(hex_part)
            .map_err(|e| AppError::InvalidAddress(format!("invalid hex: {e}")))?;
        if bytes.len() != ACCOUNT_ID_LEN {
            return Err(AppError::InvalidAddress(format!(
                "invalid length: expected {ACCOUNT_ID_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; ACCOUNT_ID_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self { bytes: arr })
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ACCOUNT_PREFIX}{}", hex::encode(self.bytes))
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({ACCOUNT_PREFIX}{})", hex::encode(&self.bytes[..4]))
    }
}

/// Validate that a creator string decodes as a well-formed identity.
///
/// Returns the parsed id so callers can compare owners without re-parsing.
pub fn validate_creator(creator: &str) -> Result<AccountId, AppError> {
    creator.parse()
}
