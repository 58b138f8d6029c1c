use serde::{Deserialize, Serialize};

/// Module parameters for the chunk chain.
///
/// Opaque to the protocol core; carried so a deployment can attach
/// governance-managed settings without a schema change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {}
