//! # Domain Value Objects
//!
//! Immutable value types shared across the state-commit core.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 32-byte hash output used for leaf hashes, tree nodes, and the app hash.
pub type Hash = [u8; 32];

/// The root hash returned to consensus as the commitment to a block's
/// resulting state.
pub type AppHash = Hash;

/// Sentinel hash: all zeros.
///
/// Doubles as the documented empty-tree root (a root tree with no leaf
/// content commits to this value) and as padding for unbalanced levels.
pub const SENTINEL_HASH: Hash = [0u8; 32];

/// The named subsystem stores, one per Merkle leaf.
///
/// The set is closed: every store that contributes to the app hash is listed
/// here, and lookups by name are exhaustively matched. Variant order fixes
/// the leaf index assigned to each store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum StoreName {
    Identity,
    Document,
    DataContract,
    PublicKeyToIdentityId,
}

impl StoreName {
    /// All stores in leaf-index order.
    pub const ALL: [StoreName; 4] = [
        StoreName::Identity,
        StoreName::Document,
        StoreName::DataContract,
        StoreName::PublicKeyToIdentityId,
    ];

    /// The fixed zero-based leaf index of this store in the root tree.
    pub fn leaf_index(&self) -> usize {
        match self {
            StoreName::Identity => 0,
            StoreName::Document => 1,
            StoreName::DataContract => 2,
            StoreName::PublicKeyToIdentityId => 3,
        }
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreName::Identity => "identity",
            StoreName::Document => "document",
            StoreName::DataContract => "dataContract",
            StoreName::PublicKeyToIdentityId => "publicKeyToIdentityId",
        };
        write!(f, "{}", name)
    }
}

/// Configuration for the transaction snapshot store.
///
/// The persistence key is a named configuration value passed into the
/// constructor rather than a module-level global, so tests and multi-chain
/// deployments can namespace their snapshot records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Fixed key under which the snapshot record is persisted.
    pub key: Vec<u8>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            key: b"transactions_snapshot".to_vec(),
        }
    }
}
