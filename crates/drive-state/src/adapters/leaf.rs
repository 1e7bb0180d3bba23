//! # Key-Value Store Leaf
//!
//! [`StoreLeaf`] over a plain key-value backend: the leaf hash covers the
//! store's full committed content in key order, and the store proof is a
//! serialized inclusion record for the requested keys.

use crate::domain::errors::BackendError;
use crate::domain::hash::hash_entries;
use crate::domain::value_objects::{Hash, StoreName};
use crate::ports::outbound::{StoreBackend, StoreLeaf};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Store-level proof payload produced by [`KeyValueLeaf::prove_keys`].
///
/// Opaque to the root tree; decoded only by verifiers that understand this
/// store layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueStoreProof {
    /// Hash of the store's full committed content.
    pub leaf_hash: Hash,
    /// Requested keys with their committed values, `None` for absent keys.
    pub entries: Vec<(Vec<u8>, Option<Vec<u8>>)>,
}

/// A named store's leaf over its committed key-value backend.
pub struct KeyValueLeaf {
    name: StoreName,
    backend: Arc<dyn StoreBackend>,
}

impl KeyValueLeaf {
    /// The leaf index comes from the store name's fixed position.
    pub fn new(name: StoreName, backend: Arc<dyn StoreBackend>) -> Self {
        Self { name, backend }
    }

    fn sorted_content(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>, BackendError> {
        let mut entries = self.backend.prefix_scan(b"")?;
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(entries)
    }
}

impl StoreLeaf for KeyValueLeaf {
    fn name(&self) -> StoreName {
        self.name
    }

    fn index(&self) -> usize {
        self.name.leaf_index()
    }

    fn leaf_hash(&self) -> Result<Hash, BackendError> {
        let entries = self.sorted_content()?;
        Ok(hash_entries(
            entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice())),
        ))
    }

    fn prove_keys(&self, keys: &[Vec<u8>]) -> Result<Vec<u8>, BackendError> {
        let proof = KeyValueStoreProof {
            leaf_hash: self.leaf_hash()?,
            entries: keys
                .iter()
                .map(|key| Ok((key.clone(), self.backend.get(key)?)))
                .collect::<Result<_, BackendError>>()?,
        };
        bincode::serialize(&proof).map_err(|e| BackendError::Corruption(e.to_string()))
    }
}
