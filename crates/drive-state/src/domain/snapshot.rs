//! # Transaction Snapshot
//!
//! Serialized capture of a transaction set's pending diff, persisted under a
//! fixed key so query code and process restarts can rehydrate the
//! previous-height view.
//!
//! The snapshot is a value-type DTO: the coordinator captures it from the
//! `current` set's buffers immediately before commits apply and clear them,
//! and replays it onto the `previous` set's buffers via `put`/`delete`
//! without opening a transaction scope.
//!
//! Encoding is canonical: diffs live in `BTreeMap`/`BTreeSet`, so identical
//! logical content always serializes to identical bytes.

use super::errors::SnapshotError;
use super::set::TransactionSet;
use super::value_objects::{SnapshotConfig, StoreName};
use crate::ports::outbound::{BatchOperation, StoreBackend};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Pending diff of one store: created/updated keys with values, deleted keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDiff {
    pub created: BTreeMap<Vec<u8>, Vec<u8>>,
    pub deleted: BTreeSet<Vec<u8>>,
}

impl StoreDiff {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty()
    }
}

/// Self-describing capture of every store's pending diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub stores: BTreeMap<StoreName, StoreDiff>,
}

impl Snapshot {
    /// Capture the pending diffs of every transaction in the set.
    ///
    /// Must run before `commit` clears the buffers; the coordinator owns
    /// that ordering.
    pub fn capture(set: &TransactionSet) -> Self {
        let mut stores = BTreeMap::new();
        for name in StoreName::ALL {
            let tx = set.store_transaction(name);
            stores.insert(
                name,
                StoreDiff {
                    created: tx.staged().clone(),
                    deleted: tx.tombstones().clone(),
                },
            );
        }
        Self { stores }
    }

    /// Replay every store's diff onto the matching transaction's buffers.
    ///
    /// Existing buffers are dropped first so the overlay reflects exactly
    /// this snapshot. No transaction scope is opened or committed.
    pub fn replay_into(&self, set: &mut TransactionSet) {
        set.reset_buffers();
        for (name, diff) in &self.stores {
            let tx = set.store_transaction_mut(*name);
            for (key, value) in &diff.created {
                tx.put(key.clone(), value.clone());
            }
            for key in &diff.deleted {
                tx.delete(key.clone());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stores.values().all(StoreDiff::is_empty)
    }
}

/// Persists snapshots under one fixed key in a dedicated durable store,
/// namespaced separately from the domain stores.
pub struct TransactionSnapshotStore {
    backend: Arc<dyn StoreBackend>,
    config: SnapshotConfig,
}

impl TransactionSnapshotStore {
    pub fn new(backend: Arc<dyn StoreBackend>, config: SnapshotConfig) -> Self {
        Self { backend, config }
    }

    /// Write the snapshot as a single atomic record under the fixed key.
    pub async fn store(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let bytes = bincode::serialize(snapshot)
            .map_err(|e| SnapshotError::Encode(e.to_string()))?;
        self.backend
            .apply_batch(vec![BatchOperation::put(self.config.key.clone(), bytes)])
            .await?;
        Ok(())
    }

    /// Read the last-stored snapshot.
    ///
    /// A provably-absent key means no snapshot was ever written and yields
    /// `None`. A record that exists but fails to decode is corruption and
    /// propagates as fatal — never silently treated as empty.
    pub fn fetch(&self) -> Result<Option<Snapshot>, SnapshotError> {
        let Some(bytes) = self.backend.get(&self.config.key)? else {
            return Ok(None);
        };
        let snapshot = bincode::deserialize(&bytes)
            .map_err(|e| SnapshotError::Corrupted(e.to_string()))?;
        Ok(Some(snapshot))
    }

    /// Replay the last-stored snapshot onto the given set's buffers.
    ///
    /// No-op when no snapshot has ever been written: the set remains an
    /// empty overlay over the underlying stores.
    pub fn fetch_and_update(&self, set: &mut TransactionSet) -> Result<(), SnapshotError> {
        if let Some(snapshot) = self.fetch()? {
            snapshot.replay_into(set);
        }
        Ok(())
    }

    /// Reset the fixed key to an empty record. Used on full resync.
    pub async fn clear(&self) -> Result<(), SnapshotError> {
        self.store(&Snapshot::default()).await
    }
}
