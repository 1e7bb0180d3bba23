//! # Store Transaction
//!
//! Buffered mutation scope over one store's durable backend.
//!
//! Reads check the staged buffers first and fall through to the committed
//! store, so a transaction sees its own writes but never another
//! transaction's. Writes only touch the buffers; the backend is mutated
//! exclusively by `commit`, which applies the whole diff as one atomic batch.
//!
//! ## Invariants
//!
//! - `start` fails if already started; `commit`/`abort` fail if not started.
//! - After `commit` or `abort` the buffers are empty and the transaction is
//!   back in the not-started state, ready for the next block height.
//! - A key is never simultaneously staged and tombstoned.

use super::errors::TransactionError;
use super::value_objects::StoreName;
use crate::ports::outbound::{BatchOperation, StoreBackend};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// A buffered transaction over one named store.
///
/// Created once per store at process start and reused across many
/// start/commit cycles, one per block height.
pub struct StoreTransaction {
    name: StoreName,
    backend: Arc<dyn StoreBackend>,
    started: bool,
    /// Staged upserts. Sorted so diff capture is deterministic.
    staged: BTreeMap<Vec<u8>, Vec<u8>>,
    /// Staged deletes.
    tombstones: BTreeSet<Vec<u8>>,
}

impl StoreTransaction {
    pub fn new(name: StoreName, backend: Arc<dyn StoreBackend>) -> Self {
        Self {
            name,
            backend,
            started: false,
            staged: BTreeMap::new(),
            tombstones: BTreeSet::new(),
        }
    }

    /// The store this transaction mutates.
    pub fn name(&self) -> StoreName {
        self.name
    }

    /// Whether a transaction scope is currently open.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Open a transaction scope for the next block height.
    pub async fn start(&mut self) -> Result<(), TransactionError> {
        if self.started {
            return Err(TransactionError::AlreadyStarted { store: self.name });
        }
        self.started = true;
        Ok(())
    }

    /// Read a key with own-writes visibility.
    ///
    /// Returns the staged value if one is buffered, `None` if the key is
    /// staged-deleted, otherwise the committed value from the backend.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, TransactionError> {
        if let Some(value) = self.staged.get(key) {
            return Ok(Some(value.clone()));
        }
        if self.tombstones.contains(key) {
            return Ok(None);
        }
        Ok(self.backend.get(key)?)
    }

    /// Stage an upsert, clearing any pending delete for the key.
    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        let key = key.into();
        self.tombstones.remove(&key);
        self.staged.insert(key, value.into());
    }

    /// Stage a tombstone, dropping any pending upsert for the key.
    pub fn delete(&mut self, key: impl Into<Vec<u8>>) {
        let key = key.into();
        self.staged.remove(&key);
        self.tombstones.insert(key);
    }

    /// Atomically apply all staged upserts and tombstones to the backend,
    /// then clear the buffers and close the scope.
    pub async fn commit(&mut self) -> Result<(), TransactionError> {
        if !self.started {
            return Err(TransactionError::NotStarted { store: self.name });
        }

        let mut operations =
            Vec::with_capacity(self.staged.len() + self.tombstones.len());
        for (key, value) in &self.staged {
            operations.push(BatchOperation::put(key.clone(), value.clone()));
        }
        for key in &self.tombstones {
            operations.push(BatchOperation::delete(key.clone()));
        }

        self.backend.apply_batch(operations).await?;

        self.staged.clear();
        self.tombstones.clear();
        self.started = false;
        Ok(())
    }

    /// Discard the staged buffers without touching the backend.
    pub async fn abort(&mut self) -> Result<(), TransactionError> {
        if !self.started {
            return Err(TransactionError::NotStarted { store: self.name });
        }
        self.staged.clear();
        self.tombstones.clear();
        self.started = false;
        Ok(())
    }

    /// Staged upserts, in key order.
    pub fn staged(&self) -> &BTreeMap<Vec<u8>, Vec<u8>> {
        &self.staged
    }

    /// Staged deletes, in key order.
    pub fn tombstones(&self) -> &BTreeSet<Vec<u8>> {
        &self.tombstones
    }

    /// Drop the staged buffers without a lifecycle check.
    ///
    /// Used when rehydrating the previous-height view: the overlay is
    /// replaced wholesale by the last snapshot's diff, independent of any
    /// transaction scope.
    pub fn reset(&mut self) {
        self.staged.clear();
        self.tombstones.clear();
    }
}
