//! # Outbound Ports (Driven Ports)
//!
//! Interfaces the state-commit core requires the host application to
//! implement. Production backends wrap the node's durable databases; testing
//! uses the in-memory adapters in `crate::adapters`.
//!
//! Point reads are synchronous (they never suspend); anything that applies
//! durable writes or drives a native database transaction is `async`.

use crate::domain::errors::BackendError;
use crate::domain::value_objects::{Hash, StoreName};
use async_trait::async_trait;

/// One operation in an atomic batch write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Abstract interface over one store's durable key-value backend.
///
/// `apply_batch` must be atomic: either every operation in the batch is
/// applied, or none are. There is no atomicity guarantee *across* backends —
/// the coordinator owns that failure mode.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Get the committed value for a key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, BackendError>;

    /// Iterate committed entries whose key starts with `prefix`.
    ///
    /// Ordering is unspecified; callers that need determinism sort.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, BackendError>;

    /// Atomically apply a batch of puts and deletes.
    async fn apply_batch(&self, operations: Vec<BatchOperation>) -> Result<(), BackendError>;
}

/// Abstract interface over the secondary index database's native transaction.
///
/// The index database supports query predicates over document fields and has
/// its own transaction lifecycle, driven by `CompositeDocumentTransaction`.
#[async_trait]
pub trait IndexTransaction: Send + Sync {
    /// Open a native transaction on the index database.
    async fn start(&mut self) -> Result<(), BackendError>;

    /// Commit the native transaction.
    async fn commit(&mut self) -> Result<(), BackendError>;

    /// Roll back the native transaction.
    async fn abort(&mut self) -> Result<(), BackendError>;

    /// Whether a native transaction is currently open.
    fn is_started(&self) -> bool;
}

/// One named store's contribution to the Merkle root tree.
///
/// A leaf outlives any single transaction: it reads the store's *committed*
/// content, never in-flight buffers, so its hash is only meaningful after the
/// commit for the current height has completed.
pub trait StoreLeaf: Send + Sync {
    /// The store this leaf represents.
    fn name(&self) -> StoreName;

    /// Fixed zero-based position of this leaf in the root tree.
    fn index(&self) -> usize;

    /// Hash of the store's current committed content.
    fn leaf_hash(&self) -> Result<Hash, BackendError>;

    /// Opaque store-level proof for the given keys.
    ///
    /// The encoding is owned by the store implementation; the root tree
    /// bundles it into the combined proof without inspecting it.
    fn prove_keys(&self, keys: &[Vec<u8>]) -> Result<Vec<u8>, BackendError>;
}
