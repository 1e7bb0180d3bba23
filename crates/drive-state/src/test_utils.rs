//! # Test Utilities
//!
//! Shared fixtures: fully in-memory wiring of the core, plus
//! failure-injecting backends for exercising the fatal paths.

use crate::adapters::leaf::KeyValueLeaf;
use crate::adapters::memory::{InMemoryBackend, InMemoryIndexTransaction};
use crate::domain::coordinator::TransactionCoordinator;
use crate::domain::errors::BackendError;
use crate::domain::root_tree::MerkleRootTree;
use crate::domain::set::TransactionSet;
use crate::domain::value_objects::{Hash, SnapshotConfig, StoreName};
use crate::ports::outbound::{BatchOperation, IndexTransaction, StoreBackend, StoreLeaf};
use crate::domain::snapshot::TransactionSnapshotStore;
use crate::service::StateCommitService;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A transaction set over fresh in-memory backends.
pub fn in_memory_transaction_set() -> TransactionSet {
    TransactionSet::new(
        Arc::new(InMemoryBackend::new()),
        Arc::new(InMemoryBackend::new()),
        Box::new(InMemoryIndexTransaction::new()),
        Arc::new(InMemoryBackend::new()),
        Arc::new(InMemoryBackend::new()),
    )
}

struct CoordinatorBackends {
    identity: Arc<dyn StoreBackend>,
    document: Arc<dyn StoreBackend>,
    data_contract: Arc<dyn StoreBackend>,
    public_keys: Arc<dyn StoreBackend>,
}

impl CoordinatorBackends {
    fn in_memory() -> Self {
        Self {
            identity: Arc::new(InMemoryBackend::new()),
            document: Arc::new(InMemoryBackend::new()),
            data_contract: Arc::new(InMemoryBackend::new()),
            public_keys: Arc::new(InMemoryBackend::new()),
        }
    }

    fn set(&self, index: Box<dyn IndexTransaction>) -> TransactionSet {
        TransactionSet::new(
            self.identity.clone(),
            self.document.clone(),
            index,
            self.data_contract.clone(),
            self.public_keys.clone(),
        )
    }
}

fn coordinator_from(
    backends: CoordinatorBackends,
    index: Box<dyn IndexTransaction>,
) -> (TransactionCoordinator, Arc<InMemoryBackend>) {
    let snapshot_backend = Arc::new(InMemoryBackend::new());
    let snapshots =
        TransactionSnapshotStore::new(snapshot_backend.clone(), SnapshotConfig::default());

    let current = backends.set(index);
    let previous = backends.set(Box::new(InMemoryIndexTransaction::new()));

    (
        TransactionCoordinator::new(current, previous, snapshots),
        snapshot_backend,
    )
}

/// Coordinator over in-memory stores; returns the snapshot backend so tests
/// can inspect the fixed-key record.
pub fn in_memory_coordinator() -> (TransactionCoordinator, Arc<InMemoryBackend>) {
    coordinator_from(
        CoordinatorBackends::in_memory(),
        Box::new(InMemoryIndexTransaction::new()),
    )
}

/// Coordinator whose identity store uses the supplied backend.
pub fn coordinator_with_identity_backend(
    identity: Arc<dyn StoreBackend>,
) -> (TransactionCoordinator, Arc<InMemoryBackend>) {
    let mut backends = CoordinatorBackends::in_memory();
    backends.identity = identity;
    coordinator_from(backends, Box::new(InMemoryIndexTransaction::new()))
}

/// Coordinator whose document set uses the supplied index transaction.
pub fn coordinator_with_index(
    index: Box<dyn IndexTransaction>,
) -> (TransactionCoordinator, Arc<InMemoryBackend>) {
    coordinator_from(CoordinatorBackends::in_memory(), index)
}

/// Fully wired in-memory service: coordinator plus a root tree whose leaves
/// read the same four store backends the transactions commit into.
pub fn in_memory_service() -> StateCommitService {
    let backends = CoordinatorBackends::in_memory();

    let leaves: Vec<Arc<dyn StoreLeaf>> = vec![
        Arc::new(KeyValueLeaf::new(StoreName::Identity, backends.identity.clone())),
        Arc::new(KeyValueLeaf::new(StoreName::Document, backends.document.clone())),
        Arc::new(KeyValueLeaf::new(
            StoreName::DataContract,
            backends.data_contract.clone(),
        )),
        Arc::new(KeyValueLeaf::new(
            StoreName::PublicKeyToIdentityId,
            backends.public_keys.clone(),
        )),
    ];
    let root_tree = MerkleRootTree::new(leaves).expect("leaf order follows StoreName::ALL");

    let (coordinator, _snapshot_backend) =
        coordinator_from(backends, Box::new(InMemoryIndexTransaction::new()));

    StateCommitService::new(coordinator, root_tree)
}

/// Backend that can be told to fail its next atomic batch.
#[derive(Default)]
pub struct FlakyBackend {
    inner: InMemoryBackend,
    fail_next_batch: AtomicBool,
}

impl FlakyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `apply_batch` call fails with an I/O error.
    pub fn fail_next_batch(&self) {
        self.fail_next_batch.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl StoreBackend for FlakyBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, BackendError> {
        self.inner.get(key)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, BackendError> {
        self.inner.prefix_scan(prefix)
    }

    async fn apply_batch(&self, operations: Vec<BatchOperation>) -> Result<(), BackendError> {
        if self.fail_next_batch.swap(false, Ordering::SeqCst) {
            return Err(BackendError::Io("injected batch failure".to_string()));
        }
        self.inner.apply_batch(operations).await
    }
}

/// Which lifecycle call an injected index failure targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexFailure {
    None,
    OnStart,
    OnCommit,
    OnAbort,
}

/// Index transaction with a single injected failure point.
pub struct FailingIndexTransaction {
    failure: IndexFailure,
    started: bool,
}

impl FailingIndexTransaction {
    pub fn healthy() -> Self {
        Self {
            failure: IndexFailure::None,
            started: false,
        }
    }

    pub fn failing_on_start() -> Self {
        Self {
            failure: IndexFailure::OnStart,
            started: false,
        }
    }

    pub fn failing_on_commit() -> Self {
        Self {
            failure: IndexFailure::OnCommit,
            started: false,
        }
    }

    pub fn failing_on_abort() -> Self {
        Self {
            failure: IndexFailure::OnAbort,
            started: false,
        }
    }

    fn injected() -> BackendError {
        BackendError::Io("injected index failure".to_string())
    }
}

#[async_trait]
impl IndexTransaction for FailingIndexTransaction {
    async fn start(&mut self) -> Result<(), BackendError> {
        if self.failure == IndexFailure::OnStart {
            return Err(Self::injected());
        }
        self.started = true;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), BackendError> {
        if self.failure == IndexFailure::OnCommit {
            return Err(Self::injected());
        }
        self.started = false;
        Ok(())
    }

    async fn abort(&mut self) -> Result<(), BackendError> {
        if self.failure == IndexFailure::OnAbort {
            return Err(Self::injected());
        }
        self.started = false;
        Ok(())
    }

    fn is_started(&self) -> bool {
        self.started
    }
}

/// Leaf with a fixed hash, for root-tree tests that pin leaf content.
pub struct FixedLeaf {
    name: StoreName,
    index: usize,
    hash: Option<Hash>,
}

impl FixedLeaf {
    pub fn new(name: StoreName, index: usize, hash: Hash) -> Self {
        Self {
            name,
            index,
            hash: Some(hash),
        }
    }

    /// Leaf whose hash computation fails with an I/O error.
    pub fn failing(name: StoreName, index: usize) -> Self {
        Self {
            name,
            index,
            hash: None,
        }
    }
}

impl StoreLeaf for FixedLeaf {
    fn name(&self) -> StoreName {
        self.name
    }

    fn index(&self) -> usize {
        self.index
    }

    fn leaf_hash(&self) -> Result<Hash, BackendError> {
        self.hash
            .ok_or_else(|| BackendError::Io("injected leaf failure".to_string()))
    }

    fn prove_keys(&self, _keys: &[Vec<u8>]) -> Result<Vec<u8>, BackendError> {
        let hash = self.leaf_hash()?;
        Ok(hash.to_vec())
    }
}
