//! # State Commit Service
//!
//! Wires the transaction coordinator and the Merkle root tree into the
//! block lifecycle the consensus engine drives: begin, mutate, commit,
//! rebuild, app hash.

use crate::domain::coordinator::TransactionCoordinator;
use crate::domain::errors::{CoordinatorError, RootTreeError, StateCommitError};
use crate::domain::root_tree::MerkleRootTree;
use crate::domain::set::TransactionSet;
use crate::domain::transaction::StoreTransaction;
use crate::domain::value_objects::{AppHash, StoreName};
use crate::ports::inbound::StateCommitApi;
use async_trait::async_trait;

/// The state-commit core behind the consensus handler layer.
pub struct StateCommitService {
    coordinator: TransactionCoordinator,
    root_tree: MerkleRootTree,
}

impl StateCommitService {
    pub fn new(coordinator: TransactionCoordinator, root_tree: MerkleRootTree) -> Self {
        Self {
            coordinator,
            root_tree,
        }
    }

    /// Named mutation access for transaction delivery.
    pub fn transaction_mut(&mut self, name: StoreName) -> &mut StoreTransaction {
        self.coordinator.transaction_mut(name)
    }

    /// The current set, including the document index transaction.
    pub fn current_mut(&mut self) -> &mut TransactionSet {
        self.coordinator.current_mut()
    }
}

#[async_trait]
impl StateCommitApi for StateCommitService {
    async fn begin_block(&mut self) -> Result<(), CoordinatorError> {
        self.coordinator.start().await
    }

    async fn commit_block(&mut self) -> Result<AppHash, StateCommitError> {
        self.coordinator.commit().await?;

        // Leaf content changed on commit; the tree holds no subscription and
        // must be rebuilt here before the root is read.
        self.root_tree.rebuild()?;
        let app_hash = self.root_tree.root_hash();

        tracing::info!(
            "[drive-state] block committed, app hash 0x{}",
            hex::encode(&app_hash[..8])
        );
        Ok(app_hash)
    }

    async fn abort_block(&mut self) -> Result<(), CoordinatorError> {
        tracing::info!("[drive-state] aborting in-flight block");
        self.coordinator.abort().await
    }

    fn app_hash(&self) -> AppHash {
        self.root_tree.root_hash()
    }

    fn prove(&self, store: StoreName, keys: &[Vec<u8>]) -> Result<Vec<u8>, RootTreeError> {
        Ok(self.root_tree.full_proof(store, keys)?.to_bytes())
    }

    fn previous_view(&mut self) -> Result<&TransactionSet, CoordinatorError> {
        self.coordinator.previous_transactions()
    }
}
