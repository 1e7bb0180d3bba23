//! # Inbound Ports (Driving Ports)
//!
//! The operations the consensus engine and query handlers drive against the
//! state-commit core. The consensus side serializes calls: exactly one block
//! is in flight at a time.

use crate::domain::errors::{CoordinatorError, RootTreeError, StateCommitError};
use crate::domain::set::TransactionSet;
use crate::domain::value_objects::{AppHash, StoreName};
use async_trait::async_trait;

/// Consensus-facing block lifecycle plus the query-facing proof surface.
#[async_trait]
pub trait StateCommitApi {
    /// BeginBlock: open every store transaction for the next height.
    async fn begin_block(&mut self) -> Result<(), CoordinatorError>;

    /// Commit: apply every store transaction, rebuild the root tree, and
    /// return the app hash committing to the resulting state.
    async fn commit_block(&mut self) -> Result<AppHash, StateCommitError>;

    /// Abort the in-flight block after a failure at any stage.
    async fn abort_block(&mut self) -> Result<(), CoordinatorError>;

    /// The app hash of the last committed height.
    fn app_hash(&self) -> AppHash;

    /// Combined root + store proof for specific keys of one store, as the
    /// canonical proof buffer.
    fn prove(&self, store: StoreName, keys: &[Vec<u8>]) -> Result<Vec<u8>, RootTreeError>;

    /// Stable last-finalized-height view for query handlers, independent of
    /// the in-flight block.
    fn previous_view(&mut self) -> Result<&TransactionSet, CoordinatorError>;
}
