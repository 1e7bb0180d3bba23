//! # Transaction Coordinator
//!
//! Orchestrates the named store transactions through one block height:
//! start, mutate, then commit or abort, with the snapshot of the applied
//! diff persisted after a fully successful commit.
//!
//! The four backends are independent databases with no cross-store
//! transaction support, so lifecycle operations fan out concurrently. The
//! storage layer offers no cross-store atomicity: a commit that fails after
//! sibling commits already landed durably leaves the process on inconsistent
//! state, which is surfaced as the fatal [`CoordinatorError::PartialCommit`]
//! and never retried.

use super::errors::{CoordinatorError, TransactionError};
use super::set::TransactionSet;
use super::snapshot::{Snapshot, TransactionSnapshotStore};
use super::transaction::StoreTransaction;
use super::value_objects::StoreName;

/// Coordinator over the `current` and `previous` transaction sets.
pub struct TransactionCoordinator {
    current: TransactionSet,
    previous: TransactionSet,
    snapshots: TransactionSnapshotStore,
}

impl TransactionCoordinator {
    pub fn new(
        current: TransactionSet,
        previous: TransactionSet,
        snapshots: TransactionSnapshotStore,
    ) -> Self {
        Self {
            current,
            previous,
            snapshots,
        }
    }

    /// Named lookup into the current set, for mutation during block
    /// execution. Total by construction: every store name is a variant.
    pub fn transaction_mut(&mut self, name: StoreName) -> &mut StoreTransaction {
        self.current.store_transaction_mut(name)
    }

    /// The current set, including the composite document transaction's
    /// index side.
    pub fn current_mut(&mut self) -> &mut TransactionSet {
        &mut self.current
    }

    /// Start every transaction in the current set concurrently.
    ///
    /// On any failure, whatever already started is aborted before the error
    /// propagates, so a failed start leaves no scope open.
    pub async fn start(&mut self) -> Result<(), CoordinatorError> {
        let (identity, document, data_contract, public_keys) = tokio::join!(
            self.current.identity.start(),
            self.current.document.start(),
            self.current.data_contract.start(),
            self.current.public_key_to_identity_id.start(),
        );

        let results = [identity, document, data_contract, public_keys];
        if results.iter().all(Result::is_ok) {
            return Ok(());
        }

        self.rollback_started().await;

        let first_error = results
            .into_iter()
            .find_map(Result::err)
            .expect("at least one start failed");
        Err(first_error.into())
    }

    /// Commit every transaction in the current set concurrently; persist the
    /// snapshot of the applied diff only after all commits succeed.
    pub async fn commit(&mut self) -> Result<(), CoordinatorError> {
        // Commit clears the buffers, so the diff is captured first.
        let snapshot = Snapshot::capture(&self.current);

        let (identity, document, data_contract, public_keys) = tokio::join!(
            self.current.identity.commit(),
            self.current.document.commit(),
            self.current.data_contract.commit(),
            self.current.public_key_to_identity_id.commit(),
        );

        let results = [
            (StoreName::Identity, identity),
            (StoreName::Document, document),
            (StoreName::DataContract, data_contract),
            (StoreName::PublicKeyToIdentityId, public_keys),
        ];

        let committed: Vec<StoreName> = results
            .iter()
            .filter(|(_, r)| r.is_ok())
            .map(|(name, _)| *name)
            .collect();
        let failed: Vec<StoreName> = results
            .iter()
            .filter(|(_, r)| r.is_err())
            .map(|(name, _)| *name)
            .collect();

        if failed.is_empty() {
            self.snapshots.store(&snapshot).await?;
            tracing::info!(
                "[drive-state] committed block state across {} stores",
                committed.len()
            );
            return Ok(());
        }

        if committed.is_empty() {
            // Nothing landed durably; propagate as an ordinary failure.
            let first_error = results
                .into_iter()
                .find_map(|(_, r)| r.err())
                .expect("at least one commit failed");
            return Err(first_error.into());
        }

        // Sibling commits are durable and cannot be rolled back.
        tracing::error!(
            "[drive-state] partial commit: committed {:?}, failed {:?}",
            committed,
            failed
        );
        Err(CoordinatorError::PartialCommit { committed, failed })
    }

    /// Abort every transaction in the current set concurrently.
    ///
    /// Best-effort: every abort is attempted; the first failure propagates.
    /// Never writes a snapshot.
    pub async fn abort(&mut self) -> Result<(), CoordinatorError> {
        let (identity, document, data_contract, public_keys) = tokio::join!(
            self.current.identity.abort(),
            self.current.document.abort(),
            self.current.data_contract.abort(),
            self.current.public_key_to_identity_id.abort(),
        );

        identity?;
        document?;
        data_contract?;
        public_keys?;
        Ok(())
    }

    /// Rehydrate and return the previous-height view.
    ///
    /// Replays the last-stored snapshot's diff onto the `previous` set's
    /// buffers. On cold start, with no snapshot ever written, `previous`
    /// remains an empty overlay over the underlying stores.
    pub fn previous_transactions(
        &mut self,
    ) -> Result<&TransactionSet, CoordinatorError> {
        self.snapshots.fetch_and_update(&mut self.previous)?;
        Ok(&self.previous)
    }

    /// Abort whichever current transactions have an open scope, logging
    /// rather than propagating abort failures.
    async fn rollback_started(&mut self) {
        for name in StoreName::ALL {
            let started = match name {
                StoreName::Document => self.current.document.is_started(),
                _ => self.current.store_transaction(name).is_started(),
            };
            if !started {
                continue;
            }

            let result: Result<(), TransactionError> = match name {
                StoreName::Document => self.current.document.abort().await,
                _ => self.current.store_transaction_mut(name).abort().await,
            };
            if let Err(e) = result {
                tracing::warn!(
                    "[drive-state] failed to abort {} during start rollback: {}",
                    name,
                    e
                );
            }
        }
    }
}
