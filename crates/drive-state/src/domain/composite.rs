//! # Composite Document Transaction
//!
//! Pairs the document-body store transaction with the secondary index
//! database's native transaction under one lifecycle.
//!
//! Start is both-or-neither: if the index transaction fails to open, the
//! already-started primary is aborted before the error propagates. Commit is
//! body-first: a failed index commit leaves an unindexed-but-durable body,
//! which is the safer inconsistency compared to an index referencing bodies
//! that were never persisted. Abort is best-effort on both sides.

use super::errors::TransactionError;
use super::transaction::StoreTransaction;
use super::value_objects::StoreName;
use crate::ports::outbound::IndexTransaction;

/// Document-body store transaction plus the index database transaction.
pub struct CompositeDocumentTransaction {
    primary: StoreTransaction,
    index: Box<dyn IndexTransaction>,
}

impl CompositeDocumentTransaction {
    pub fn new(primary: StoreTransaction, index: Box<dyn IndexTransaction>) -> Self {
        Self { primary, index }
    }

    /// The document-body transaction, for mutation and reads.
    pub fn store(&self) -> &StoreTransaction {
        &self.primary
    }

    /// Mutable access to the document-body transaction.
    pub fn store_mut(&mut self) -> &mut StoreTransaction {
        &mut self.primary
    }

    /// Mutable access to the index transaction, for index maintenance.
    pub fn index_mut(&mut self) -> &mut dyn IndexTransaction {
        self.index.as_mut()
    }

    /// The primary transaction's lifecycle state is authoritative.
    pub fn is_started(&self) -> bool {
        self.primary.is_started()
    }

    /// Start primary, then index. Both-or-neither.
    pub async fn start(&mut self) -> Result<(), TransactionError> {
        self.primary.start().await?;

        if let Err(index_err) = self.index.start().await {
            if let Err(abort_err) = self.primary.abort().await {
                tracing::warn!(
                    "[drive-state] failed to abort {} primary after index start failure: {}",
                    StoreName::Document,
                    abort_err
                );
            }
            return Err(index_err.into());
        }

        Ok(())
    }

    /// Commit body first, then the index.
    pub async fn commit(&mut self) -> Result<(), TransactionError> {
        self.primary.commit().await?;
        self.index.commit().await?;
        Ok(())
    }

    /// Abort both sides, attempting each even if the other fails.
    pub async fn abort(&mut self) -> Result<(), TransactionError> {
        let primary_result = self.primary.abort().await;
        let index_result = self.index.abort().await;

        primary_result?;
        index_result?;
        Ok(())
    }
}
