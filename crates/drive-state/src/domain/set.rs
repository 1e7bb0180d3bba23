//! # Transaction Set
//!
//! The fixed record of per-store transactions driven through one block
//! height. Two instances exist per process: `current`, mutated during block
//! execution, and `previous`, an overlay representing the last finalized
//! height for query code.

use super::composite::CompositeDocumentTransaction;
use super::transaction::StoreTransaction;
use super::value_objects::StoreName;
use crate::ports::outbound::{IndexTransaction, StoreBackend};
use std::sync::Arc;

/// Fixed, exhaustive record of the named store transactions.
///
/// Free-form string lookups are deliberately unrepresentable: every store is
/// a field, and lookups go through [`StoreName`].
pub struct TransactionSet {
    pub identity: StoreTransaction,
    pub document: CompositeDocumentTransaction,
    pub data_contract: StoreTransaction,
    pub public_key_to_identity_id: StoreTransaction,
}

impl TransactionSet {
    pub fn new(
        identity_backend: Arc<dyn StoreBackend>,
        document_backend: Arc<dyn StoreBackend>,
        index_transaction: Box<dyn IndexTransaction>,
        data_contract_backend: Arc<dyn StoreBackend>,
        public_key_backend: Arc<dyn StoreBackend>,
    ) -> Self {
        Self {
            identity: StoreTransaction::new(StoreName::Identity, identity_backend),
            document: CompositeDocumentTransaction::new(
                StoreTransaction::new(StoreName::Document, document_backend),
                index_transaction,
            ),
            data_contract: StoreTransaction::new(
                StoreName::DataContract,
                data_contract_backend,
            ),
            public_key_to_identity_id: StoreTransaction::new(
                StoreName::PublicKeyToIdentityId,
                public_key_backend,
            ),
        }
    }

    /// Named lookup into the set's store transactions.
    ///
    /// [`StoreName::Document`] resolves to the composite's primary (body)
    /// transaction; the index side is reached via `document.index_mut()`.
    pub fn store_transaction_mut(&mut self, name: StoreName) -> &mut StoreTransaction {
        match name {
            StoreName::Identity => &mut self.identity,
            StoreName::Document => self.document.store_mut(),
            StoreName::DataContract => &mut self.data_contract,
            StoreName::PublicKeyToIdentityId => &mut self.public_key_to_identity_id,
        }
    }

    /// Read-only named lookup.
    pub fn store_transaction(&self, name: StoreName) -> &StoreTransaction {
        match name {
            StoreName::Identity => &self.identity,
            StoreName::Document => self.document.store(),
            StoreName::DataContract => &self.data_contract,
            StoreName::PublicKeyToIdentityId => &self.public_key_to_identity_id,
        }
    }

    /// Drop every transaction's staged buffers without lifecycle checks.
    ///
    /// Used on the `previous` set before replaying a snapshot, so the
    /// overlay reflects exactly the last finalized height.
    pub fn reset_buffers(&mut self) {
        for name in StoreName::ALL {
            self.store_transaction_mut(name).reset();
        }
    }
}
