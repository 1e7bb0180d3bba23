//! # In-Memory Adapters
//!
//! Backend implementations over process memory. Used for unit tests and
//! single-node tooling; production wraps the node's durable databases.

use crate::domain::errors::BackendError;
use crate::ports::outbound::{BatchOperation, IndexTransaction, StoreBackend};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory key-value backend.
///
/// Batch writes hold the write lock for the whole batch, which makes them
/// atomic with respect to concurrent reads.
#[derive(Default)]
pub struct InMemoryBackend {
    data: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed entries.
    pub fn len(&self) -> usize {
        self.data.read().expect("backend lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StoreBackend for InMemoryBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, BackendError> {
        let data = self
            .data
            .read()
            .map_err(|_| BackendError::Io("backend lock poisoned".to_string()))?;
        Ok(data.get(key).cloned())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, BackendError> {
        let data = self
            .data
            .read()
            .map_err(|_| BackendError::Io("backend lock poisoned".to_string()))?;
        Ok(data
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn apply_batch(&self, operations: Vec<BatchOperation>) -> Result<(), BackendError> {
        let mut data = self
            .data
            .write()
            .map_err(|_| BackendError::Io("backend lock poisoned".to_string()))?;
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }
}

/// In-memory stand-in for the index database's native transaction.
///
/// Tracks only lifecycle state; index content is out of scope for the
/// state-commit core.
#[derive(Default)]
pub struct InMemoryIndexTransaction {
    started: bool,
}

impl InMemoryIndexTransaction {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IndexTransaction for InMemoryIndexTransaction {
    async fn start(&mut self) -> Result<(), BackendError> {
        self.started = true;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), BackendError> {
        self.started = false;
        Ok(())
    }

    async fn abort(&mut self) -> Result<(), BackendError> {
        self.started = false;
        Ok(())
    }

    fn is_started(&self) -> bool {
        self.started
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_batch_applies_puts_and_deletes() {
        let backend = InMemoryBackend::new();

        backend
            .apply_batch(vec![
                BatchOperation::put(b"a".to_vec(), b"1".to_vec()),
                BatchOperation::put(b"b".to_vec(), b"2".to_vec()),
            ])
            .await
            .unwrap();
        backend
            .apply_batch(vec![BatchOperation::delete(b"a".to_vec())])
            .await
            .unwrap();

        assert_eq!(backend.get(b"a").unwrap(), None);
        assert_eq!(backend.get(b"b").unwrap(), Some(b"2".to_vec()));
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_prefix_scan() {
        let backend = InMemoryBackend::new();
        backend
            .apply_batch(vec![
                BatchOperation::put(b"doc:1".to_vec(), b"x".to_vec()),
                BatchOperation::put(b"doc:2".to_vec(), b"y".to_vec()),
                BatchOperation::put(b"id:1".to_vec(), b"z".to_vec()),
            ])
            .await
            .unwrap();

        assert_eq!(backend.prefix_scan(b"doc:").unwrap().len(), 2);
        assert_eq!(backend.prefix_scan(b"").unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_index_transaction_lifecycle() {
        let mut tx = InMemoryIndexTransaction::new();
        assert!(!tx.is_started());

        tx.start().await.unwrap();
        assert!(tx.is_started());

        tx.commit().await.unwrap();
        assert!(!tx.is_started());
    }
}
