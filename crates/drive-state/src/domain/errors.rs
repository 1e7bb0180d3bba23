//! # Domain Errors
//!
//! Error types for the state-commit core. Lifecycle misuse and structural
//! configuration errors are programmer errors and always fatal to the
//! triggering call; partial-commit inconsistency and snapshot corruption are
//! fatal to the process. This core never retries internally — propagation and
//! the shutdown decision belong to the consensus handler layer.

use super::value_objects::StoreName;
use thiserror::Error;

/// Errors surfaced by the durable storage backends.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("backend I/O error: {0}")]
    Io(String),

    #[error("backend corruption: {0}")]
    Corruption(String),
}

/// Errors from a single store transaction's lifecycle or backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransactionError {
    /// `start` was called while the transaction was already started.
    #[error("transaction for {store} is already started")]
    AlreadyStarted { store: StoreName },

    /// `commit` or `abort` was called on a transaction that was not started.
    #[error("transaction for {store} is not started")]
    NotStarted { store: StoreName },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors from snapshot persistence and replay.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// The snapshot record exists but cannot be decoded. Never silently
    /// treated as "no snapshot": only a provably-absent key means that.
    #[error("snapshot record is corrupted: {0}")]
    Corrupted(String),

    #[error("snapshot encoding failed: {0}")]
    Encode(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors from the transaction coordinator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// One or more store commits failed after sibling commits already
    /// succeeded durably. Cross-store state is now inconsistent and cannot
    /// be rolled back; the node must not advance to the next height.
    #[error("partial commit: {committed:?} committed but {failed:?} failed; state is inconsistent, halt required")]
    PartialCommit {
        committed: Vec<StoreName>,
        failed: Vec<StoreName>,
    },

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Errors from root tree construction and proof generation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RootTreeError {
    /// A leaf was supplied at an array position that does not match its
    /// recorded index. Fatal at construction; must prevent startup.
    #[error("leaf {store} reports index {actual}, expected {expected}")]
    InvalidLeafIndex {
        store: StoreName,
        expected: usize,
        actual: usize,
    },

    /// A proof was requested for a leaf index outside the tree.
    #[error("leaf index {index} out of range for a tree of {leaf_count} leaves")]
    LeafOutOfRange { index: usize, leaf_count: usize },

    /// A proof was requested for a store with no leaf in this tree.
    #[error("no leaf for store {store} in this tree")]
    UnknownStore { store: StoreName },

    #[error(transparent)]
    Leaf(#[from] BackendError),
}

/// Errors from the consensus-facing service surface.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateCommitError {
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    #[error(transparent)]
    RootTree(#[from] RootTreeError),
}

/// Errors from decoding a proof buffer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProofError {
    #[error("proof buffer truncated while reading {context}")]
    Truncated { context: &'static str },

    #[error("varint in proof buffer exceeds 64 bits")]
    VarintOverflow,

    #[error("side-flag array length {actual} does not match step count {expected}")]
    FlagCountMismatch { expected: usize, actual: usize },

    #[error("unsupported sub-object count {0}")]
    UnsupportedCount(u32),

    #[error("side flag byte {0} is not 0 or 1")]
    InvalidSideFlag(u8),

    #[error("proof buffer has {0} trailing bytes after the encoded proof")]
    TrailingBytes(usize),
}
