//! # drive-state
//!
//! State-commit core for Platform Drive.
//!
//! ## Role in System
//!
//! - **Deterministic state machine**: driven by an external consensus engine
//!   that delivers one block at a time and expects an atomic state
//!   transition at each block boundary.
//! - **Multi-store coordination**: atomic start/commit/abort semantics over
//!   independent storage backends with no native cross-store transactions,
//!   plus a crash-recoverable snapshot giving query code a stable
//!   last-finalized-height view.
//! - **Merkle root tree**: one verifiable root hash over all store leaves,
//!   returned to consensus as the app hash, with combined inclusion proofs
//!   for point queries.
//!
//! ## Block Flow
//!
//! ```text
//! [Consensus] ──BeginBlock──→ Coordinator.start()
//!             ──DeliverTx───→ mutations via named transactions
//!             ──Commit──────→ Coordinator.commit()
//!                              └→ RootTree.rebuild() → root hash = app hash
//!
//! [Queries]   ──────────────→ previous-height view + full proofs,
//!                              independent of the in-flight block
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod test_utils;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
pub use service::*;
