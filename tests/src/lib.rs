//! # Platform Drive Test Suite
//!
//! Cross-component integration flows for the state-commit core.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── block_flow.rs   # Consensus-driven block lifecycle end to end
//!     └── proof_flow.rs   # App hash, proofs, previous-height queries
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p drive-tests
//! cargo test -p drive-tests integration::block_flow
//! ```

#![allow(dead_code)]

pub mod integration;

/// Install a subscriber once so flows can be traced with RUST_LOG.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
