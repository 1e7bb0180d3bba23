//! # Hash Function
//!
//! SHA3-256, applied uniformly to leaf content and internal tree nodes.

use super::value_objects::Hash;
use sha3::{Digest, Sha3_256};

/// Hash two child hashes into their parent: `H(left || right)`.
pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha3_256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Hash a store's content as a sequence of key-value entries.
///
/// Entries must be supplied in key order; each field is length-prefixed with
/// a `u32` little-endian so the encoding is injective.
pub fn hash_entries<'a>(entries: impl IntoIterator<Item = (&'a [u8], &'a [u8])>) -> Hash {
    let mut hasher = Sha3_256::new();
    for (key, value) in entries {
        hasher.update((key.len() as u32).to_le_bytes());
        hasher.update(key);
        hasher.update((value.len() as u32).to_le_bytes());
        hasher.update(value);
    }
    hasher.finalize().into()
}
