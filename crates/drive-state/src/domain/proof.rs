//! # Proof Codec
//!
//! Canonical binary encoding of a combined root-tree + store-tree proof.
//!
//! ## Wire format
//!
//! The root-path component:
//!
//! 1. `u32` little-endian: count of sub-objects proven (`1` for a
//!    single-leaf proof; other values are reserved for multi-leaf batches).
//! 2. LEB128 varint: number of proof steps.
//! 3. For each step, the fixed 32-byte sibling hash, concatenated.
//! 4. LEB128 varint byte count, then one flag byte per step
//!    (`0` = sibling on the left, `1` = sibling on the right).
//!
//! The combined buffer appends the leaf's opaque store proof after the root
//! path, prefixed by a LEB128 varint byte length. Encoder and decoder apply
//! exactly this framing symmetrically; the decoders reject trailing bytes
//! and flag values other than 0 and 1, so no two byte strings decode to the
//! same proof. Proof buffers arrive from untrusted peers: every claimed
//! length is checked against the remaining buffer before it is trusted.

use super::errors::ProofError;
use super::value_objects::Hash;

/// Position of a sibling hash relative to the running hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingPosition {
    Left,
    Right,
}

/// A single level of a root-tree proof path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofStep {
    /// The sibling hash at this level.
    pub hash: Hash,
    /// Position of the sibling.
    pub position: SiblingPosition,
}

/// A combined proof: the path from a leaf to the root, plus that leaf's own
/// internal proof for specific keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    /// Canonical encoding of the root-tree path (fields 1-4 above).
    pub root_tree_proof: Vec<u8>,
    /// Opaque store-level proof, owned by the leaf's store.
    pub store_tree_proof: Vec<u8>,
}

impl Proof {
    /// Serialize into the single canonical buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.root_tree_proof.clone();
        write_varint(&mut out, self.store_tree_proof.len() as u64);
        out.extend_from_slice(&self.store_tree_proof);
        out
    }

    /// Decode a canonical buffer back into its two components.
    ///
    /// The root-path fields are self-delimiting, so the original
    /// `root_tree_proof` bytes are recovered exactly.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProofError> {
        let mut cursor = Cursor::new(bytes);
        decode_root_path_at(&mut cursor)?;
        let root_tree_proof = bytes[..cursor.position].to_vec();

        let store_len = cursor.read_varint()? as usize;
        let store_tree_proof = cursor.read_bytes(store_len, "store proof")?.to_vec();

        if cursor.remaining() != 0 {
            return Err(ProofError::TrailingBytes(cursor.remaining()));
        }

        Ok(Self {
            root_tree_proof,
            store_tree_proof,
        })
    }
}

/// Encode a root-tree proof path into its canonical form.
pub fn encode_root_path(steps: &[ProofStep]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + 2 + steps.len() * 33);

    // Sub-object count: always 1 for single-leaf proofs.
    out.extend_from_slice(&1u32.to_le_bytes());

    write_varint(&mut out, steps.len() as u64);
    for step in steps {
        out.extend_from_slice(&step.hash);
    }

    write_varint(&mut out, steps.len() as u64);
    for step in steps {
        out.push(match step.position {
            SiblingPosition::Left => 0,
            SiblingPosition::Right => 1,
        });
    }

    out
}

/// Decode a canonical root-tree proof path.
pub fn decode_root_path(bytes: &[u8]) -> Result<Vec<ProofStep>, ProofError> {
    let mut cursor = Cursor::new(bytes);
    let steps = decode_root_path_at(&mut cursor)?;
    if cursor.remaining() != 0 {
        return Err(ProofError::TrailingBytes(cursor.remaining()));
    }
    Ok(steps)
}

fn decode_root_path_at(cursor: &mut Cursor<'_>) -> Result<Vec<ProofStep>, ProofError> {
    let count_bytes = cursor.read_bytes(4, "sub-object count")?;
    let count = u32::from_le_bytes([
        count_bytes[0],
        count_bytes[1],
        count_bytes[2],
        count_bytes[3],
    ]);
    if count != 1 {
        return Err(ProofError::UnsupportedCount(count));
    }

    let step_count = cursor.read_varint()? as usize;
    // The claimed count is untrusted; every step needs 32 hash bytes, so
    // reject counts the buffer cannot hold before allocating anything.
    if step_count > cursor.remaining() / 32 {
        return Err(ProofError::Truncated {
            context: "sibling hash",
        });
    }
    let mut hashes = Vec::with_capacity(step_count);
    for _ in 0..step_count {
        let raw = cursor.read_bytes(32, "sibling hash")?;
        let mut hash = [0u8; 32];
        hash.copy_from_slice(raw);
        hashes.push(hash);
    }

    let flag_count = cursor.read_varint()? as usize;
    if flag_count != step_count {
        return Err(ProofError::FlagCountMismatch {
            expected: step_count,
            actual: flag_count,
        });
    }
    let flags = cursor.read_bytes(flag_count, "side flags")?.to_vec();

    let mut steps = Vec::with_capacity(step_count);
    for (hash, flag) in hashes.into_iter().zip(flags) {
        let position = match flag {
            0 => SiblingPosition::Left,
            1 => SiblingPosition::Right,
            other => return Err(ProofError::InvalidSideFlag(other)),
        };
        steps.push(ProofStep { hash, position });
    }
    Ok(steps)
}

/// Append an unsigned LEB128 varint.
fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    fn read_bytes(&mut self, len: usize, context: &'static str) -> Result<&'a [u8], ProofError> {
        let end = self
            .position
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(ProofError::Truncated { context })?;
        let slice = &self.bytes[self.position..end];
        self.position = end;
        Ok(slice)
    }

    /// Read an unsigned LEB128 varint.
    fn read_varint(&mut self) -> Result<u64, ProofError> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.read_bytes(1, "varint")?[0];
            if shift >= 64 || (shift == 63 && byte > 1) {
                return Err(ProofError::VarintOverflow);
            }
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }
}
