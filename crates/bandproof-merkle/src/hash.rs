//! domain-separated sha256 hashing shared by every tree in the proof

use sha2::{Digest, Sha256};

use crate::error::{MerkleError, Result};

pub type Hash = [u8; 32];

pub const LEAF_PREFIX: u8 = 0x00;
pub const INNER_PREFIX: u8 = 0x01;

pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// `sha256(0x00 || data)`
pub fn leaf_hash(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(data);
    hasher.finalize().into()
}

/// `sha256(0x01 || left || right)`
pub fn inner_hash(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([INNER_PREFIX]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Root of the simple merkle tree the consensus engine builds over
/// byte slices (RFC 6962 shape: split at the largest power of two below n).
pub fn hash_from_byte_slices<T: AsRef<[u8]>>(items: &[T]) -> Hash {
    match items.len() {
        0 => sha256(&[]),
        1 => leaf_hash(items[0].as_ref()),
        n => {
            let k = split_point(n);
            let left = hash_from_byte_slices(&items[..k]);
            let right = hash_from_byte_slices(&items[k..]);
            inner_hash(&left, &right)
        }
    }
}

/// largest power of two strictly less than `n` (n >= 2)
pub fn split_point(n: usize) -> usize {
    debug_assert!(n >= 2);
    let mut k = 1;
    while k * 2 < n {
        k *= 2;
    }
    k
}

/// Fixed-length conversion for hash fields arriving as byte slices.
pub fn to_hash(bytes: &[u8], what: &str) -> Result<Hash> {
    bytes.try_into().map_err(|_| {
        MerkleError::malformed(format!("{} must be 32 bytes, got {}", what, bytes.len()))
    })
}

/// Compare a recomputed root against the committed one.
pub fn ensure_root(what: &'static str, expected: &Hash, computed: &Hash) -> Result<()> {
    if expected == computed {
        Ok(())
    } else {
        Err(MerkleError::ProofMismatch {
            what,
            expected: *expected,
            computed: *computed,
        })
    }
}
