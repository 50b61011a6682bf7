//! bottom-up replay of an existence proof path

use sha2::{Digest, Sha256};

use crate::error::{MerkleError, Result};
use crate::hash::Hash;
use crate::ics23::{HashOp, InnerOp};

/// One level of a proof: the parent is `sha256(prefix || child || suffix)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MerkleStep {
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub prefix: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub suffix: Vec<u8>,
}

impl MerkleStep {
    pub fn new(prefix: Vec<u8>, suffix: Vec<u8>) -> Self {
        Self { prefix, suffix }
    }

    /// Accepts an inner op only if it hashes with sha256; `index` is the
    /// step's position from the leaf, for error reporting.
    pub fn from_inner_op(index: usize, op: &InnerOp) -> Result<Self> {
        if op.hash != HashOp::Sha256 as i32 {
            return Err(MerkleError::UnsupportedHashOp {
                step: index,
                op: op.hash,
            });
        }
        Ok(Self::new(op.prefix.clone(), op.suffix.clone()))
    }

    pub fn apply(&self, child: &Hash) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(&self.prefix);
        hasher.update(child);
        hasher.update(&self.suffix);
        hasher.finalize().into()
    }
}

/// Climb from `leaf` to the root. Steps must be in leaf-to-root order.
pub fn replay(leaf: Hash, steps: &[MerkleStep]) -> Hash {
    steps.iter().fold(leaf, |current, step| step.apply(&current))
}

/// Replay raw inner ops, rejecting any that is not sha256.
pub fn replay_ops(leaf: Hash, ops: &[InnerOp]) -> Result<Hash> {
    let mut current = leaf;
    for (i, op) in ops.iter().enumerate() {
        current = MerkleStep::from_inner_op(i, op)?.apply(&current);
    }
    Ok(current)
}
