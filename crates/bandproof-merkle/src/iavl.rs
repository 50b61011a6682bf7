//! IAVL path compaction
//!
//! Inner node preimage, as produced by the store:
//!
//! ```text
//! varint(height) varint(size) varint(version) 0x20 left 0x20 right
//! ```
//!
//! The ICS23 step splits that around the child hash. When the child is the
//! right node the prefix also carries the left sibling, so its length tells
//! us which side the data is on. The compacted form drops the framing and
//! keeps only the numbers and the sibling.

use sha2::{Digest, Sha256};

use crate::encoding::{put_length_prefixed, put_varint, read_varint};
use crate::error::{MerkleError, Result};
use crate::hash::{sha256, to_hash, Hash};
use crate::ics23::ExistenceProof;
use crate::replay::MerkleStep;

const HASH_LEN_BYTE: u8 = 0x20;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IavlMerklePath {
    pub is_data_on_right: bool,
    pub subtree_height: u8,
    pub subtree_size: u64,
    pub subtree_version: u64,
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub sibling_hash: Hash,
}

/// Reads the three zigzag varints an IAVL prefix starts with.
fn read_node_header(prefix: &[u8]) -> Result<([i64; 3], usize)> {
    let mut values = [0i64; 3];
    let mut offset = 0;
    for value in values.iter_mut() {
        let rest = prefix
            .get(offset..)
            .ok_or_else(|| MerkleError::malformed("iavl prefix truncated"))?;
        let (v, n) = read_varint(rest)?;
        *value = v;
        offset += n;
    }
    Ok((values, offset))
}

fn non_negative(v: i64, what: &str) -> Result<u64> {
    u64::try_from(v).map_err(|_| MerkleError::malformed(format!("negative iavl {}: {}", what, v)))
}

impl IavlMerklePath {
    pub fn from_step(step: &MerkleStep) -> Result<Self> {
        let ([height, size, version], header_len) = read_node_header(&step.prefix)?;
        let subtree_height = u8::try_from(height)
            .map_err(|_| MerkleError::malformed(format!("iavl subtree height {} out of range", height)))?;
        let subtree_size = non_negative(size, "subtree size")?;
        let subtree_version = non_negative(version, "subtree version")?;

        let prefix_len = header_len + 1;
        let (is_data_on_right, sibling) = if step.prefix.len() == prefix_len {
            // header 0x20 | child | 0x20 sibling
            if step.prefix[header_len] != HASH_LEN_BYTE || step.suffix.first() != Some(&HASH_LEN_BYTE) {
                return Err(MerkleError::malformed("iavl left-child step is not hash framed"));
            }
            (false, &step.suffix[1..])
        } else {
            // header 0x20 sibling 0x20 | child |
            if step.prefix.len() != prefix_len + 33
                || step.prefix[header_len] != HASH_LEN_BYTE
                || step.prefix[step.prefix.len() - 1] != HASH_LEN_BYTE
                || !step.suffix.is_empty()
            {
                return Err(MerkleError::malformed("iavl right-child step is not hash framed"));
            }
            (true, &step.prefix[prefix_len..step.prefix.len() - 1])
        };

        Ok(Self {
            is_data_on_right,
            subtree_height,
            subtree_size,
            subtree_version,
            sibling_hash: to_hash(sibling, "iavl sibling hash")?,
        })
    }

    pub fn parent_hash(&self, child: &Hash) -> Hash {
        let mut preimage = Vec::with_capacity(100);
        put_varint(&mut preimage, self.subtree_height as i64);
        put_varint(&mut preimage, self.subtree_size as i64);
        put_varint(&mut preimage, self.subtree_version as i64);

        let (left, right) = if self.is_data_on_right {
            (&self.sibling_hash, child)
        } else {
            (child, &self.sibling_hash)
        };
        preimage.push(HASH_LEN_BYTE);
        preimage.extend_from_slice(left);
        preimage.push(HASH_LEN_BYTE);
        preimage.extend_from_slice(right);

        Sha256::digest(&preimage).into()
    }
}

/// Version the leaf was written at: third varint of the ICS23 leaf prefix.
pub fn leaf_version(leaf_prefix: &[u8]) -> Result<u64> {
    let ([_height, _size, version], _) = read_node_header(leaf_prefix)?;
    non_negative(version, "leaf version")
}

/// IAVL leaf: `varint(0) varint(1) varint(version) len(key) key 0x20 sha256(value)`.
pub fn iavl_leaf_hash(version: u64, key: &[u8], value: &[u8]) -> Hash {
    let mut preimage = Vec::with_capacity(16 + key.len() + 33);
    put_varint(&mut preimage, 0);
    put_varint(&mut preimage, 1);
    put_varint(&mut preimage, version as i64);
    put_length_prefixed(&mut preimage, key);
    put_length_prefixed(&mut preimage, &sha256(value));
    sha256(&preimage)
}

/// Compact every step of a module-store existence proof.
pub fn compact_path(proof: &ExistenceProof) -> Result<Vec<IavlMerklePath>> {
    proof
        .steps()?
        .iter()
        .map(IavlMerklePath::from_step)
        .collect()
}

/// Store root implied by a leaf and its compacted path.
pub fn state_root(version: u64, key: &[u8], value: &[u8], path: &[IavlMerklePath]) -> Hash {
    path.iter()
        .fold(iavl_leaf_hash(version, key, value), |current, step| {
            step.parent_hash(&current)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ics23::tests::{decode, IAVL_PROOF, ORACLE_ROOT};
    use hex_literal::hex;

    #[test]
    fn test_leaf_version() {
        assert_eq!(leaf_version(&hex!("0002b203")).unwrap(), 217);
        assert!(leaf_version(&hex!("0002")).is_err());
    }

    #[test]
    fn test_compact_fixture_path() {
        let ep = decode(IAVL_PROOF);
        let path = compact_path(&ep).unwrap();
        assert_eq!(path.len(), 4);
        assert!(path.iter().all(|p| p.is_data_on_right));
        assert_eq!(
            path.iter().map(|p| p.subtree_height).collect::<Vec<_>>(),
            vec![1, 2, 3, 5]
        );
        assert_eq!(
            path[0].sibling_hash,
            hex!("eb739bb22f48b7f3053a90ba2ba4fe07fab262cadf8664489565c50ff505b8bd")
        );
    }

    #[test]
    fn test_compacted_path_reaches_same_root() {
        let ep = decode(IAVL_PROOF);
        let version = leaf_version(&ep.leaf.as_ref().unwrap().prefix).unwrap();
        assert_eq!(iavl_leaf_hash(version, &ep.key, &ep.value), ep.leaf_hash().unwrap());

        let path = compact_path(&ep).unwrap();
        assert_eq!(state_root(version, &ep.key, &ep.value, &path), ORACLE_ROOT);
    }

    #[test]
    fn test_left_child_step() {
        let sibling = [0x5a; 32];
        let mut suffix = vec![0x20];
        suffix.extend_from_slice(&sibling);
        // height 1, size 2, version 9
        let step = MerkleStep::new(hex!("02041220").to_vec(), suffix);
        let compact = IavlMerklePath::from_step(&step).unwrap();
        assert!(!compact.is_data_on_right);
        assert_eq!(compact.subtree_height, 1);
        assert_eq!(compact.subtree_size, 2);
        assert_eq!(compact.subtree_version, 9);
        assert_eq!(compact.sibling_hash, sibling);

        let child = [0x11; 32];
        assert_eq!(compact.parent_hash(&child), step.apply(&child));
    }

    #[test]
    fn test_malformed_steps_rejected() {
        // truncated sibling in the suffix
        let step = MerkleStep::new(hex!("02041220").to_vec(), vec![0x20, 1, 2, 3]);
        assert!(IavlMerklePath::from_step(&step).is_err());
        // prefix with garbage instead of a framed sibling
        let step = MerkleStep::new(hex!("0204122001").to_vec(), vec![]);
        assert!(IavlMerklePath::from_step(&step).is_err());
        // negative size
        let step = MerkleStep::new(hex!("02011220").to_vec(), vec![0x20; 33]);
        assert!(IavlMerklePath::from_step(&step).is_err());
    }
}
