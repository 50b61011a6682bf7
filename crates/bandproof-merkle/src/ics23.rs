//! ICS23 existence proofs as returned by the store's ABCI query
//!
//! Only the pieces the oracle proofs use are modelled: a `CommitmentProof`
//! holding an `ExistenceProof`. Everything hashed must be sha256.

use prost::Message;
use tracing::debug;

use crate::encoding::put_length_prefixed;
use crate::error::{MerkleError, Result};
use crate::hash::{sha256, Hash};
use crate::replay::{replay_ops, MerkleStep};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum HashOp {
    NoHash = 0,
    Sha256 = 1,
    Sha512 = 2,
    Keccak = 3,
    Ripemd160 = 4,
    Bitcoin = 5,
    Sha512256 = 6,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum LengthOp {
    NoPrefix = 0,
    VarProto = 1,
    VarRlp = 2,
    Fixed32Big = 3,
    Fixed32Little = 4,
    Fixed64Big = 5,
    Fixed64Little = 6,
    Require32Bytes = 7,
    Require64Bytes = 8,
}

#[derive(Clone, PartialEq, Message)]
pub struct LeafOp {
    #[prost(enumeration = "HashOp", tag = "1")]
    pub hash: i32,
    #[prost(enumeration = "HashOp", tag = "2")]
    pub prehash_key: i32,
    #[prost(enumeration = "HashOp", tag = "3")]
    pub prehash_value: i32,
    #[prost(enumeration = "LengthOp", tag = "4")]
    pub length: i32,
    #[prost(bytes = "vec", tag = "5")]
    pub prefix: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct InnerOp {
    #[prost(enumeration = "HashOp", tag = "1")]
    pub hash: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub prefix: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub suffix: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ExistenceProof {
    #[prost(bytes = "vec", tag = "1")]
    pub key: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub leaf: Option<LeafOp>,
    #[prost(message, repeated, tag = "4")]
    pub path: Vec<InnerOp>,
}

/// Only the `exist` arm of the oneof; other arms decode as unknown fields.
#[derive(Clone, PartialEq, Message)]
pub struct CommitmentProof {
    #[prost(message, optional, tag = "1")]
    pub exist: Option<ExistenceProof>,
}

impl CommitmentProof {
    pub fn decode_existence(bytes: &[u8]) -> Result<ExistenceProof> {
        CommitmentProof::decode(bytes)?
            .exist
            .ok_or_else(|| MerkleError::malformed("commitment proof is not an existence proof"))
    }
}

impl LeafOp {
    /// Hash a key/value pair into the leaf this op describes.
    pub fn apply(&self, key: &[u8], value: &[u8]) -> Result<Hash> {
        if self.hash != HashOp::Sha256 as i32 {
            return Err(MerkleError::malformed(format!(
                "leaf hash op {} is not sha256",
                self.hash
            )));
        }
        if self.prehash_key != HashOp::NoHash as i32 {
            return Err(MerkleError::malformed("leaf keys must not be prehashed"));
        }
        if self.length != LengthOp::VarProto as i32 {
            return Err(MerkleError::malformed(format!(
                "leaf length op {} is not var_proto",
                self.length
            )));
        }
        let hashed_value = match HashOp::try_from(self.prehash_value) {
            Ok(HashOp::NoHash) => value.to_vec(),
            Ok(HashOp::Sha256) => sha256(value).to_vec(),
            _ => {
                return Err(MerkleError::malformed(format!(
                    "leaf value prehash op {} is not supported",
                    self.prehash_value
                )))
            }
        };

        let mut preimage = self.prefix.clone();
        put_length_prefixed(&mut preimage, key);
        put_length_prefixed(&mut preimage, &hashed_value);
        Ok(sha256(&preimage))
    }
}

impl ExistenceProof {
    pub fn leaf_op(&self) -> Result<&LeafOp> {
        self.leaf
            .as_ref()
            .ok_or_else(|| MerkleError::malformed("existence proof has no leaf op"))
    }

    pub fn leaf_hash(&self) -> Result<Hash> {
        self.leaf_op()?.apply(&self.key, &self.value)
    }

    /// Path steps with the hash op checked on every one.
    pub fn steps(&self) -> Result<Vec<MerkleStep>> {
        self.path
            .iter()
            .enumerate()
            .map(|(i, op)| MerkleStep::from_inner_op(i, op))
            .collect()
    }

    /// Root this proof commits to.
    pub fn calculate_root(&self) -> Result<Hash> {
        let leaf = self.leaf_hash()?;
        let root = replay_ops(leaf, &self.path)?;
        debug!(
            key = %hex::encode(&self.key),
            steps = self.path.len(),
            root = %hex::encode(&root[..8]),
            "replayed existence proof"
        );
        Ok(root)
    }
}
