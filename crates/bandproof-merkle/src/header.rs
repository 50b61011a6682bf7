//! block header hash reconstruction
//!
//! The consensus header hash is a 14-leaf simple merkle tree:
//!
//! ```text
//!                              block hash
//!                 /                                 \
//!          [ 0..8 ]                                  [ 8..14 ]
//!        /          \                              /           \
//!    [0..4]        [4..8]  lastBlockIdAndOther   [8..12]      [12..14] evidenceAndProposer
//!   /      \                                    /       \
//! [0,1]   [2,3]                              [8,9]     [10,11]
//! version  height, time                 nextVals,    app hash, last results
//! chain id                              consensus
//! ```
//!
//! A verifier only needs the eight pre-folded parts plus the app hash, which
//! it recomputes from the multistore proof itself.

use prost::Message;

use crate::encoding::{cdc_encode_bytes, cdc_encode_i64, cdc_encode_str, encode_time};
use crate::error::{MerkleError, Result};
use crate::hash::{hash_from_byte_slices, inner_hash, leaf_hash, Hash};

#[derive(Clone, PartialEq, Message)]
struct ConsensusVersion {
    #[prost(uint64, tag = "1")]
    block: u64,
    #[prost(uint64, tag = "2")]
    app: u64,
}

#[derive(Clone, PartialEq, Message)]
struct ProtoPartSetHeader {
    #[prost(uint32, tag = "1")]
    total: u32,
    #[prost(bytes = "vec", tag = "2")]
    hash: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
struct ProtoBlockId {
    #[prost(bytes = "vec", tag = "1")]
    hash: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    part_set_header: Option<ProtoPartSetHeader>,
}

/// Wall-clock time as carried by headers and votes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockTime {
    pub seconds: u64,
    pub nanos: u32,
}

impl BlockTime {
    pub fn new(seconds: u64, nanos: u32) -> Self {
        Self { seconds, nanos }
    }

    /// protobuf `Timestamp` bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        encode_time(self.seconds, self.nanos)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartSetHeader {
    pub total: u32,
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub hash: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockId {
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub hash: Vec<u8>,
    pub part_set_header: PartSetHeader,
}

impl BlockId {
    pub fn encode_proto(&self) -> Vec<u8> {
        ProtoBlockId {
            hash: self.hash.clone(),
            part_set_header: Some(ProtoPartSetHeader {
                total: self.part_set_header.total,
                hash: self.part_set_header.hash.clone(),
            }),
        }
        .encode_to_vec()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Version {
    pub block: u64,
    pub app: u64,
}

/// Full consensus block header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    pub version: Version,
    pub chain_id: String,
    pub height: u64,
    pub time: BlockTime,
    pub last_block_id: BlockId,
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub last_commit_hash: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub data_hash: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub validators_hash: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub next_validators_hash: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub consensus_hash: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub app_hash: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub last_results_hash: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub evidence_hash: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub proposer_address: Vec<u8>,
}

impl Header {
    fn version_bytes(&self) -> Vec<u8> {
        ConsensusVersion {
            block: self.version.block,
            app: self.version.app,
        }
        .encode_to_vec()
    }

    fn height_bytes(&self) -> Result<Vec<u8>> {
        let height = i64::try_from(self.height)
            .map_err(|_| MerkleError::malformed(format!("height {} out of range", self.height)))?;
        Ok(cdc_encode_i64(height))
    }

    /// Hash over all 14 leaves, as the consensus engine computes it.
    pub fn hash(&self) -> Result<Hash> {
        let leaves = [
            self.version_bytes(),
            cdc_encode_str(&self.chain_id),
            self.height_bytes()?,
            self.time.encode()?,
            self.last_block_id.encode_proto(),
            cdc_encode_bytes(&self.last_commit_hash),
            cdc_encode_bytes(&self.data_hash),
            cdc_encode_bytes(&self.validators_hash),
            cdc_encode_bytes(&self.next_validators_hash),
            cdc_encode_bytes(&self.consensus_hash),
            cdc_encode_bytes(&self.app_hash),
            cdc_encode_bytes(&self.last_results_hash),
            cdc_encode_bytes(&self.evidence_hash),
            cdc_encode_bytes(&self.proposer_address),
        ];
        Ok(hash_from_byte_slices(&leaves))
    }
}

/// The header folded into the pieces an on-chain verifier stores.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockHeaderParts {
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub version_and_chain_id_hash: Hash,
    pub height: u64,
    pub time_second: u64,
    pub time_nano_second: u32,
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub last_block_id_and_other: Hash,
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub next_validator_hash_and_consensus_hash: Hash,
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub last_results_hash: Hash,
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub evidence_and_proposer_hash: Hash,
}

impl BlockHeaderParts {
    pub fn from_header(header: &Header) -> Result<Self> {
        // validated here so block_hash cannot fail on height later
        header.height_bytes()?;
        header.time.encode()?;

        Ok(Self {
            version_and_chain_id_hash: hash_from_byte_slices(&[
                header.version_bytes(),
                cdc_encode_str(&header.chain_id),
            ]),
            height: header.height,
            time_second: header.time.seconds,
            time_nano_second: header.time.nanos,
            last_block_id_and_other: hash_from_byte_slices(&[
                header.last_block_id.encode_proto(),
                cdc_encode_bytes(&header.last_commit_hash),
                cdc_encode_bytes(&header.data_hash),
                cdc_encode_bytes(&header.validators_hash),
            ]),
            next_validator_hash_and_consensus_hash: hash_from_byte_slices(&[
                cdc_encode_bytes(&header.next_validators_hash),
                cdc_encode_bytes(&header.consensus_hash),
            ]),
            last_results_hash: hash_from_byte_slices(&[cdc_encode_bytes(
                &header.last_results_hash,
            )]),
            evidence_and_proposer_hash: hash_from_byte_slices(&[
                cdc_encode_bytes(&header.evidence_hash),
                cdc_encode_bytes(&header.proposer_address),
            ]),
        })
    }

    /// Recombine the parts with the app hash into the block hash.
    pub fn block_hash(&self, app_hash: &Hash) -> Result<Hash> {
        let height = i64::try_from(self.height)
            .map_err(|_| MerkleError::malformed(format!("height {} out of range", self.height)))?;
        let time = encode_time(self.time_second, self.time_nano_second)?;

        let height_and_time = inner_hash(&leaf_hash(&cdc_encode_i64(height)), &leaf_hash(&time));
        let left = inner_hash(
            &inner_hash(&self.version_and_chain_id_hash, &height_and_time),
            &self.last_block_id_and_other,
        );

        let app_and_results = inner_hash(&leaf_hash(&cdc_encode_bytes(app_hash)), &self.last_results_hash);
        let right = inner_hash(
            &inner_hash(&self.next_validator_hash_and_consensus_hash, &app_and_results),
            &self.evidence_and_proposer_hash,
        );

        Ok(inner_hash(&left, &right))
    }
}
