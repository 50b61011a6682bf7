//! canonical vote sign bytes
//!
//! A precommit signs the length-delimited encoding of `CanonicalVote`:
//!
//! ```text
//! len | 08 type | 11 height | [19 round] | 22 48 0a 20 <block hash> 12 24 <parts> | 2a len <time> | 32 len <chain id>
//!     '------------- common prefix ---------------------'            '-- common --'
//!                                                                       suffix
//! ```
//!
//! Everything up to the block hash and the part-set header after it is shared
//! by every vote in a commit. Only the timestamp differs per validator.
//! Round 0 is a default value and so is left out of the encoding, which is
//! why the prefix is 11 bytes at round 0 and 20 bytes otherwise.

use prost::Message;
use prost_types::Timestamp;

use bandproof_merkle::encoding::{put_uvarint, timestamp};
use bandproof_merkle::{sha256, BlockId, BlockTime, Hash};

use crate::error::{ProofError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum SignedMsgType {
    Unknown = 0,
    Prevote = 1,
    Precommit = 2,
    Proposal = 32,
}

#[derive(Clone, PartialEq, Message)]
pub struct CanonicalPartSetHeader {
    #[prost(uint32, tag = "1")]
    pub total: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub hash: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct CanonicalBlockId {
    #[prost(bytes = "vec", tag = "1")]
    pub hash: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub part_set_header: Option<CanonicalPartSetHeader>,
}

#[derive(Clone, PartialEq, Message)]
pub struct CanonicalVote {
    #[prost(enumeration = "SignedMsgType", tag = "1")]
    pub r#type: i32,
    #[prost(sfixed64, tag = "2")]
    pub height: i64,
    #[prost(sfixed64, tag = "3")]
    pub round: i64,
    #[prost(message, optional, tag = "4")]
    pub block_id: Option<CanonicalBlockId>,
    #[prost(message, optional, tag = "5")]
    pub timestamp: Option<Timestamp>,
    #[prost(string, tag = "6")]
    pub chain_id: String,
}

impl CanonicalVote {
    /// Full precommit for `block_id`, as a validator signs it.
    pub fn precommit(
        height: u64,
        round: u32,
        block_id: &BlockId,
        time: &BlockTime,
        chain_id: &str,
    ) -> Result<Self> {
        Ok(Self {
            r#type: SignedMsgType::Precommit as i32,
            height: signed_height(height)?,
            round: round as i64,
            block_id: Some(CanonicalBlockId {
                hash: block_id.hash.clone(),
                part_set_header: Some(CanonicalPartSetHeader {
                    total: block_id.part_set_header.total,
                    hash: block_id.part_set_header.hash.clone(),
                }),
            }),
            timestamp: Some(timestamp(time.seconds, time.nanos)?),
            chain_id: chain_id.to_string(),
        })
    }

    pub fn sign_bytes(&self) -> Vec<u8> {
        self.encode_length_delimited_to_vec()
    }
}

fn signed_height(height: u64) -> Result<i64> {
    i64::try_from(height).map_err(|_| ProofError::malformed(format!("height {} out of range", height)))
}

/// `{type, height, round}` with default fields omitted.
pub fn vote_prefix(msg_type: SignedMsgType, height: u64, round: u32) -> Result<Vec<u8>> {
    Ok(CanonicalVote {
        r#type: msg_type as i32,
        height: signed_height(height)?,
        round: round as i64,
        ..Default::default()
    }
    .encode_to_vec())
}

/// The bytes around the block hash that every vote of a commit shares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommonVoteParts {
    /// vote header up to and including the block hash field header
    pub prefix: Vec<u8>,
    /// part-set-header field of the canonical block id
    pub suffix: Vec<u8>,
}

impl CommonVoteParts {
    pub fn new(msg_type: SignedMsgType, height: u64, round: u32, block_id: &BlockId) -> Result<Self> {
        if block_id.hash.len() != 32 {
            return Err(ProofError::malformed(format!(
                "block id hash is {} bytes, expected 32",
                block_id.hash.len()
            )));
        }
        let part_set_header = Some(CanonicalPartSetHeader {
            total: block_id.part_set_header.total,
            hash: block_id.part_set_header.hash.clone(),
        });

        let mut prefix = vote_prefix(msg_type, height, round)?;
        // block_id field key and length, then the hash field key and length
        let canonical_id = CanonicalBlockId {
            hash: block_id.hash.clone(),
            part_set_header: part_set_header.clone(),
        };
        prost::encoding::encode_key(4, prost::encoding::WireType::LengthDelimited, &mut prefix);
        put_uvarint(&mut prefix, canonical_id.encoded_len() as u64);
        prost::encoding::encode_key(1, prost::encoding::WireType::LengthDelimited, &mut prefix);
        put_uvarint(&mut prefix, 32);

        // with the hash left empty only the part-set header field remains
        let suffix = CanonicalBlockId {
            hash: Vec::new(),
            part_set_header,
        }
        .encode_to_vec();

        Ok(Self { prefix, suffix })
    }

    pub fn precommit(height: u64, round: u32, block_id: &BlockId) -> Result<Self> {
        Self::new(SignedMsgType::Precommit, height, round, block_id)
    }

    /// Per-vote tail: the timestamp field and the chain id field.
    pub fn vote_tail(time: &BlockTime, chain_id: &str) -> Result<Vec<u8>> {
        Ok(CanonicalVote {
            timestamp: Some(timestamp(time.seconds, time.nanos)?),
            chain_id: chain_id.to_string(),
            ..Default::default()
        }
        .encode_to_vec())
    }

    /// Encoded vote body without the outer length.
    pub fn body(&self, block_hash: &[u8], tail: &[u8]) -> Vec<u8> {
        let mut body = Vec::with_capacity(self.prefix.len() + 32 + self.suffix.len() + tail.len());
        body.extend_from_slice(&self.prefix);
        body.extend_from_slice(block_hash);
        body.extend_from_slice(&self.suffix);
        body.extend_from_slice(tail);
        body
    }

    /// `(signedDataPrefix, signedDataSuffix)` for one vote, plus its digest.
    pub fn split_for_vote(&self, block_hash: &[u8], tail: &[u8]) -> (Vec<u8>, Vec<u8>, Hash) {
        let body = self.body(block_hash, tail);

        let mut signed_prefix = Vec::with_capacity(self.prefix.len() + 2);
        put_uvarint(&mut signed_prefix, body.len() as u64);
        signed_prefix.extend_from_slice(&self.prefix);

        let mut signed_suffix = self.suffix.clone();
        signed_suffix.extend_from_slice(tail);

        let mut sign_bytes = Vec::with_capacity(body.len() + 2);
        put_uvarint(&mut sign_bytes, body.len() as u64);
        sign_bytes.extend_from_slice(&body);

        (signed_prefix, signed_suffix, sha256(&sign_bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandproof_merkle::PartSetHeader;
    use hex_literal::hex;
    use proptest::prelude::*;

    fn block_id_25000() -> BlockId {
        BlockId {
            hash: hex!("3489F21785ACE1CE4214CB2B57F3A98DC0B7377D1BA1E1180B6E199E33B0FC5A").to_vec(),
            part_set_header: PartSetHeader {
                total: 1,
                hash: hex!("6BF91EFBA26A4CD86EBBD0E54DCFC9BD2C790859CFA96215661A47E4921A6301").to_vec(),
            },
        }
    }

    #[test]
    fn test_vote_prefix_round_zero_is_short() {
        let p0 = vote_prefix(SignedMsgType::Precommit, 25000, 0).unwrap();
        assert_eq!(p0, hex!("080211a861000000000000"));
        let p1 = vote_prefix(SignedMsgType::Precommit, 25000, 1).unwrap();
        assert_eq!(p1, hex!("080211a861000000000000190100000000000000"));
    }

    #[test]
    fn test_common_parts_height_25000() {
        let common = CommonVoteParts::precommit(25000, 0, &block_id_25000()).unwrap();
        assert_eq!(common.prefix, hex!("080211A86100000000000022480A20"));
        assert_eq!(
            common.suffix,
            hex!("1224080112206BF91EFBA26A4CD86EBBD0E54DCFC9BD2C790859CFA96215661A47E4921A6301")
        );
    }

    #[test]
    fn test_split_matches_full_canonical_vote() {
        let block_id = block_id_25000();
        let time = BlockTime::new(1629849933, 128300266);
        for round in [0u32, 3] {
            let common = CommonVoteParts::precommit(25000, round, &block_id).unwrap();
            let tail = CommonVoteParts::vote_tail(&time, "bandchain").unwrap();
            let (prefix, suffix, digest) = common.split_for_vote(&block_id.hash, &tail);

            let full = CanonicalVote::precommit(25000, round, &block_id, &time, "bandchain")
                .unwrap()
                .sign_bytes();
            let mut rebuilt = prefix.clone();
            rebuilt.extend_from_slice(&block_id.hash);
            rebuilt.extend_from_slice(&suffix);
            assert_eq!(rebuilt, full);
            assert_eq!(digest, sha256(&full));
        }
    }

    #[test]
    fn test_signed_data_height_25000() {
        let common = CommonVoteParts::precommit(25000, 0, &block_id_25000()).unwrap();
        let tail = CommonVoteParts::vote_tail(&BlockTime::new(1629849933, 128300266), "bandchain").unwrap();
        assert_eq!(tail, hex!("2a0b08cd9296890610eae9963d320962616e64636861696e"));
        let (prefix, suffix, _) = common.split_for_vote(&block_id_25000().hash, &tail);
        assert_eq!(prefix, hex!("6d080211A86100000000000022480A20"));
        assert_eq!(
            suffix,
            hex!("1224080112206bf91efba26a4cd86ebbd0e54dcfc9bd2c790859cfa96215661a47e4921a63012a0b08cd9296890610eae9963d320962616e64636861696e")
        );
    }

    #[test]
    fn test_short_block_hash_rejected() {
        let mut block_id = block_id_25000();
        block_id.hash.truncate(20);
        assert!(CommonVoteParts::precommit(25000, 0, &block_id).is_err());
    }

    proptest! {
        #[test]
        fn prop_split_reassembles_sign_bytes(
            height in 0u64..=i64::MAX as u64,
            round in any::<u32>(),
            hash in any::<[u8; 32]>(),
            total in any::<u32>(),
            parts_hash in prop::collection::vec(any::<u8>(), 0..40),
            seconds in 0u64..=i64::MAX as u64,
            nanos in 0u32..1_000_000_000,
            chain_id in "[a-z0-9-]{0,50}",
        ) {
            let block_id = BlockId {
                hash: hash.to_vec(),
                part_set_header: PartSetHeader { total, hash: parts_hash },
            };
            let time = BlockTime::new(seconds, nanos);
            let common = CommonVoteParts::precommit(height, round, &block_id).unwrap();
            let tail = CommonVoteParts::vote_tail(&time, &chain_id).unwrap();
            let (prefix, suffix, digest) = common.split_for_vote(&hash, &tail);

            let full = CanonicalVote::precommit(height, round, &block_id, &time, &chain_id)
                .unwrap()
                .sign_bytes();
            let mut rebuilt = prefix;
            rebuilt.extend_from_slice(&hash);
            rebuilt.extend_from_slice(&suffix);
            prop_assert_eq!(&rebuilt, &full);
            prop_assert_eq!(digest, sha256(&full));
        }
    }
}
