//! EVM wire format
//!
//! Proofs are handed to the bridge contract as Solidity ABI-encoded
//! argument lists, the same bytes `abi.decode(data, (...))` expects:
//!
//! ```text
//! relay:  (MultiStoreProof, BlockHeaderMerkleParts, TMSignature[])
//! verify: (uint256 blockHeight, Result, uint256 version, IAVLMerklePath[])
//! count:  (uint256 blockHeight, uint256 count, uint256 version, IAVLMerklePath[])
//! single: (bytes relay, bytes verify)
//! multi:  (bytes relay, bytes[] verifies)
//! ```

use alloy_primitives::{Bytes, B256, U256};
use alloy_sol_types::SolValue;

use bandproof_merkle::{BlockHeaderParts, IavlMerklePath, MerkleStep, MultiStoreProof};

use crate::error::Result;
use crate::result::OracleResult;
use crate::signature::TmSignature;

pub mod sol {
    alloy_sol_types::sol! {
        #[derive(Debug, PartialEq, Eq)]
        struct MerkleStep {
            bytes prefix;
            bytes suffix;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct MultiStoreProof {
            bytes32 oracleIAVLStateHash;
            MerkleStep[] merklePath;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct BlockHeaderMerkleParts {
            bytes32 versionAndChainIdHash;
            uint64 height;
            uint64 timeSecond;
            uint32 timeNanoSecond;
            bytes32 lastBlockIdAndOther;
            bytes32 nextValidatorHashAndConsensusHash;
            bytes32 lastResultsHash;
            bytes32 evidenceAndProposerHash;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct TMSignature {
            bytes32 r;
            bytes32 s;
            uint8 v;
            bytes signedDataPrefix;
            bytes signedDataSuffix;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct ResultRecord {
            string clientID;
            uint64 oracleScriptID;
            bytes params;
            uint64 askCount;
            uint64 minCount;
            uint64 requestID;
            uint64 ansCount;
            uint64 requestTime;
            uint64 resolveTime;
            uint8 resolveStatus;
            bytes result;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct IAVLMerklePath {
            bool isDataOnRight;
            uint8 subtreeHeight;
            uint256 subtreeSize;
            uint256 subtreeVersion;
            bytes32 siblingHash;
        }
    }
}

impl From<&MerkleStep> for sol::MerkleStep {
    fn from(step: &MerkleStep) -> Self {
        Self {
            prefix: Bytes::copy_from_slice(&step.prefix),
            suffix: Bytes::copy_from_slice(&step.suffix),
        }
    }
}

impl From<&MultiStoreProof> for sol::MultiStoreProof {
    fn from(proof: &MultiStoreProof) -> Self {
        Self {
            oracleIAVLStateHash: B256::from(proof.oracle_iavl_state_hash),
            merklePath: proof.merkle_path.iter().map(Into::into).collect(),
        }
    }
}

impl From<&BlockHeaderParts> for sol::BlockHeaderMerkleParts {
    fn from(parts: &BlockHeaderParts) -> Self {
        Self {
            versionAndChainIdHash: B256::from(parts.version_and_chain_id_hash),
            height: parts.height,
            timeSecond: parts.time_second,
            timeNanoSecond: parts.time_nano_second,
            lastBlockIdAndOther: B256::from(parts.last_block_id_and_other),
            nextValidatorHashAndConsensusHash: B256::from(parts.next_validator_hash_and_consensus_hash),
            lastResultsHash: B256::from(parts.last_results_hash),
            evidenceAndProposerHash: B256::from(parts.evidence_and_proposer_hash),
        }
    }
}

impl From<&TmSignature> for sol::TMSignature {
    fn from(sig: &TmSignature) -> Self {
        Self {
            r: B256::from(sig.r),
            s: B256::from(sig.s),
            v: sig.v,
            signedDataPrefix: Bytes::copy_from_slice(&sig.signed_data_prefix),
            signedDataSuffix: Bytes::copy_from_slice(&sig.signed_data_suffix),
        }
    }
}

impl From<&IavlMerklePath> for sol::IAVLMerklePath {
    fn from(path: &IavlMerklePath) -> Self {
        Self {
            isDataOnRight: path.is_data_on_right,
            subtreeHeight: path.subtree_height,
            subtreeSize: U256::from(path.subtree_size),
            subtreeVersion: U256::from(path.subtree_version),
            siblingHash: B256::from(path.sibling_hash),
        }
    }
}

impl From<&OracleResult> for sol::ResultRecord {
    // times are non-negative on chain; the contract reads them as uint64
    fn from(r: &OracleResult) -> Self {
        Self {
            clientID: r.client_id.clone(),
            oracleScriptID: r.oracle_script_id,
            params: Bytes::copy_from_slice(&r.calldata),
            askCount: r.ask_count,
            minCount: r.min_count,
            requestID: r.request_id,
            ansCount: r.ans_count,
            requestTime: r.request_time as u64,
            resolveTime: r.resolve_time as u64,
            resolveStatus: r.resolve_status as u8,
            result: Bytes::copy_from_slice(&r.result),
        }
    }
}

fn paths(merkle_paths: &[IavlMerklePath]) -> Vec<sol::IAVLMerklePath> {
    merkle_paths.iter().map(Into::into).collect()
}

pub fn encode_relay(
    multi_store: &MultiStoreProof,
    parts: &BlockHeaderParts,
    signatures: &[TmSignature],
) -> Vec<u8> {
    let signatures: Vec<sol::TMSignature> = signatures.iter().map(Into::into).collect();
    (
        sol::MultiStoreProof::from(multi_store),
        sol::BlockHeaderMerkleParts::from(parts),
        signatures,
    )
        .abi_encode_params()
}

pub fn encode_verify(
    block_height: u64,
    result: &OracleResult,
    version: u64,
    merkle_paths: &[IavlMerklePath],
) -> Vec<u8> {
    (
        U256::from(block_height),
        sol::ResultRecord::from(result),
        U256::from(version),
        paths(merkle_paths),
    )
        .abi_encode_params()
}

pub fn encode_count(
    block_height: u64,
    count: u64,
    version: u64,
    merkle_paths: &[IavlMerklePath],
) -> Vec<u8> {
    (
        U256::from(block_height),
        U256::from(count),
        U256::from(version),
        paths(merkle_paths),
    )
        .abi_encode_params()
}

/// `(bytes relay, bytes verify)`
pub fn encode_single(relay: &[u8], verify: &[u8]) -> Vec<u8> {
    (Bytes::copy_from_slice(relay), Bytes::copy_from_slice(verify)).abi_encode_params()
}

/// `(bytes relay, bytes[] verifies)`
pub fn encode_multi(relay: &[u8], verifies: &[Vec<u8>]) -> Vec<u8> {
    let verifies: Vec<Bytes> = verifies.iter().map(|v| Bytes::copy_from_slice(v)).collect();
    (Bytes::copy_from_slice(relay), verifies).abi_encode_params()
}

pub type RelayParams = (sol::MultiStoreProof, sol::BlockHeaderMerkleParts, Vec<sol::TMSignature>);
pub type VerifyParams = (U256, sol::ResultRecord, U256, Vec<sol::IAVLMerklePath>);
pub type CountParams = (U256, U256, U256, Vec<sol::IAVLMerklePath>);

pub fn decode_relay(data: &[u8]) -> Result<RelayParams> {
    Ok(RelayParams::abi_decode_params(data)?)
}

pub fn decode_verify(data: &[u8]) -> Result<VerifyParams> {
    Ok(VerifyParams::abi_decode_params(data)?)
}

pub fn decode_count(data: &[u8]) -> Result<CountParams> {
    Ok(CountParams::abi_decode_params(data)?)
}

pub fn decode_single(data: &[u8]) -> Result<(Bytes, Bytes)> {
    Ok(<(Bytes, Bytes)>::abi_decode_params(data)?)
}

pub fn decode_multi(data: &[u8]) -> Result<(Bytes, Vec<Bytes>)> {
    Ok(<(Bytes, Vec<Bytes>)>::abi_decode_params(data)?)
}
