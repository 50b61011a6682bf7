//! proof assembly
//!
//! ```text
//! SignedHeader ──┬── header ──▶ BlockHeaderParts ─┐
//!                │                                ├─▶ block hash == commit block id
//!  StoreQuery ───┼── ics23:simple ─▶ MultiStoreProof ─▶ app hash == header app hash
//!                │                         │
//!                │                         └─ oracle root == iavl root ◀── ics23:iavl ── OracleDataProof
//!                └── commit ──▶ recover_signatures ─▶ TMSignature[]
//! ```
//!
//! Every equality above is checked before any bytes are produced, so a proof
//! that comes out of here is one the contract will accept for that block.

use alloy_primitives::Address;
use prost::Message;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use bandproof_merkle::hash::{ensure_root, to_hash};
use bandproof_merkle::iavl::{compact_path, leaf_version, state_root};
use bandproof_merkle::{BlockHeaderParts, ExistenceProof, Hash, IavlMerklePath, MultiStoreProof};

use crate::abi;
use crate::config::ProofConfig;
use crate::error::{ProofError, Result};
use crate::result::{decode_request_count, request_id_from_key, OracleResult, REQUEST_COUNT_STORE_KEY};
use crate::signature::{recover_signatures, FailedSignature, TmSignature};
use crate::source::{SignedHeader, StoreQuery};

/// Everything needed to trust one block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRelayProof {
    pub multi_store_proof: MultiStoreProof,
    pub block_header_merkle_parts: BlockHeaderParts,
    pub signatures: Vec<TmSignature>,
    /// recovered EVM address of each signature, same order
    pub signers: Vec<Address>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_signatures: Vec<FailedSignature>,
}

impl BlockRelayProof {
    pub fn block_hash(&self) -> Result<Hash> {
        Ok(self
            .block_header_merkle_parts
            .block_hash(&self.multi_store_proof.app_hash())?)
    }

    pub fn encode_evm(&self) -> Vec<u8> {
        abi::encode_relay(
            &self.multi_store_proof,
            &self.block_header_merkle_parts,
            &self.signatures,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleDataProof {
    pub result: OracleResult,
    /// IAVL version the result was written at
    pub version: u64,
    pub merkle_paths: Vec<IavlMerklePath>,
}

impl OracleDataProof {
    /// Oracle store root as the contract recomputes it.
    pub fn oracle_root(&self) -> Hash {
        state_root(
            self.version,
            &crate::result::result_store_key(self.result.request_id),
            &self.result.encode_to_vec(),
            &self.merkle_paths,
        )
    }

    pub fn encode_evm(&self, block_height: u64) -> Vec<u8> {
        abi::encode_verify(block_height, &self.result, self.version, &self.merkle_paths)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestsCountProof {
    pub count: u64,
    pub version: u64,
    pub merkle_paths: Vec<IavlMerklePath>,
}

impl RequestsCountProof {
    pub fn oracle_root(&self) -> Hash {
        state_root(
            self.version,
            REQUEST_COUNT_STORE_KEY,
            &self.count.to_be_bytes(),
            &self.merkle_paths,
        )
    }

    pub fn encode_evm(&self, block_height: u64) -> Vec<u8> {
        abi::encode_count(block_height, self.count, self.version, &self.merkle_paths)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleProof {
    pub block_height: u64,
    pub block_relay_proof: BlockRelayProof,
    pub oracle_data_proof: OracleDataProof,
    #[serde(with = "hex::serde")]
    pub evm_proof_bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiProof {
    pub block_height: u64,
    pub block_relay_proof: BlockRelayProof,
    pub oracle_data_proofs: Vec<OracleDataProof>,
    #[serde(with = "hex::serde")]
    pub evm_proof_bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountProof {
    pub block_height: u64,
    pub block_relay_proof: BlockRelayProof,
    pub count_proof: RequestsCountProof,
    #[serde(with = "hex::serde")]
    pub evm_proof_bytes: Vec<u8>,
}

/// Compacted IAVL proof plus the root it was checked against.
struct CompactedLeaf {
    version: u64,
    merkle_paths: Vec<IavlMerklePath>,
    root: Hash,
}

/// Compact an IAVL existence proof and make sure the compact form replays
/// to the same root as the raw one.
fn compact_leaf(proof: &ExistenceProof) -> Result<CompactedLeaf> {
    let version = leaf_version(&proof.leaf_op()?.prefix)?;
    let merkle_paths = compact_path(proof)?;
    let root = proof.calculate_root()?;
    let compact_root = state_root(version, &proof.key, &proof.value, &merkle_paths);
    ensure_root("compacted iavl path", &root, &compact_root)?;
    Ok(CompactedLeaf {
        version,
        merkle_paths,
        root,
    })
}

#[derive(Clone, Debug, Default)]
pub struct ProofAssembler {
    config: ProofConfig,
}

impl ProofAssembler {
    pub fn new(config: ProofConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProofConfig {
        &self.config
    }

    /// Build and check the relay proof for `signed`'s block.
    pub fn block_relay(&self, signed: &SignedHeader, multistore: &ExistenceProof) -> Result<BlockRelayProof> {
        let header = &signed.header;
        let commit = &signed.commit;
        if commit.height != header.height {
            return Err(ProofError::malformed(format!(
                "commit height {} does not match header height {}",
                commit.height, header.height
            )));
        }

        let layout = self.config.layouts.layout_at(header.height)?;
        let multi_store_proof = MultiStoreProof::from_existence_proof(multistore, layout)?;
        let app_hash = multi_store_proof.app_hash();
        ensure_root("app hash", &to_hash(&header.app_hash, "header app hash")?, &app_hash)?;

        let parts = BlockHeaderParts::from_header(header)?;
        let block_hash = parts.block_hash(&app_hash)?;
        ensure_root(
            "block hash",
            &to_hash(&commit.block_id.hash, "commit block hash")?,
            &block_hash,
        )?;
        debug!(height = header.height, layout = %layout.version, "block header checks passed");

        let set = recover_signatures(&header.chain_id, commit, &self.config)?;
        info!(
            height = header.height,
            signatures = set.signatures.len(),
            "assembled block relay proof"
        );
        Ok(BlockRelayProof {
            multi_store_proof,
            block_header_merkle_parts: parts,
            signatures: set.signatures,
            signers: set.signers,
            failed_signatures: set.failed,
        })
    }

    /// Compact the result proof of one query and return it with its store root.
    pub fn oracle_data(&self, query: &StoreQuery) -> Result<(OracleDataProof, Hash)> {
        let proof = query.iavl_proof()?;
        let request_id = request_id_from_key(&proof.key)?;
        let result = OracleResult::decode_value(&proof.value)?;
        // the contract takes the status as a uint8 enum
        result.status()?;
        if result.request_id != request_id {
            return Err(ProofError::malformed(format!(
                "result for request {} stored under key of request {}",
                result.request_id, request_id
            )));
        }
        // the contract hashes its own re-encoding of the result
        if result.encode_to_vec() != proof.value {
            return Err(ProofError::malformed(format!(
                "result of request {} is not canonically encoded",
                request_id
            )));
        }

        let leaf = compact_leaf(&proof)?;
        debug!(request_id, version = leaf.version, steps = leaf.merkle_paths.len(), "compacted result proof");
        Ok((
            OracleDataProof {
                result,
                version: leaf.version,
                merkle_paths: leaf.merkle_paths,
            },
            leaf.root,
        ))
    }

    pub fn requests_count(&self, query: &StoreQuery) -> Result<(RequestsCountProof, Hash)> {
        let proof = query.iavl_proof()?;
        if proof.key != REQUEST_COUNT_STORE_KEY {
            return Err(ProofError::malformed(format!(
                "{} is not the request count key",
                hex::encode(&proof.key)
            )));
        }
        let count = decode_request_count(&proof.value)?;
        let leaf = compact_leaf(&proof)?;
        Ok((
            RequestsCountProof {
                count,
                version: leaf.version,
                merkle_paths: leaf.merkle_paths,
            },
            leaf.root,
        ))
    }

    fn relay_for(&self, signed: &SignedHeader, query: &StoreQuery) -> Result<BlockRelayProof> {
        query.check_height(signed.height())?;
        self.block_relay(signed, &query.multistore_proof()?)
    }

    pub fn single_result(&self, signed: &SignedHeader, query: &StoreQuery) -> Result<SingleProof> {
        let block_relay_proof = self.relay_for(signed, query)?;
        let (oracle_data_proof, root) = self.oracle_data(query)?;
        ensure_root(
            "oracle store root",
            &block_relay_proof.multi_store_proof.oracle_iavl_state_hash,
            &root,
        )?;

        let block_height = signed.height();
        let evm_proof_bytes = abi::encode_single(
            &block_relay_proof.encode_evm(),
            &oracle_data_proof.encode_evm(block_height),
        );
        Ok(SingleProof {
            block_height,
            block_relay_proof,
            oracle_data_proof,
            evm_proof_bytes,
        })
    }

    /// One relay proof shared by several results from the same block.
    pub fn multi_result(&self, signed: &SignedHeader, queries: &[StoreQuery]) -> Result<MultiProof> {
        let first = queries
            .first()
            .ok_or_else(|| ProofError::malformed("multi result proof needs at least one query"))?;
        let block_relay_proof = self.relay_for(signed, first)?;
        let oracle_root = block_relay_proof.multi_store_proof.oracle_iavl_state_hash;

        let block_height = signed.height();
        let mut oracle_data_proofs = Vec::with_capacity(queries.len());
        for query in queries {
            query.check_height(block_height)?;
            let (proof, root) = self.oracle_data(query)?;
            ensure_root("oracle store root", &oracle_root, &root)?;
            oracle_data_proofs.push(proof);
        }

        let verifies: Vec<Vec<u8>> = oracle_data_proofs
            .iter()
            .map(|p| p.encode_evm(block_height))
            .collect();
        let evm_proof_bytes = abi::encode_multi(&block_relay_proof.encode_evm(), &verifies);
        info!(block_height, results = oracle_data_proofs.len(), "assembled multi result proof");
        Ok(MultiProof {
            block_height,
            block_relay_proof,
            oracle_data_proofs,
            evm_proof_bytes,
        })
    }

    pub fn count(&self, signed: &SignedHeader, query: &StoreQuery) -> Result<CountProof> {
        let block_relay_proof = self.relay_for(signed, query)?;
        let (count_proof, root) = self.requests_count(query)?;
        ensure_root(
            "oracle store root",
            &block_relay_proof.multi_store_proof.oracle_iavl_state_hash,
            &root,
        )?;

        let block_height = signed.height();
        let evm_proof_bytes = abi::encode_single(
            &block_relay_proof.encode_evm(),
            &count_proof.encode_evm(block_height),
        );
        Ok(CountProof {
            block_height,
            block_relay_proof,
            count_proof,
            evm_proof_bytes,
        })
    }
}
