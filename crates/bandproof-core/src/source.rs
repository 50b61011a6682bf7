//! inputs handed over by the chain's query layer

use serde::{Deserialize, Serialize};

use bandproof_merkle::{CommitmentProof, ExistenceProof, Header};

use crate::error::{ProofError, Result};
use crate::signature::Commit;

/// ABCI proof op holding the module-local (IAVL) existence proof.
pub const IAVL_PROOF_OP: &str = "ics23:iavl";
/// ABCI proof op holding the multistore existence proof.
pub const SIMPLE_PROOF_OP: &str = "ics23:simple";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedHeader {
    pub header: Header,
    pub commit: Commit,
}

impl SignedHeader {
    pub fn height(&self) -> u64 {
        self.header.height
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOp {
    #[serde(rename = "type")]
    pub op_type: String,
    #[serde(with = "hex::serde")]
    pub key: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub data: Vec<u8>,
}

/// A proven key lookup in the oracle store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreQuery {
    /// height the query was answered at
    pub height: u64,
    #[serde(with = "hex::serde")]
    pub key: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub value: Vec<u8>,
    pub proof_ops: Vec<ProofOp>,
}

impl StoreQuery {
    /// State committed by block `commit_height` is queried one height lower:
    /// the app hash in a header covers the previous block's execution.
    pub fn query_height(commit_height: u64) -> Result<u64> {
        match commit_height.checked_sub(1) {
            Some(h) if h > 0 => Ok(h),
            _ => Err(ProofError::malformed(format!(
                "no provable state for commit height {}",
                commit_height
            ))),
        }
    }

    /// Checks the query was answered against the state `commit_height` commits to.
    pub fn check_height(&self, commit_height: u64) -> Result<()> {
        let expected = Self::query_height(commit_height)?;
        if self.height != expected {
            return Err(ProofError::malformed(format!(
                "query answered at height {}, commit {} needs {}",
                self.height, commit_height, expected
            )));
        }
        Ok(())
    }

    fn op(&self, op_type: &str) -> Result<&ProofOp> {
        self.proof_ops
            .iter()
            .find(|op| op.op_type == op_type)
            .ok_or_else(|| ProofError::malformed(format!("query has no {} proof op", op_type)))
    }

    /// IAVL existence proof for this query's key and value.
    pub fn iavl_proof(&self) -> Result<ExistenceProof> {
        let op = self.op(IAVL_PROOF_OP)?;
        let proof = CommitmentProof::decode_existence(&op.data)?;
        if proof.key != self.key || op.key != self.key {
            return Err(ProofError::malformed(format!(
                "iavl proof is for key {}, queried {}",
                hex::encode(&proof.key),
                hex::encode(&self.key)
            )));
        }
        if proof.value != self.value {
            return Err(ProofError::malformed("iavl proof value differs from query value"));
        }
        Ok(proof)
    }

    pub fn multistore_proof(&self) -> Result<ExistenceProof> {
        let op = self.op(SIMPLE_PROOF_OP)?;
        Ok(CommitmentProof::decode_existence(&op.data)?)
    }
}
