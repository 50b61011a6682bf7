//! CometBFT JSON shapes
//!
//! The node speaks JSON with integers as strings, hashes as upper hex,
//! signatures and store bytes as base64, and RFC 3339 times. Everything is
//! converted into the plain proof input types here so the core never sees
//! transport formatting.

use anyhow::{anyhow, bail, Context, Result};
use base64::Engine;
use chrono::DateTime;
use serde::Deserialize;

use bandproof_core::{BlockIdFlag, Commit, CommitSig, ProofOp, SignedHeader, StoreQuery};
use bandproof_merkle::{BlockId, BlockTime, Header, PartSetHeader, Version};

/// What `prove --input` reads: a `/commit` result and the oracle store
/// queries answered for it.
#[derive(Debug, Deserialize)]
pub struct ProveInput {
    pub signed_header: CommitResponse,
    pub queries: Vec<AbciQueryResponse>,
}

/// `/commit` result
#[derive(Debug, Deserialize)]
pub struct CommitResponse {
    pub signed_header: RawSignedHeader,
    #[serde(default)]
    pub canonical: bool,
}

#[derive(Debug, Deserialize)]
pub struct RawSignedHeader {
    pub header: RawHeader,
    pub commit: RawCommit,
}

#[derive(Debug, Deserialize)]
pub struct RawVersion {
    pub block: String,
    #[serde(default)]
    pub app: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawPartSetHeader {
    pub total: u32,
    pub hash: String,
}

#[derive(Debug, Deserialize)]
pub struct RawBlockId {
    pub hash: String,
    pub parts: RawPartSetHeader,
}

#[derive(Debug, Deserialize)]
pub struct RawHeader {
    pub version: RawVersion,
    pub chain_id: String,
    pub height: String,
    pub time: String,
    pub last_block_id: RawBlockId,
    pub last_commit_hash: String,
    pub data_hash: String,
    pub validators_hash: String,
    pub next_validators_hash: String,
    pub consensus_hash: String,
    pub app_hash: String,
    pub last_results_hash: String,
    pub evidence_hash: String,
    pub proposer_address: String,
}

#[derive(Debug, Deserialize)]
pub struct RawCommitSig {
    pub block_id_flag: u8,
    pub validator_address: String,
    pub timestamp: String,
    pub signature: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawCommit {
    pub height: String,
    pub round: u32,
    pub block_id: RawBlockId,
    pub signatures: Vec<RawCommitSig>,
}

/// `/abci_query` result
#[derive(Debug, Deserialize)]
pub struct AbciQueryResponse {
    pub response: RawQuery,
}

#[derive(Debug, Deserialize)]
pub struct RawProofOp {
    #[serde(rename = "type")]
    pub op_type: String,
    pub key: String,
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct RawProofOps {
    pub ops: Vec<RawProofOp>,
}

#[derive(Debug, Deserialize)]
pub struct RawQuery {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(rename = "proofOps", alias = "proof_ops", default)]
    pub proof_ops: Option<RawProofOps>,
    pub height: String,
}

fn base64(s: &str, what: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(s)
        .with_context(|| format!("invalid base64 in {}", what))
}

fn hex_bytes(s: &str, what: &str) -> Result<Vec<u8>> {
    hex::decode(s).with_context(|| format!("invalid hex in {}", what))
}

fn number(s: &str, what: &str) -> Result<u64> {
    s.parse().with_context(|| format!("invalid {}: {:?}", what, s))
}

fn block_time(s: &str) -> Result<BlockTime> {
    let time = DateTime::parse_from_rfc3339(s).with_context(|| format!("invalid timestamp {}", s))?;
    let seconds = u64::try_from(time.timestamp())
        .map_err(|_| anyhow!("timestamp {} is before the unix epoch", s))?;
    Ok(BlockTime::new(seconds, time.timestamp_subsec_nanos()))
}

impl RawBlockId {
    fn convert(&self, what: &str) -> Result<BlockId> {
        Ok(BlockId {
            hash: hex_bytes(&self.hash, what)?,
            part_set_header: PartSetHeader {
                total: self.parts.total,
                hash: hex_bytes(&self.parts.hash, what)?,
            },
        })
    }
}

impl RawHeader {
    pub fn convert(&self) -> Result<Header> {
        Ok(Header {
            version: Version {
                block: number(&self.version.block, "block version")?,
                app: match &self.version.app {
                    Some(app) => number(app, "app version")?,
                    None => 0,
                },
            },
            chain_id: self.chain_id.clone(),
            height: number(&self.height, "header height")?,
            time: block_time(&self.time)?,
            last_block_id: self.last_block_id.convert("last block id")?,
            last_commit_hash: hex_bytes(&self.last_commit_hash, "last commit hash")?,
            data_hash: hex_bytes(&self.data_hash, "data hash")?,
            validators_hash: hex_bytes(&self.validators_hash, "validators hash")?,
            next_validators_hash: hex_bytes(&self.next_validators_hash, "next validators hash")?,
            consensus_hash: hex_bytes(&self.consensus_hash, "consensus hash")?,
            app_hash: hex_bytes(&self.app_hash, "app hash")?,
            last_results_hash: hex_bytes(&self.last_results_hash, "last results hash")?,
            evidence_hash: hex_bytes(&self.evidence_hash, "evidence hash")?,
            proposer_address: hex_bytes(&self.proposer_address, "proposer address")?,
        })
    }
}

impl RawCommitSig {
    fn convert(&self, index: usize) -> Result<CommitSig> {
        let block_id_flag = BlockIdFlag::try_from(self.block_id_flag)?;
        // absent votes carry the zero time and no signature
        if block_id_flag != BlockIdFlag::Commit {
            return Ok(CommitSig {
                block_id_flag,
                validator_address: hex_bytes(&self.validator_address, "validator address")?,
                ..CommitSig::default()
            });
        }
        let signature = self
            .signature
            .as_deref()
            .ok_or_else(|| anyhow!("commit vote {} has no signature", index))?;
        Ok(CommitSig {
            block_id_flag,
            validator_address: hex_bytes(&self.validator_address, "validator address")?,
            timestamp: block_time(&self.timestamp)
                .with_context(|| format!("commit vote {}", index))?,
            signature: base64(signature, "vote signature")?,
        })
    }
}

impl RawCommit {
    pub fn convert(&self) -> Result<Commit> {
        Ok(Commit {
            height: number(&self.height, "commit height")?,
            round: self.round,
            block_id: self.block_id.convert("commit block id")?,
            signatures: self
                .signatures
                .iter()
                .enumerate()
                .map(|(i, sig)| sig.convert(i))
                .collect::<Result<_>>()?,
        })
    }
}

impl CommitResponse {
    pub fn into_signed_header(self) -> Result<SignedHeader> {
        let header = self.signed_header.header.convert()?;
        let commit = self.signed_header.commit.convert()?;
        Ok(SignedHeader { header, commit })
    }
}

impl AbciQueryResponse {
    pub fn into_store_query(self) -> Result<StoreQuery> {
        let r = self.response;
        if r.code != 0 {
            bail!("abci query failed with code {}: {}", r.code, r.log);
        }
        let key = base64(r.key.as_deref().unwrap_or_default(), "query key")?;
        let value = match r.value.as_deref() {
            Some(v) if !v.is_empty() => base64(v, "query value")?,
            _ => bail!("key {} not found in oracle store", hex::encode(&key)),
        };
        let ops = r
            .proof_ops
            .ok_or_else(|| anyhow!("query for {} came back without proof", hex::encode(&key)))?
            .ops;
        let proof_ops = ops
            .iter()
            .map(|op| -> Result<ProofOp> {
                Ok(ProofOp {
                    op_type: op.op_type.clone(),
                    key: base64(&op.key, "proof op key")?,
                    data: base64(&op.data, "proof op data")?,
                })
            })
            .collect::<Result<_>>()?;
        Ok(StoreQuery {
            height: number(&r.height, "query height")?,
            key,
            value,
            proof_ops,
        })
    }
}
