//! BandChain oracle proofs for EVM bridges
//!
//! Turns a signed block header, its commit and a proven oracle store query
//! into the byte strings a bridge contract verifies:
//!
//! - [`vote`] splits the canonical precommit sign bytes around the block hash
//! - [`signature`] recovers the EVM address behind each precommit
//! - [`result`] decodes oracle results and their store keys
//! - [`assembler`] checks every hash link and builds the relay and data proofs
//! - [`abi`] lays them out as Solidity ABI parameters
//!
//! ```ignore
//! use bandproof_core::{ProofAssembler, ProofConfig};
//!
//! let assembler = ProofAssembler::new(ProofConfig::default());
//! let proof = assembler.single_result(&signed_header, &query)?;
//! submit(&proof.evm_proof_bytes);
//! ```

pub mod abi;
pub mod assembler;
pub mod config;
pub mod error;
pub mod result;
pub mod signature;
pub mod source;
pub mod vote;

pub use assembler::{
    BlockRelayProof, CountProof, MultiProof, OracleDataProof, ProofAssembler, RequestsCountProof,
    SingleProof,
};
pub use config::{ProofConfig, SignerPolicy};
pub use error::{ErrorKind, ProofError, Result};
pub use result::{result_store_key, OracleResult, ResolveStatus, REQUEST_COUNT_STORE_KEY};
pub use signature::{
    recover_signatures, BlockIdFlag, Commit, CommitSig, FailedSignature, SignatureSet, TmSignature,
};
pub use source::{ProofOp, SignedHeader, StoreQuery, IAVL_PROOF_OP, SIMPLE_PROOF_OP};
pub use vote::CommonVoteParts;

pub use bandproof_merkle as merkle;
