//! error types for proof assembly

use bandproof_merkle::MerkleError;
use thiserror::Error;

/// The three ways a proof request can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedInput,
    ProofMismatch,
    SignerNotFound,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error(transparent)]
    Merkle(#[from] MerkleError),

    #[error("no matching signer for signature {index} (validator {validator})")]
    SignerNotFound { index: usize, validator: String },

    #[error("malformed input: no valid precommit")]
    NoValidPrecommit,

    #[error("only {got} signatures recovered, {required} required")]
    InsufficientSignatures { got: usize, required: usize },

    #[error("abi error: {0}")]
    Abi(String),
}

impl ProofError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        ProofError::Merkle(MerkleError::malformed(msg))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ProofError::Merkle(MerkleError::ProofMismatch { .. }) => ErrorKind::ProofMismatch,
            ProofError::Merkle(_) | ProofError::NoValidPrecommit | ProofError::Abi(_) => {
                ErrorKind::MalformedInput
            }
            ProofError::SignerNotFound { .. } | ProofError::InsufficientSignatures { .. } => {
                ErrorKind::SignerNotFound
            }
        }
    }
}

impl From<alloy_sol_types::Error> for ProofError {
    fn from(e: alloy_sol_types::Error) -> Self {
        ProofError::Abi(e.to_string())
    }
}

impl From<prost::DecodeError> for ProofError {
    fn from(e: prost::DecodeError) -> Self {
        ProofError::Merkle(e.into())
    }
}

pub type Result<T> = std::result::Result<T, ProofError>;
