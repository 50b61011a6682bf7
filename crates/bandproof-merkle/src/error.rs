//! error types for proof primitives

use thiserror::Error;

use crate::Hash;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MerkleError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("malformed input: step {step} uses hash op {op}, only sha256 is supported")]
    UnsupportedHashOp { step: usize, op: i32 },

    #[error("{what} mismatch: expected {}, computed {}", hex::encode_upper(expected), hex::encode_upper(computed))]
    ProofMismatch {
        what: &'static str,
        expected: Hash,
        computed: Hash,
    },

    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),
}

impl MerkleError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        MerkleError::MalformedInput(msg.into())
    }

    /// true for every error caused by bad input rather than a failed check
    pub fn is_malformed(&self) -> bool {
        !matches!(self, MerkleError::ProofMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, MerkleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message_is_upper_hex() {
        let mut expected = [0u8; 32];
        expected[0] = 0xab;
        let err = MerkleError::ProofMismatch {
            what: "app hash",
            expected,
            computed: [0xcd; 32],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("app hash mismatch: expected AB000000"));
        assert!(msg.ends_with(&format!("computed {}", "CD".repeat(32))));
        assert!(!err.is_malformed());
    }
}
