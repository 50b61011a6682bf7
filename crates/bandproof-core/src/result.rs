//! oracle result record and where it lives in the oracle store

use prost::Message;
use serde::{Deserialize, Serialize};

use crate::error::{ProofError, Result};

/// prefix for global counters
pub const GLOBAL_STORE_KEY_PREFIX: u8 = 0x00;
/// prefix for resolved request results
pub const RESULT_STORE_KEY_PREFIX: u8 = 0xff;

pub const REQUEST_COUNT_STORE_KEY: &[u8] = b"\x00RequestCount";

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration, Serialize, Deserialize,
)]
#[repr(i32)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolveStatus {
    Open = 0,
    Success = 1,
    Failure = 2,
    Expired = 3,
}

/// A resolved request as stored by the oracle module.
#[derive(Clone, PartialEq, Eq, Message, Serialize, Deserialize)]
pub struct OracleResult {
    #[prost(string, tag = "1")]
    pub client_id: String,
    #[prost(uint64, tag = "2")]
    pub oracle_script_id: u64,
    #[prost(bytes = "vec", tag = "3")]
    #[serde(with = "hex::serde")]
    pub calldata: Vec<u8>,
    #[prost(uint64, tag = "4")]
    pub ask_count: u64,
    #[prost(uint64, tag = "5")]
    pub min_count: u64,
    #[prost(uint64, tag = "6")]
    pub request_id: u64,
    #[prost(uint64, tag = "7")]
    pub ans_count: u64,
    #[prost(int64, tag = "8")]
    pub request_time: i64,
    #[prost(int64, tag = "9")]
    pub resolve_time: i64,
    #[prost(enumeration = "ResolveStatus", tag = "10")]
    pub resolve_status: i32,
    #[prost(bytes = "vec", tag = "11")]
    #[serde(with = "hex::serde")]
    pub result: Vec<u8>,
}

impl OracleResult {
    pub fn decode_value(value: &[u8]) -> Result<Self> {
        Ok(Self::decode(value)?)
    }

    pub fn status(&self) -> Result<ResolveStatus> {
        ResolveStatus::try_from(self.resolve_status).map_err(|_| {
            ProofError::malformed(format!("unknown resolve status {}", self.resolve_status))
        })
    }
}

/// `0xff || be_u64(request_id)`
pub fn result_store_key(request_id: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(9);
    key.push(RESULT_STORE_KEY_PREFIX);
    key.extend_from_slice(&request_id.to_be_bytes());
    key
}

/// Inverse of [`result_store_key`].
pub fn request_id_from_key(key: &[u8]) -> Result<u64> {
    match key {
        [RESULT_STORE_KEY_PREFIX, id @ ..] if id.len() == 8 => {
            let mut be = [0u8; 8];
            be.copy_from_slice(id);
            Ok(u64::from_be_bytes(be))
        }
        _ => Err(ProofError::malformed(format!(
            "{} is not a result store key",
            hex::encode(key)
        ))),
    }
}

/// The request counter is stored as a big-endian u64.
pub fn decode_request_count(value: &[u8]) -> Result<u64> {
    let be: [u8; 8] = value.try_into().map_err(|_| {
        ProofError::malformed(format!("request count is {} bytes, expected 8", value.len()))
    })?;
    Ok(u64::from_be_bytes(be))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use hex_literal::hex;

    /// result of request 1 at height 25000
    pub const RESULT_1: [u8; 59] = hex!(
        "10011a13000000010000000342544300000000000186a020012801300138014093a99389064897a993890650015a0c000000010000000124ec078c"
    );

    #[test]
    fn test_decode_result() {
        let result = OracleResult::decode_value(&RESULT_1).unwrap();
        assert_eq!(result.client_id, "");
        assert_eq!(result.oracle_script_id, 1);
        assert_eq!(
            result.calldata,
            hex!("000000010000000342544300000000000186a0")
        );
        assert_eq!(result.ask_count, 1);
        assert_eq!(result.min_count, 1);
        assert_eq!(result.request_id, 1);
        assert_eq!(result.ans_count, 1);
        assert_eq!(result.request_time, 1629803667);
        assert_eq!(result.resolve_time, 1629803671);
        assert_eq!(result.status().unwrap(), ResolveStatus::Success);
        assert_eq!(result.result, hex!("000000010000000124ec078c"));
        assert_eq!(result.encode_to_vec(), RESULT_1);
    }

    #[test]
    fn test_store_keys() {
        assert_eq!(result_store_key(1), hex!("ff0000000000000001"));
        assert_eq!(request_id_from_key(&result_store_key(811)).unwrap(), 811);
        assert!(request_id_from_key(&hex!("010000000000000001")).is_err());
        assert!(request_id_from_key(&hex!("ff01")).is_err());
        assert_eq!(REQUEST_COUNT_STORE_KEY[0], GLOBAL_STORE_KEY_PREFIX);
        assert_eq!(&REQUEST_COUNT_STORE_KEY[1..], b"RequestCount");
    }

    #[test]
    fn test_request_count() {
        assert_eq!(decode_request_count(&hex!("0000000000000011")).unwrap(), 17);
        assert!(decode_request_count(&hex!("11")).is_err());
    }

    #[test]
    fn test_unknown_status() {
        let mut result = OracleResult::decode_value(&RESULT_1).unwrap();
        result.resolve_status = 9;
        assert!(result.status().is_err());
    }
}
