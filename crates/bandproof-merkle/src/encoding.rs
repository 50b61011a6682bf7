//! varints and the protobuf encodings that end up under a hash
//!
//! Header leaves are hashed over the gogoproto "cdc" wrappers
//! (`Int64Value`, `BytesValue`, `StringValue`), and IAVL nodes over Go's
//! zigzag `binary.PutVarint`. Getting a single byte wrong here breaks every
//! hash downstream, so everything goes through prost where it can.

use prost::Message;
use prost_types::Timestamp;

use crate::error::{MerkleError, Result};

#[derive(Clone, PartialEq, Message)]
struct Int64Value {
    #[prost(int64, tag = "1")]
    value: i64,
}

#[derive(Clone, PartialEq, Message)]
struct BytesValue {
    #[prost(bytes = "vec", tag = "1")]
    value: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
struct StringValue {
    #[prost(string, tag = "1")]
    value: String,
}

pub fn put_uvarint(buf: &mut Vec<u8>, n: u64) {
    prost::encoding::encode_varint(n, buf);
}

pub fn uvarint(n: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(prost::encoding::encoded_len_varint(n));
    put_uvarint(&mut buf, n);
    buf
}

/// zigzag signed varint, byte-compatible with Go's `binary.PutVarint`
pub fn put_varint(buf: &mut Vec<u8>, n: i64) {
    put_uvarint(buf, ((n << 1) ^ (n >> 63)) as u64);
}

pub fn varint(n: i64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(10);
    put_varint(&mut buf, n);
    buf
}

/// Decode an unsigned varint, returning the value and bytes consumed.
pub fn read_uvarint(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut cursor = bytes;
    let value = prost::encoding::decode_varint(&mut cursor)?;
    Ok((value, bytes.len() - cursor.len()))
}

/// Decode a zigzag signed varint, returning the value and bytes consumed.
pub fn read_varint(bytes: &[u8]) -> Result<(i64, usize)> {
    let (raw, n) = read_uvarint(bytes)?;
    let value = ((raw >> 1) as i64) ^ -((raw & 1) as i64);
    Ok((value, n))
}

/// `uvarint(len(data)) || data`
pub fn put_length_prefixed(buf: &mut Vec<u8>, data: &[u8]) {
    put_uvarint(buf, data.len() as u64);
    buf.extend_from_slice(data);
}

pub fn cdc_encode_i64(value: i64) -> Vec<u8> {
    Int64Value { value }.encode_to_vec()
}

pub fn cdc_encode_bytes(value: &[u8]) -> Vec<u8> {
    BytesValue {
        value: value.to_vec(),
    }
    .encode_to_vec()
}

pub fn cdc_encode_str(value: &str) -> Vec<u8> {
    StringValue {
        value: value.to_string(),
    }
    .encode_to_vec()
}

/// Range-checked conversion into a protobuf `Timestamp`.
pub fn timestamp(seconds: u64, nanos: u32) -> Result<Timestamp> {
    let seconds = i64::try_from(seconds)
        .map_err(|_| MerkleError::malformed(format!("time seconds {} out of range", seconds)))?;
    if nanos >= 1_000_000_000 {
        return Err(MerkleError::malformed(format!(
            "time nanos {} out of range",
            nanos
        )));
    }
    Ok(Timestamp {
        seconds,
        nanos: nanos as i32,
    })
}

/// `google.protobuf.Timestamp` with zero fields omitted
pub fn encode_time(seconds: u64, nanos: u32) -> Result<Vec<u8>> {
    Ok(timestamp(seconds, nanos)?.encode_to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_uvarint() {
        assert_eq!(uvarint(0), vec![0x00]);
        assert_eq!(uvarint(127), vec![0x7f]);
        assert_eq!(uvarint(300), vec![0xac, 0x02]);
        assert_eq!(read_uvarint(&[0xac, 0x02, 0xff]).unwrap(), (300, 2));
    }

    #[test]
    fn test_zigzag_varint_matches_go() {
        assert_eq!(varint(0), vec![0x00]);
        assert_eq!(varint(1), vec![0x02]);
        assert_eq!(varint(-1), vec![0x01]);
        assert_eq!(varint(217), hex!("b203"));
        assert_eq!(varint(25000), hex!("d08603"));
        for n in [0i64, 1, -1, 217, 25000, i64::MAX, i64::MIN] {
            let enc = varint(n);
            assert_eq!(read_varint(&enc).unwrap(), (n, enc.len()));
        }
    }

    #[test]
    fn test_truncated_varint_is_error() {
        assert!(read_uvarint(&[0x80]).is_err());
        assert!(read_varint(&[]).is_err());
    }

    #[test]
    fn test_cdc_wrappers() {
        assert_eq!(cdc_encode_i64(25000), hex!("08a8c301"));
        assert!(cdc_encode_i64(0).is_empty());
        assert_eq!(cdc_encode_str("bandchain"), hex!("0a0962616e64636861696e"));
        assert!(cdc_encode_str("").is_empty());
        assert_eq!(cdc_encode_bytes(&[0xab; 2]), hex!("0a02abab"));
        assert!(cdc_encode_bytes(&[]).is_empty());
    }

    #[test]
    fn test_encode_time() {
        assert_eq!(
            encode_time(1629849933, 128300266).unwrap(),
            hex!("08cd9296890610eae9963d")
        );
        assert_eq!(encode_time(5, 0).unwrap(), hex!("0805"));
        assert!(encode_time(0, 0).unwrap().is_empty());
        assert!(encode_time(1, 1_000_000_000).is_err());
    }
}
