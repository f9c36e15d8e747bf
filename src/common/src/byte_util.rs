//! Fixed-width big-endian encoding used for fragment metadata.
//!
//! Bounds are glued together as two fixed-width fields so that a worker can
//! rebuild them knowing only the partition type.
use crate::FragmenterError;
use std::convert::TryInto;

/// Width of an encoded `i32`.
pub const I32_LEN: usize = 4;
/// Width of an encoded `i64`.
pub const I64_LEN: usize = 8;

/// Encodes an `i32` as 4 big-endian two's-complement bytes.
pub fn encode_i32(x: i32) -> [u8; I32_LEN] {
    x.to_be_bytes()
}

/// Encodes an `i64` as 8 big-endian two's-complement bytes.
pub fn encode_i64(x: i64) -> [u8; I64_LEN] {
    x.to_be_bytes()
}

/// Decodes 4 big-endian bytes into an `i32`.
///
/// # Arguments
///
/// * `bytes` - Exactly 4 bytes.
pub fn decode_i32(bytes: &[u8]) -> Result<i32, FragmenterError> {
    let arr: [u8; I32_LEN] = bytes.try_into().map_err(|_| length_mismatch(I32_LEN, bytes))?;
    Ok(i32::from_be_bytes(arr))
}

/// Decodes 8 big-endian bytes into an `i64`.
///
/// # Arguments
///
/// * `bytes` - Exactly 8 bytes.
pub fn decode_i64(bytes: &[u8]) -> Result<i64, FragmenterError> {
    let arr: [u8; I64_LEN] = bytes.try_into().map_err(|_| length_mismatch(I64_LEN, bytes))?;
    Ok(i64::from_be_bytes(arr))
}

/// Concatenates two byte blobs.
pub fn concat(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut merged = Vec::with_capacity(a.len() + b.len());
    merged.extend_from_slice(a);
    merged.extend_from_slice(b);
    merged
}

/// Splits `bytes` into `bytes[0..n)` and `bytes[n..)`.
///
/// # Arguments
///
/// * `bytes` - Blob to split.
/// * `n` - Offset of the split, must not exceed the blob length.
pub fn split(bytes: &[u8], n: usize) -> Result<(&[u8], &[u8]), FragmenterError> {
    if bytes.len() < n {
        return Err(FragmenterError::MalformedMetadata(format!(
            "cannot split {} bytes at offset {}",
            bytes.len(),
            n
        )));
    }
    Ok(bytes.split_at(n))
}

fn length_mismatch(expected: usize, bytes: &[u8]) -> FragmenterError {
    FragmenterError::MalformedMetadata(format!(
        "expected {} bytes, got {}",
        expected,
        bytes.len()
    ))
}
