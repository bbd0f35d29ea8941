//! Order-preserving key encoding.
//!
//! Every key stored in the engine is a concatenation of fixed-width
//! big-endian integers and raw bytes, so the engine's lexicographic
//! ordering matches the numeric ordering of the components. Byte strings
//! are length-prefixed so that a composite `(type, job_key)` key can be
//! split without a delimiter scan.
//!
//! Decoders borrow from the caller's buffer and never copy.

use thiserror::Error;

/// Width of an encoded `u64` component.
pub const U64_LEN: usize = 8;
/// Width of an encoded `u16` component (column family discriminators).
pub const U16_LEN: usize = 2;
/// Width of the length prefix in front of an encoded byte string.
pub const BYTES_LEN_PREFIX: usize = 4;

/// A key could not be decoded from the stored bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("corrupt key: truncated while reading {0}")]
    Truncated(&'static str),
    #[error("corrupt key: {0} trailing bytes after the last component")]
    TrailingBytes(usize),
}

pub fn encode_u64(dst: &mut Vec<u8>, value: u64) {
    dst.extend_from_slice(&value.to_be_bytes());
}

pub fn encode_u16(dst: &mut Vec<u8>, value: u16) {
    dst.extend_from_slice(&value.to_be_bytes());
}

/// Append a length-prefixed byte string.
pub fn encode_bytes(dst: &mut Vec<u8>, bytes: &[u8]) {
    dst.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    dst.extend_from_slice(bytes);
}

/// Read a `u64` component, returning it and the remainder of the buffer.
pub fn decode_u64<'a>(buf: &'a [u8], context: &'static str) -> Result<(u64, &'a [u8]), KeyError> {
    if buf.len() < U64_LEN {
        return Err(KeyError::Truncated(context));
    }
    let (head, rest) = buf.split_at(U64_LEN);
    let mut raw = [0u8; U64_LEN];
    raw.copy_from_slice(head);
    Ok((u64::from_be_bytes(raw), rest))
}

pub fn decode_u16<'a>(buf: &'a [u8], context: &'static str) -> Result<(u16, &'a [u8]), KeyError> {
    if buf.len() < U16_LEN {
        return Err(KeyError::Truncated(context));
    }
    let (head, rest) = buf.split_at(U16_LEN);
    let mut raw = [0u8; U16_LEN];
    raw.copy_from_slice(head);
    Ok((u16::from_be_bytes(raw), rest))
}

/// Read a length-prefixed byte string, returning it and the remainder.
pub fn decode_bytes<'a>(
    buf: &'a [u8],
    context: &'static str,
) -> Result<(&'a [u8], &'a [u8]), KeyError> {
    if buf.len() < BYTES_LEN_PREFIX {
        return Err(KeyError::Truncated(context));
    }
    let (head, rest) = buf.split_at(BYTES_LEN_PREFIX);
    let mut raw = [0u8; BYTES_LEN_PREFIX];
    raw.copy_from_slice(head);
    let len = u32::from_be_bytes(raw) as usize;
    if rest.len() < len {
        return Err(KeyError::Truncated(context));
    }
    Ok(rest.split_at(len))
}

fn expect_empty(rest: &[u8]) -> Result<(), KeyError> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(KeyError::TrailingBytes(rest.len()))
    }
}

/// The key for a job's primary record and for its lifecycle state.
pub fn job_key(key: u64) -> Vec<u8> {
    key.to_be_bytes().to_vec()
}

/// Parse a primary `job_key` key.
pub fn parse_job_key(buf: &[u8]) -> Result<u64, KeyError> {
    let (key, rest) = decode_u64(buf, "job key")?;
    expect_empty(rest)?;
    Ok(key)
}

/// Composite key for the activatable index: `(type, job_key)`, grouped by
/// type and ordered by job key within a type.
pub fn type_job_key(job_type: &[u8], key: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(BYTES_LEN_PREFIX + job_type.len() + U64_LEN);
    encode_bytes(&mut out, job_type);
    encode_u64(&mut out, key);
    out
}

/// Prefix covering every activatable entry of one job type.
pub fn type_prefix(job_type: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(BYTES_LEN_PREFIX + job_type.len());
    encode_bytes(&mut out, job_type);
    out
}

/// Parse an activatable index key into `(type, job_key)`.
pub fn parse_type_job_key(buf: &[u8]) -> Result<(&[u8], u64), KeyError> {
    let (job_type, rest) = decode_bytes(buf, "job type")?;
    let (key, rest) = decode_u64(rest, "job key")?;
    expect_empty(rest)?;
    Ok((job_type, key))
}

/// Composite key for the deadline and backoff indexes: `(time, job_key)`,
/// ordered by time ascending.
pub fn due_time_job_key(due_time: u64, key: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 * U64_LEN);
    encode_u64(&mut out, due_time);
    encode_u64(&mut out, key);
    out
}

/// Parse a deadline or backoff index key into `(time, job_key)`.
pub fn parse_due_time_job_key(buf: &[u8]) -> Result<(u64, u64), KeyError> {
    let (due_time, rest) = decode_u64(buf, "due time")?;
    let (key, rest) = decode_u64(rest, "job key")?;
    expect_empty(rest)?;
    Ok((due_time, key))
}
