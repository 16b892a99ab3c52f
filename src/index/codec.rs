use crate::error::{Error, Result};

/// Size of one offset record on disk.
pub const RECORD_SIZE: usize = 8;

/// Encode a line-start offset as a fixed 8-byte big-endian record.
#[inline]
pub fn encode_offset(value: u64) -> [u8; RECORD_SIZE] {
    value.to_be_bytes()
}

/// Decode a fixed 8-byte big-endian record back into an offset.
///
/// Fails if the buffer is not exactly one record long.
pub fn decode_offset(buf: &[u8]) -> Result<u64> {
    let bytes: [u8; RECORD_SIZE] = buf
        .try_into()
        .map_err(|_| Error::Format(format!("offset record must be {RECORD_SIZE} bytes, got {}", buf.len())))?;
    Ok(u64::from_be_bytes(bytes))
}
