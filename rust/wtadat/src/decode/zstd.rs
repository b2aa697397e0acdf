use crate::codec::decode_u32;

/// Magic number for the beginning of a Zstandard frame.
const ZSTD_MAGIC_NUMBER: u32 = 0xFD2FB528;

/// Returns `true` if `bytes` starts with a Zstandard frame.
pub fn starts_with_prefix(bytes: &[u8]) -> bool {
    if bytes.len() < 4 {
        return false;
    }
    decode_u32(&bytes[..4]) == ZSTD_MAGIC_NUMBER
}
