//! Conversion of raw little-endian byte windows into primitive values and text.
//!
//! Every function here expects the caller to have sliced a window of the right
//! length; passing a shorter slice is a programming error and panics.
use std::mem;

/// Decoding of a fixed-width little-endian value from the start of a slice.
pub trait FromLittleEndianSlice {
    /// Decodes `Self` from the first `size_of::<Self>()` bytes of `slice`.
    ///
    /// # Panics
    /// This function panics if `slice` is shorter than `size_of::<Self>()`.
    fn from_le_slice(slice: &[u8]) -> Self;
}

macro_rules! impl_from_le_slice {
    ($($ty:ty),+) => {
        $(
            impl FromLittleEndianSlice for $ty {
                fn from_le_slice(slice: &[u8]) -> Self {
                    let mut bytes = [0u8; mem::size_of::<$ty>()];
                    bytes.copy_from_slice(&slice[..mem::size_of::<$ty>()]);
                    Self::from_le_bytes(bytes)
                }
            }
        )+
    };
}

impl_from_le_slice!(i16, u16, u32, i64, f64);

/// Decodes a two's-complement little-endian `i64`.
pub fn decode_i64(bytes: &[u8]) -> i64 {
    i64::from_le_slice(bytes)
}

/// Decodes a little-endian `u32`.
pub fn decode_u32(bytes: &[u8]) -> u32 {
    u32::from_le_slice(bytes)
}

/// Decodes a little-endian `u16`.
pub fn decode_u16(bytes: &[u8]) -> u16 {
    u16::from_le_slice(bytes)
}

/// Decodes a two's-complement little-endian `i16`.
pub fn decode_i16(bytes: &[u8]) -> i16 {
    i16::from_le_slice(bytes)
}

/// Decodes a little-endian IEEE-754 binary64, preserving the exact bit pattern.
pub fn decode_f64(bytes: &[u8]) -> f64 {
    f64::from_le_slice(bytes)
}

/// Decodes `bytes` as UTF-16LE code units. Trailing NUL code units are preserved;
/// unpaired surrogates are replaced with U+FFFD. A trailing odd byte is ignored.
pub fn decode_unicode_str(bytes: &[u8]) -> String {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Decodes `bytes` with each byte mapped to the character with the same code
/// point (Latin-1 passthrough).
pub fn decode_ascii_str(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encodes `s` as UTF-16LE into a window of exactly `len` bytes, zero-padding or
/// truncating at a code-unit boundary.
pub fn encode_unicode_str(s: &str, len: usize) -> Vec<u8> {
    let mut res: Vec<u8> = s.encode_utf16().flat_map(u16::to_le_bytes).collect();
    res.truncate(len - len % 2);
    res.resize(len, 0);
    res
}

/// Encodes `s` one byte per character into a window of exactly `len` bytes.
/// Characters above U+00FF are replaced with `?`.
pub fn encode_ascii_str(s: &str, len: usize) -> Vec<u8> {
    let mut res: Vec<u8> = s
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect();
    res.resize(len, 0);
    res
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(-1)]
    #[case(i64::MIN)]
    #[case(i64::MAX)]
    #[case(1_609_430_400)]
    fn test_decode_i64(#[case] v: i64) {
        assert_eq!(decode_i64(&v.to_le_bytes()), v);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.0)]
    #[case(12.345)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    #[case(f64::MIN_POSITIVE)]
    fn test_decode_f64_bit_exact(#[case] v: f64) {
        assert_eq!(decode_f64(&v.to_le_bytes()).to_bits(), v.to_bits());
    }

    #[test]
    fn test_decode_f64_nan_payload() {
        let bits = 0x7FF8_0000_DEAD_BEEFu64;
        assert_eq!(decode_f64(&bits.to_le_bytes()).to_bits(), bits);
    }

    #[test]
    fn test_decode_unsigned() {
        assert_eq!(decode_u32(&[0x01, 0x02, 0x03, 0x04]), 0x0403_0201);
        assert_eq!(decode_u32(&u32::MAX.to_le_bytes()), u32::MAX);
        assert_eq!(decode_u16(&[0x18, 0x00]), 24);
        assert_eq!(decode_i16(&[0xFF, 0xFF]), -1);
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        assert_eq!(decode_u16(&[0x07, 0x00, 0xAA, 0xBB]), 7);
    }

    #[test]
    #[should_panic]
    fn test_decode_short_slice_panics() {
        decode_i64(&[0; 4]);
    }

    #[test]
    fn test_decode_unicode_str() {
        // 平安银行 followed by 4 NUL code units
        let bytes = [
            0x73, 0x5E, 0x89, 0x5B, 0xF6, 0x94, 0x4C, 0x88, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        assert_eq!(decode_unicode_str(&bytes), "平安银行\0\0\0\0");
    }

    #[test]
    fn test_decode_unicode_str_unit() {
        assert_eq!(decode_unicode_str(&[0x43, 0x00, 0x4E, 0x00]), "CN");
        assert_eq!(decode_unicode_str(&[0x00, 0xD8]), "\u{FFFD}");
    }

    #[test]
    fn test_decode_ascii_str() {
        assert_eq!(decode_ascii_str(b"SZ"), "SZ");
        assert_eq!(decode_ascii_str(&[b'q']), "q");
        assert_eq!(decode_ascii_str(&[0xE9]), "\u{E9}");
    }

    #[test]
    fn test_encode_unicode_str() {
        let encoded = encode_unicode_str("平安银行", 16);
        assert_eq!(encoded.len(), 16);
        assert_eq!(decode_unicode_str(&encoded), "平安银行\0\0\0\0");
        assert_eq!(encode_unicode_str("ABCDEFGHIJ", 4), vec![b'A', 0, b'B', 0]);
    }

    #[test]
    fn test_encode_ascii_str() {
        assert_eq!(encode_ascii_str("SH", 2), b"SH".to_vec());
        assert_eq!(encode_ascii_str("T", 1), b"T".to_vec());
        assert_eq!(encode_ascii_str("", 2), vec![0, 0]);
    }
}
