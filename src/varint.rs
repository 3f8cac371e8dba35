//! Variable-length integer encoding (base-128 varint) and zig-zag transforms
//!
//! Varints are the backbone of the update wire format: tags, lengths, and
//! integer values are all base-128 encoded, 7 value bits per byte with the
//! high bit set while more bytes follow. The `len_*` functions compute the
//! exact encoded byte count without writing, which the encoders use to
//! precalculate length prefixes for nested submessages.

use crate::error::{Error, Result};

/// Maximum bytes needed for a u32 varint (5 bytes)
pub const MAX_VARINT_U32_SIZE: usize = 5;

/// Maximum bytes needed for a u64 varint (10 bytes)
pub const MAX_VARINT_U64_SIZE: usize = 10;

/// Encode a u32 as varint into the given buffer
///
/// Returns the number of bytes written, or Error::Allocation if insufficient space.
#[inline]
pub fn encode_u32(value: u32, buf: &mut [u8]) -> Result<usize> {
    let mut value = value;
    let mut pos = 0;

    loop {
        if pos >= buf.len() {
            return Err(Error::Allocation);
        }

        if value < 0x80 {
            buf[pos] = value as u8;
            return Ok(pos + 1);
        }

        buf[pos] = (value as u8) | 0x80;
        value >>= 7;
        pos += 1;
    }
}

/// Encode a u64 as varint into the given buffer
///
/// Returns the number of bytes written, or Error::Allocation if insufficient space.
#[inline]
pub fn encode_u64(value: u64, buf: &mut [u8]) -> Result<usize> {
    let mut value = value;
    let mut pos = 0;

    loop {
        if pos >= buf.len() {
            return Err(Error::Allocation);
        }

        if value < 0x80 {
            buf[pos] = value as u8;
            return Ok(pos + 1);
        }

        buf[pos] = (value as u8) | 0x80;
        value >>= 7;
        pos += 1;
    }
}

/// Decode a u32 varint from the given buffer
///
/// Returns (value, bytes_consumed). Errors on a truncated varint. The update
/// encoder itself never decodes; this is the inverse used by tests and
/// diagnostic tooling.
#[inline]
pub fn decode_u32(buf: &[u8]) -> Result<(u32, usize)> {
    let mut result = 0u32;
    let mut shift = 0;
    let mut pos = 0;

    loop {
        if pos >= buf.len() || shift >= 32 {
            return Err(Error::Truncated);
        }

        let byte = buf[pos];
        pos += 1;

        result |= ((byte & 0x7F) as u32) << shift;

        if byte & 0x80 == 0 {
            return Ok((result, pos));
        }

        shift += 7;
    }
}

/// Decode a u64 varint from the given buffer
///
/// Returns (value, bytes_consumed). Errors on a truncated varint.
#[inline]
pub fn decode_u64(buf: &[u8]) -> Result<(u64, usize)> {
    let mut result = 0u64;
    let mut shift = 0;
    let mut pos = 0;

    loop {
        if pos >= buf.len() || shift >= 64 {
            return Err(Error::Truncated);
        }

        let byte = buf[pos];
        pos += 1;

        result |= ((byte & 0x7F) as u64) << shift;

        if byte & 0x80 == 0 {
            return Ok((result, pos));
        }

        shift += 7;
    }
}

/// Exact varint-encoded length of a u32 in bytes (1..=5)
///
/// Zero still takes one byte on the wire.
#[inline]
pub const fn len_u32(value: u32) -> usize {
    let mut value = value;
    let mut count = 0;
    loop {
        count += 1;
        value >>= 7;
        if value == 0 {
            return count;
        }
    }
}

/// Exact varint-encoded length of a u64 in bytes (1..=10)
#[inline]
pub const fn len_u64(value: u64) -> usize {
    let mut value = value;
    let mut count = 0;
    loop {
        count += 1;
        value >>= 7;
        if value == 0 {
            return count;
        }
    }
}

/// Zig-zag transform an i32 so small-magnitude values encode short
///
/// Maps 0, -1, 1, -2, ... to 0, 1, 2, 3, ...
#[inline]
pub const fn zigzag32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Zig-zag transform an i64
#[inline]
pub const fn zigzag64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag32`]
#[inline]
pub const fn unzigzag32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Inverse of [`zigzag64`]
#[inline]
pub const fn unzigzag64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u32_roundtrip() {
        let test_values = [0, 1, 127, 128, 16383, 16384, u32::MAX];

        for &val in &test_values {
            let mut buf = [0u8; MAX_VARINT_U32_SIZE];
            let encoded_len = encode_u32(val, &mut buf).unwrap();
            let (decoded_val, decoded_len) = decode_u32(&buf[..encoded_len]).unwrap();

            assert_eq!(val, decoded_val);
            assert_eq!(encoded_len, decoded_len);
            assert_eq!(encoded_len, len_u32(val));
        }
    }

    #[test]
    fn test_u64_roundtrip() {
        let test_values = [0, 1, 127, 128, 16383, 16384, u32::MAX as u64, u64::MAX];

        for &val in &test_values {
            let mut buf = [0u8; MAX_VARINT_U64_SIZE];
            let encoded_len = encode_u64(val, &mut buf).unwrap();
            let (decoded_val, decoded_len) = decode_u64(&buf[..encoded_len]).unwrap();

            assert_eq!(val, decoded_val);
            assert_eq!(encoded_len, decoded_len);
            assert_eq!(encoded_len, len_u64(val));
        }
    }

    #[test]
    fn test_zero_is_one_byte() {
        let mut buf = [0xAAu8; MAX_VARINT_U32_SIZE];
        assert_eq!(encode_u32(0, &mut buf).unwrap(), 1);
        assert_eq!(buf[0], 0x00);
        assert_eq!(len_u32(0), 1);
        assert_eq!(len_u64(0), 1);
    }

    #[test]
    fn test_length_grows_per_7_bits() {
        assert_eq!(len_u32(127), 1);
        assert_eq!(len_u32(128), 2);
        assert_eq!(len_u32(16383), 2);
        assert_eq!(len_u32(16384), 3);
        assert_eq!(len_u32(u32::MAX), 5);
        assert_eq!(len_u64(u64::MAX), 10);
    }

    #[test]
    fn test_zigzag_bijection() {
        let values = [0, 1, -1, 2, -2, 63, -64, i32::MAX, i32::MIN];
        for &v in &values {
            assert_eq!(unzigzag32(zigzag32(v)), v);
        }

        let values64 = [0, 1, -1, i64::from(i32::MIN), i64::MAX, i64::MIN];
        for &v in &values64 {
            assert_eq!(unzigzag64(zigzag64(v)), v);
        }
    }

    #[test]
    fn test_zigzag_small_negatives_stay_small() {
        assert_eq!(zigzag32(0), 0);
        assert_eq!(zigzag32(-1), 1);
        assert_eq!(zigzag32(1), 2);
        assert_eq!(zigzag32(-2), 3);
        assert_eq!(zigzag64(-1), 1);
        assert_eq!(len_u32(zigzag32(-1)), 1);
    }

    #[test]
    fn test_buffer_too_small() {
        let mut buf = [0u8; 2]; // Too small for large values
        assert_eq!(encode_u32(u32::MAX, &mut buf), Err(Error::Allocation));
    }

    #[test]
    fn test_truncated_varint() {
        let buf = [0x80]; // Continuation bit set but no next byte
        assert_eq!(decode_u32(&buf), Err(Error::Truncated));
        assert_eq!(decode_u64(&buf), Err(Error::Truncated));
    }
}
