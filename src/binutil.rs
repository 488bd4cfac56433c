//! Stateless byte-level primitives
//!
//! Little-endian integer encoding, alignment padding, the 32-bit running sum
//! and magic-string conversion. All functions here are pure.

use byteorder::{ByteOrder, LittleEndian};

/// Encode a non-negative integer as a minimal-width little-endian byte string.
///
/// The width is the smallest even number of nibbles that holds the value, so
/// `256` encodes as `[0x00, 0x01]` and `0` as a single zero byte.
pub fn int_to_le_bytes(value: u64) -> Vec<u8> {
    let mut bytes = value.to_le_bytes().to_vec();
    while bytes.len() > 1 && bytes[bytes.len() - 1] == 0 {
        bytes.pop();
    }
    bytes
}

/// Pad `data` with zero bytes up to the next multiple of `align_size`.
///
/// An `align_size` of 0 or 1 leaves the data untouched. Alignment only ever
/// rounds up, so the shrink branch is a contract violation kept as a guard.
pub fn align(mut data: Vec<u8>, align_size: usize) -> Vec<u8> {
    let mut size = data.len();
    if align_size > 1 {
        size = data.len().div_ceil(align_size) * align_size;
    }
    if size > data.len() {
        data.resize(size, 0);
    } else if size != 0 && size < data.len() {
        log::error!("payload of {} bytes exceeds aligned size {}", data.len(), size);
        data.truncate(size);
    }
    data
}

/// Sum of `data` read as consecutive little-endian u32 words, mod 2^32.
///
/// Trailing bytes that do not fill a whole word are dropped.
pub fn running_sum32(data: &[u8]) -> u32 {
    data.chunks_exact(4)
        .fold(0u32, |acc, word| acc.wrapping_add(LittleEndian::read_u32(word)))
}

/// Convert a magic string to an integer with its first byte least significant.
pub fn magic_to_int(magic: &str) -> u128 {
    magic
        .bytes()
        .take(16)
        .enumerate()
        .fold(0u128, |acc, (i, b)| acc | (u128::from(b) << (8 * i)))
}

/// Parse a non-negative integer accepting `0x`/`0o`/`0b` base prefixes.
pub fn parse_int(input: &str) -> Option<u64> {
    let input = input.trim();
    let (digits, radix) = if let Some(hex) = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        (hex, 16)
    } else if let Some(oct) = input.strip_prefix("0o").or_else(|| input.strip_prefix("0O")) {
        (oct, 8)
    } else if let Some(bin) = input.strip_prefix("0b").or_else(|| input.strip_prefix("0B")) {
        (bin, 2)
    } else {
        (input, 10)
    };
    u64::from_str_radix(digits, radix).ok()
}
