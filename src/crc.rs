//! CRC-32 helpers
//!
//! Thin wrappers over `crc32fast` using the standard zlib/gzip polynomial.

/// Calculate the CRC-32 of a byte slice in one shot.
pub fn calculate_crc32(data: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(data);
    crc.finalize()
}

/// Streaming CRC-32 state.
///
/// Feeding several payloads through one `Crc32` yields the checksum of their
/// concatenation, which is what chained `crc32(a+b)` field expressions need.
#[derive(Clone)]
pub struct Crc32 {
    hasher: crc32fast::Hasher,
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc32 {
    pub fn new() -> Self {
        Self {
            hasher: crc32fast::Hasher::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    pub fn finalize(self) -> u32 {
        self.hasher.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(calculate_crc32(b""), 0);
        assert_eq!(calculate_crc32(b"abc"), 0x3524_41C2);
        assert_eq!(calculate_crc32(b"hello world"), 0x0D4A_1185);
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let a = b"first payload";
        let b = b"second payload";
        let mut whole = a.to_vec();
        whole.extend_from_slice(b);

        let mut crc = Crc32::new();
        crc.update(a);
        crc.update(b);
        assert_eq!(crc.finalize(), calculate_crc32(&whole));
    }
}
