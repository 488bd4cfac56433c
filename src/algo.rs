//! Algorithm string parsing
//!
//! Configuration documents name algorithms as loose combo strings such as
//! `RSA2048`, `RSA-2048`, `SHA256+RSA2048` or `SHA256+ECCprime256v1`. The
//! cipher and hash halves are picked out of the `+`-separated pieces
//! independently.

use std::fmt;
use std::str::FromStr;

use crate::error::{BuildError, Result};

/// Asymmetric key algorithm choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAlgorithm {
    /// RSA with the given modulus length in bits
    Rsa(u32),
    /// ECC with a named curve, e.g. `prime256v1`
    Ecc(String),
}

impl KeyAlgorithm {
    /// Label introducing the raw key bytes in the tool's textual key dump.
    pub fn dump_label(&self) -> &'static str {
        match self {
            Self::Rsa(_) => "Modulus",
            Self::Ecc(_) => "pub",
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsa(bits) => write!(f, "RSA{bits}"),
            Self::Ecc(curve) => write!(f, "ECC{curve}"),
        }
    }
}

/// Digest algorithms accepted for hash and signature segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Name understood by the external tool's digest command.
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Digest length in bytes.
    pub fn digest_len(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tool_name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(BuildError::unsupported_algorithm(s)),
        }
    }
}

/// Pick the cipher half out of an algorithm combo string.
pub fn parse_key_algorithm(spec: &str) -> Result<KeyAlgorithm> {
    for part in spec.split('+').map(str::trim) {
        let upper = part.to_ascii_uppercase();
        let param = if upper.starts_with("RSA") || upper.starts_with("ECC") {
            part[3..].trim_start_matches('-').to_ascii_lowercase()
        } else {
            continue;
        };

        if upper.starts_with("RSA") {
            if let Ok(bits) = param.parse::<u32>() {
                return Ok(KeyAlgorithm::Rsa(bits));
            }
        } else if !param.is_empty() {
            return Ok(KeyAlgorithm::Ecc(param));
        }
        break;
    }
    Err(BuildError::unsupported_algorithm(spec))
}

/// Pick the hash half out of an algorithm combo string.
pub fn parse_hash_algorithm(spec: &str) -> Result<HashAlgorithm> {
    for part in spec.split('+') {
        if let Ok(hash) = part.parse::<HashAlgorithm>() {
            return Ok(hash);
        }
    }
    Err(BuildError::unsupported_algorithm(spec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rsa() {
        assert_eq!(parse_key_algorithm("RSA2048").unwrap(), KeyAlgorithm::Rsa(2048));
        assert_eq!(parse_key_algorithm("RSA-4096").unwrap(), KeyAlgorithm::Rsa(4096));
        assert_eq!(parse_key_algorithm("rsa3072").unwrap(), KeyAlgorithm::Rsa(3072));
    }

    #[test]
    fn test_parse_ecc() {
        assert_eq!(
            parse_key_algorithm("ECCprime256v1").unwrap(),
            KeyAlgorithm::Ecc("prime256v1".into())
        );
        assert_eq!(
            parse_key_algorithm("ECC-secp384r1").unwrap(),
            KeyAlgorithm::Ecc("secp384r1".into())
        );
    }

    #[test]
    fn test_parse_combo() {
        assert_eq!(
            parse_key_algorithm("SHA256+RSA2048").unwrap(),
            KeyAlgorithm::Rsa(2048)
        );
        assert_eq!(
            parse_hash_algorithm("SHA256+RSA2048").unwrap(),
            HashAlgorithm::Sha256
        );
        assert_eq!(
            parse_hash_algorithm("sha512+ECCprime256v1").unwrap(),
            HashAlgorithm::Sha512
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(parse_key_algorithm("DSA1024").is_err());
        assert!(parse_key_algorithm("RSAbig").is_err());
        assert!(parse_key_algorithm("ECC").is_err());
        assert!(parse_hash_algorithm("RSA2048").is_err());
        assert!(parse_hash_algorithm("md5").is_err());
    }

    #[test]
    fn test_dump_label() {
        assert_eq!(KeyAlgorithm::Rsa(2048).dump_label(), "Modulus");
        assert_eq!(KeyAlgorithm::Ecc("prime256v1".into()).dump_label(), "pub");
    }

    #[test]
    fn test_digest_len() {
        assert_eq!(HashAlgorithm::Sha256.digest_len(), 32);
        assert_eq!(HashAlgorithm::Sha384.digest_len(), 48);
        assert_eq!(HashAlgorithm::Sha512.digest_len(), 64);
    }
}
