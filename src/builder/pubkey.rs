//! Public-key segment builder
//!
//! Obtains or generates an asymmetric key pair and embeds the raw public-key
//! byte string in the image. The bytes are pulled out of the external tool's
//! textual key dump with a label-specific pattern, so the exact dump format
//! is an openssl-version dependency (see [`crate::openssl`]).

use log::debug;
use regex::Regex;

use crate::algo;
use crate::binutil;
use crate::config::PubKeyParams;
use crate::error::{BuildError, Result};

use super::BuildContext;

pub fn build(ctx: &mut BuildContext, params: &PubKeyParams) -> Result<Vec<u8>> {
    // Key material is never regenerated within a run.
    if let Some(record) = ctx.store.get(&params.name) {
        debug!("key pair `{}` already built", params.name);
        return Ok(record.payload.clone());
    }

    let algorithm = algo::parse_key_algorithm(&params.algorithm)?;

    let mut private = None;
    let mut public = None;
    if !params.source.is_empty() {
        let path = ctx.base_dir.join(&params.source);
        if path.is_file() {
            let text = std::fs::read_to_string(&path)?;
            let first_line = text.lines().next().unwrap_or("");
            if first_line.contains("PRIVATE KEY") {
                private = Some(path);
            } else if first_line.contains("PUBLIC KEY") {
                public = Some(path);
            } else {
                return Err(BuildError::InvalidKeyFile { path });
            }
        }
    }

    let public = match public {
        Some(path) => path,
        None => {
            let private_path = match &private {
                Some(path) => path.clone(),
                None => {
                    let path = ctx.key_file_path(&format!("{}_prv", params.name))?;
                    ctx.tool.generate_private_key(&path, &algorithm)?;
                    private = Some(path.clone());
                    path
                }
            };
            let path = ctx.key_file_path(&format!("{}_pub", params.name))?;
            ctx.tool.derive_public_key(&private_path, &path, &algorithm)?;
            path
        }
    };

    let dump = ctx.new_temp_file()?;
    ctx.tool.dump_public_key_text(&public, &dump, &algorithm)?;
    ctx.store.put_key_pair(&params.name, private, public);

    let text = std::fs::read_to_string(&dump)?;
    let payload = binutil::align(
        extract_public_key(&text, algorithm.dump_label())?,
        params.align,
    );
    ctx.store.put(&params.name, payload.clone());
    Ok(payload)
}

/// Pull the colon-separated hex byte run following `label` out of the tool's
/// key dump, stripping a single leading zero byte (ASN.1 sign padding).
fn extract_public_key(text: &str, label: &str) -> Result<Vec<u8>> {
    let pattern = Regex::new(&format!(r"{label}((:\s*[0-9a-fA-F]{{2}}){{8,}})"))
        .map_err(|_| BuildError::key_extraction(label))?;
    let caps = pattern
        .captures(text)
        .ok_or_else(|| BuildError::key_extraction(label))?;
    let run = &caps[1];

    let mut bytes = Vec::new();
    for piece in run[1..].split(':') {
        let byte = u8::from_str_radix(piece.trim(), 16)
            .map_err(|_| BuildError::key_extraction(label))?;
        bytes.push(byte);
    }
    if bytes.first() == Some(&0) {
        bytes.remove(0);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSA_DUMP: &str = "\
RSA Public-Key: (2048 bit)
Modulus:
    00:c3:5f:10:2a:9b:44:7e:81:55:0f:36:d0:22:aa:
    19:28:74:bd:01:6e
Exponent: 65537 (0x10001)
";

    const ECC_DUMP: &str = "\
Public-Key: (256 bit)
pub:
    04:8f:3a:d2:90:17:66:b5:c8:e4:21:0b:5d:aa:f0:
    33:71
ASN1 OID: prime256v1
NIST CURVE: P-256
";

    #[test]
    fn test_extract_rsa_modulus() {
        let bytes = extract_public_key(RSA_DUMP, "Modulus").unwrap();
        // leading zero byte stripped
        assert_eq!(bytes[0], 0xC3);
        assert_eq!(bytes.len(), 20);
        assert_eq!(*bytes.last().unwrap(), 0x6E);
    }

    #[test]
    fn test_extract_ecc_point() {
        let bytes = extract_public_key(ECC_DUMP, "pub").unwrap();
        assert_eq!(bytes[0], 0x04);
        assert_eq!(bytes.len(), 17);
        assert_eq!(*bytes.last().unwrap(), 0x71);
    }

    #[test]
    fn test_extract_requires_eight_groups() {
        let short = "Modulus:\n    00:c3:5f:10\n";
        assert!(matches!(
            extract_public_key(short, "Modulus"),
            Err(BuildError::KeyExtraction { .. })
        ));
    }

    #[test]
    fn test_extract_missing_label() {
        assert!(extract_public_key(RSA_DUMP, "pub").is_err());
    }
}
