//! JSON configuration document model
//!
//! The document is a mapping with an optional `info` block and an `image`
//! list; each image entry is a module with a name and an ordered data segment
//! list. Segments are single-key maps from a type name (`structure`,
//! `pubkey`, `signature`, `hash`, `file`) to that type's parameter record.
//! Unrecognized parameter keys are ignored; unrecognized segment type keys
//! are skipped by the assembler.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::info;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{BuildError, Result};

/// Top-level configuration document
#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    /// Free-form build metadata, echoed to the log at the start of a run
    #[serde(default)]
    pub info: Option<BTreeMap<String, Value>>,
    /// Ordered module list making up the output image
    pub image: Vec<ModuleConfig>,
}

/// One module of the image: a name and its ordered data segments
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleConfig {
    pub module: String,
    pub data: Vec<BTreeMap<String, Value>>,
}

impl ImageConfig {
    /// Load and validate a configuration document from a JSON file.
    ///
    /// Relative source paths in the document resolve against the file's
    /// containing directory; the caller keeps track of that base path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|err| {
            BuildError::config(format!("can not open config file {}: {err}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|err| {
            BuildError::config(format!("malformed config {}: {err}", path.display()))
        })?;
        Ok(config)
    }

    /// Echo the `info` block to the log, one line per entry.
    pub fn log_info(&self) {
        if let Some(info) = &self.info {
            for (key, value) in info {
                info!("{key} : {value}");
            }
        }
    }
}

/// A data segment definition, tagged by its type key.
#[derive(Debug, Clone)]
pub enum SegmentConfig {
    Structure(Vec<FieldEntry>),
    PubKey(PubKeyParams),
    Signature(SignatureParams),
    Hash(HashParams),
    File(FileParams),
}

impl SegmentConfig {
    /// Convert one `type key -> parameters` entry into a typed definition.
    pub fn from_entry(kind: &str, params: Value) -> Result<Self> {
        match kind {
            "structure" => Ok(Self::Structure(serde_json::from_value(params)?)),
            "pubkey" => Ok(Self::PubKey(serde_json::from_value(params)?)),
            "signature" => Ok(Self::Signature(serde_json::from_value(params)?)),
            "hash" => Ok(Self::Hash(serde_json::from_value(params)?)),
            "file" => Ok(Self::File(serde_json::from_value(params)?)),
            _ => Err(BuildError::config(format!("unsupported data type `{kind}`"))),
        }
    }
}

/// One entry of a structure's field list: either a `"label, value, size"`
/// triple or a nested segment definition spliced inline.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldEntry {
    Text(String),
    Nested(BTreeMap<String, Value>),
    /// Anything else; logged and dropped by the structure builder
    Other(Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct PubKeyParams {
    #[serde(default = "default_pubkey_name")]
    pub name: String,
    #[serde(default = "default_cipher")]
    pub algorithm: String,
    #[serde(default = "default_align")]
    pub align: usize,
    /// Existing key file to use instead of generating one
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignatureParams {
    #[serde(default = "default_signature_name")]
    pub name: String,
    /// Hash+cipher combo, e.g. `SHA256+RSA2048`. The cipher half defaults to
    /// RSA2048 and the hash half to SHA256 when the key is absent.
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default = "default_key_name")]
    pub key: String,
    #[serde(default)]
    pub source: String,
    #[serde(default = "default_align")]
    pub align: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HashParams {
    #[serde(default = "default_hash_name")]
    pub name: String,
    #[serde(default = "default_hash")]
    pub algorithm: String,
    #[serde(default)]
    pub source: String,
    #[serde(default = "default_align")]
    pub align: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileParams {
    #[serde(default = "default_file_name")]
    pub name: String,
    #[serde(default)]
    pub source: String,
    #[serde(default = "default_align")]
    pub align: usize,
}

fn default_align() -> usize {
    1
}

fn default_cipher() -> String {
    "RSA2048".into()
}

fn default_hash() -> String {
    "SHA256".into()
}

fn default_pubkey_name() -> String {
    "publickey".into()
}

fn default_signature_name() -> String {
    "signature".into()
}

fn default_hash_name() -> String {
    "hash".into()
}

fn default_key_name() -> String {
    "keypair".into()
}

fn default_file_name() -> String {
    "empty_file".into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_document() {
        let doc = json!({
            "_comment": "tolerated and ignored",
            "info": { "project": "demo", "version": 3 },
            "image": [
                {
                    "module": "fsbl",
                    "data": [
                        { "structure": ["magic, MYBOOT, 8", "pad, 0, 4"] },
                        { "hash": { "name": "hdr_hash", "source": "hdr", "algorithm": "SHA256" } }
                    ]
                }
            ]
        });
        let config: ImageConfig = serde_json::from_value(doc).unwrap();
        assert_eq!(config.image.len(), 1);
        assert_eq!(config.image[0].module, "fsbl");
        assert_eq!(config.image[0].data.len(), 2);
        assert_eq!(config.info.unwrap()["project"], json!("demo"));
    }

    #[test]
    fn test_missing_image_list_is_error() {
        let doc = json!({ "info": {} });
        assert!(serde_json::from_value::<ImageConfig>(doc).is_err());
    }

    #[test]
    fn test_image_must_be_a_list() {
        let doc = json!({ "image": { "module": "fsbl" } });
        assert!(serde_json::from_value::<ImageConfig>(doc).is_err());
    }

    #[test]
    fn test_segment_from_entry() {
        let seg = SegmentConfig::from_entry(
            "pubkey",
            json!({ "name": "bootkey", "algorithm": "ECCprime256v1", "align": 4 }),
        )
        .unwrap();
        match seg {
            SegmentConfig::PubKey(params) => {
                assert_eq!(params.name, "bootkey");
                assert_eq!(params.algorithm, "ECCprime256v1");
                assert_eq!(params.align, 4);
                assert_eq!(params.source, "");
            }
            other => panic!("expected pubkey, got {other:?}"),
        }
    }

    #[test]
    fn test_segment_defaults() {
        let seg = SegmentConfig::from_entry("signature", json!({})).unwrap();
        match seg {
            SegmentConfig::Signature(params) => {
                assert_eq!(params.name, "signature");
                assert_eq!(params.key, "keypair");
                assert_eq!(params.align, 1);
                assert!(params.algorithm.is_none());
            }
            other => panic!("expected signature, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_segment_type_is_error() {
        assert!(SegmentConfig::from_entry("blob", json!({})).is_err());
    }

    #[test]
    fn test_unknown_parameter_keys_ignored() {
        let seg = SegmentConfig::from_entry(
            "file",
            json!({ "name": "blob", "source": "fw.bin", "future_option": true }),
        )
        .unwrap();
        match seg {
            SegmentConfig::File(params) => assert_eq!(params.name, "blob"),
            other => panic!("expected file, got {other:?}"),
        }
    }

    #[test]
    fn test_field_entry_shapes() {
        let entries: Vec<FieldEntry> =
            serde_json::from_value(json!(["name, hdr, 0", { "file": { "source": "a.bin" } }, 7]))
                .unwrap();
        assert!(matches!(entries[0], FieldEntry::Text(_)));
        assert!(matches!(entries[1], FieldEntry::Nested(_)));
        assert!(matches!(entries[2], FieldEntry::Other(_)));
    }
}
