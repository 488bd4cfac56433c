//! Run-scoped store of built segment payloads
//!
//! The store is the single source of truth for cross-segment references. It
//! is created once per run, passed by reference to every builder, and
//! discarded when the run ends. Single-threaded, sequential use only.

use std::collections::HashMap;
use std::path::PathBuf;

/// Suffix appended to a public-key segment's name to form its key-pair record.
pub const KEY_SUFFIX: &str = "_key";

/// Private/public key file paths belonging to a public-key segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    /// Absent when the segment was seeded from a public key file only
    pub private: Option<PathBuf>,
    pub public: PathBuf,
}

/// One built segment: its exact payload and, for key segments, the key pair.
#[derive(Debug, Clone, Default)]
pub struct BuildRecord {
    pub payload: Vec<u8>,
    pub key_pair: Option<KeyPair>,
}

/// Name to [`BuildRecord`] mapping for one assembly run.
///
/// Re-declaring a name overwrites the record; references made before the
/// overwrite keep the bytes they already copied, so declaration order matters.
#[derive(Debug, Default)]
pub struct BuildStore {
    records: HashMap<String, BuildRecord>,
}

impl BuildStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&BuildRecord> {
        self.records.get(name)
    }

    pub fn payload(&self, name: &str) -> Option<&[u8]> {
        self.records.get(name).map(|r| r.payload.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn put(&mut self, name: impl Into<String>, payload: Vec<u8>) {
        self.records.insert(
            name.into(),
            BuildRecord {
                payload,
                key_pair: None,
            },
        );
    }

    /// Record the key file paths of `name` under `name` + [`KEY_SUFFIX`].
    pub fn put_key_pair(&mut self, name: &str, private: Option<PathBuf>, public: PathBuf) {
        self.records.insert(
            format!("{name}{KEY_SUFFIX}"),
            BuildRecord {
                payload: Vec::new(),
                key_pair: Some(KeyPair { private, public }),
            },
        );
    }

    /// Look up the key pair stored for segment `name` (suffix applied here).
    pub fn key_pair(&self, name: &str) -> Option<&KeyPair> {
        self.records
            .get(&format!("{name}{KEY_SUFFIX}"))
            .and_then(|r| r.key_pair.as_ref())
    }
}
