//! Segment builders and the shared build context
//!
//! Each segment type has one builder. Builders read and write the
//! [`BuildStore`] through a [`BuildContext`] that also owns every temporary
//! file created during the run; the files are deleted when the context drops,
//! whether or not the run succeeded.

pub mod file;
pub mod hash;
pub mod pubkey;
pub mod signature;
pub mod structure;

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use log::{error, info};
use tempfile::NamedTempFile;

use crate::config::SegmentConfig;
use crate::error::Result;
use crate::openssl::CryptoTool;
use crate::store::BuildStore;

/// Mutable state shared by all builders during one assembly run.
pub struct BuildContext<'a> {
    pub store: BuildStore,
    /// Directory of the configuration file; relative sources resolve here
    pub base_dir: PathBuf,
    pub tool: &'a dyn CryptoTool,
    temp_files: Vec<NamedTempFile>,
}

impl<'a> BuildContext<'a> {
    pub fn new(base_dir: PathBuf, tool: &'a dyn CryptoTool) -> Self {
        Self {
            store: BuildStore::new(),
            base_dir,
            tool,
            temp_files: Vec::new(),
        }
    }

    /// Create a run-owned temporary file holding `contents`.
    pub fn temp_file_with(&mut self, contents: &[u8]) -> Result<PathBuf> {
        let mut file = NamedTempFile::new()?;
        file.write_all(contents)?;
        file.flush()?;
        let path = file.path().to_path_buf();
        self.temp_files.push(file);
        Ok(path)
    }

    /// Create an empty run-owned temporary file for a tool to write into.
    pub fn new_temp_file(&mut self) -> Result<PathBuf> {
        let file = NamedTempFile::new()?;
        let path = file.path().to_path_buf();
        self.temp_files.push(file);
        Ok(path)
    }

    /// Path for a generated key file under the `key/` subdirectory.
    pub fn key_file_path(&self, stem: &str) -> Result<PathBuf> {
        let dir = self.base_dir.join("key");
        if !dir.is_dir() {
            fs::create_dir_all(&dir)?;
        }
        Ok(dir.join(format!("{stem}.key")))
    }
}

/// Result of building one segment. The payload is always exact-length; a
/// degraded segment contributes an empty payload instead of aborting the run.
#[derive(Debug, Clone)]
pub struct SegmentOutput {
    pub name: String,
    pub payload: Vec<u8>,
    pub degraded: bool,
}

/// Dispatch a segment definition to its builder.
///
/// Per-segment errors never cross this boundary: they are logged and turned
/// into an empty payload with the `degraded` flag set.
pub fn build_segment(ctx: &mut BuildContext, segment: &SegmentConfig) -> SegmentOutput {
    match segment {
        SegmentConfig::Structure(fields) => structure::build(ctx, fields),
        SegmentConfig::PubKey(params) => finish(&params.name, pubkey::build(ctx, params)),
        SegmentConfig::Signature(params) => finish(&params.name, signature::build(ctx, params)),
        SegmentConfig::Hash(params) => finish(&params.name, hash::build(ctx, params)),
        SegmentConfig::File(params) => finish(&params.name, file::build(ctx, params)),
    }
}

fn finish(name: &str, result: Result<Vec<u8>>) -> SegmentOutput {
    match result {
        Ok(payload) => SegmentOutput {
            name: name.to_string(),
            payload,
            degraded: false,
        },
        Err(err) => {
            error!("segment `{name}`: {err}");
            SegmentOutput {
                name: name.to_string(),
                payload: Vec::new(),
                degraded: true,
            }
        }
    }
}

/// Concatenate a `+`-separated source list into bytes.
///
/// Each piece is a build-store name or a file path relative to the base
/// directory; store records take precedence. Missing pieces are logged and
/// skipped.
pub fn resolve_source(ctx: &BuildContext, source: &str) -> Vec<u8> {
    let mut data = Vec::new();
    for piece in source.split('+').map(str::trim) {
        if piece.is_empty() {
            continue;
        }
        if let Some(payload) = ctx.store.payload(piece) {
            data.extend_from_slice(payload);
        } else {
            match fs::read(ctx.base_dir.join(piece)) {
                Ok(bytes) => data.extend_from_slice(&bytes),
                Err(_) => info!("no source data for `{piece}`"),
            }
        }
    }
    data
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use crate::algo::{HashAlgorithm, KeyAlgorithm};
    use crate::error::Result;
    use crate::openssl::CryptoTool;

    /// A [`CryptoTool`] that succeeds without touching the filesystem.
    pub struct NullTool;

    impl CryptoTool for NullTool {
        fn generate_private_key(&self, _out: &Path, _algo: &KeyAlgorithm) -> Result<()> {
            Ok(())
        }

        fn derive_public_key(&self, _private: &Path, _out: &Path, _algo: &KeyAlgorithm) -> Result<()> {
            Ok(())
        }

        fn dump_public_key_text(&self, _public: &Path, _out: &Path, _algo: &KeyAlgorithm) -> Result<()> {
            Ok(())
        }

        fn sign(&self, _private: &Path, _data: &Path, _out: &Path, _hash: HashAlgorithm) -> Result<()> {
            Ok(())
        }

        fn digest(&self, _data: &Path, _out: &Path, _hash: HashAlgorithm) -> Result<()> {
            Ok(())
        }
    }
}
