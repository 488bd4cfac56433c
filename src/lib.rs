//! # mkfwimage
//!
//! A declarative flat firmware/boot image assembler.
//!
//! A JSON configuration document lists modules, each holding an ordered list
//! of data segments (raw structures, embedded public keys, signatures, hashes
//! and verbatim files). The assembler builds every segment in declaration
//! order and concatenates the payloads into a single flat binary. Later
//! segments may reference earlier ones by name, both as raw source bytes and
//! through computed field expressions such as `sizeof(...)`, `sum32(...)` and
//! `crc32(...)`.
//!
//! All asymmetric key and digest operations are delegated to an external
//! `openssl` binary through the [`CryptoTool`] trait; the crate never
//! implements the cryptographic math itself.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use mkfwimage::{ImageAssembler, ImageConfig, OpensslTool};
//!
//! let config = ImageConfig::from_file(Path::new("image.json"))?;
//! let tool = OpensslTool;
//! let summary = ImageAssembler::new(&config, ".".into(), &tool)
//!     .assemble(Path::new("img.bin"))?;
//! println!("{} segments, {} bytes", summary.segments, summary.bytes_written);
//! # Ok::<(), mkfwimage::BuildError>(())
//! ```

pub mod algo;
pub mod assembler;
pub mod binutil;
pub mod builder;
pub mod cli;
pub mod config;
pub mod crc;
pub mod error;
pub mod openssl;
pub mod operator;
pub mod store;

// Re-export main types for convenience
pub use algo::{HashAlgorithm, KeyAlgorithm};
pub use assembler::{BuildSummary, ImageAssembler, Phase};
pub use builder::{BuildContext, SegmentOutput, build_segment};
pub use config::{ImageConfig, ModuleConfig, SegmentConfig};
pub use crc::calculate_crc32;
pub use error::{BuildError, Result};
pub use openssl::{CryptoTool, OpensslTool};
pub use store::{BuildRecord, BuildStore, KeyPair, KEY_SUFFIX};

/// Current version of the mkfwimage implementation
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
