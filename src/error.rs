//! Error types for mkfwimage

use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors raised while assembling an image.
///
/// Only [`BuildError::Config`] is fatal to a run; every other variant is a
/// per-segment failure that the dispatcher turns into an empty payload.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Malformed or missing required configuration
    #[error("config error: {0}")]
    Config(String),

    /// Algorithm string could not be parsed into a known cipher or hash
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Signature segment references a key segment with no usable key pair
    #[error("no key material for `{0}`")]
    MissingKey(String),

    /// A supplied key file starts with neither a private nor a public key header
    #[error("no valid private or public key in {}", .path.display())]
    InvalidKeyFile { path: PathBuf },

    /// The tool's textual key dump did not contain the expected hex byte run
    #[error("no public key bytes labelled `{label}` in tool output")]
    KeyExtraction { label: String },

    /// External tool exited with a non-zero status
    #[error("command `{command}` exited with code {code}")]
    ToolFailed { command: String, code: i32 },

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn unsupported_algorithm(spec: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm(spec.into())
    }

    pub fn missing_key(name: impl Into<String>) -> Self {
        Self::MissingKey(name.into())
    }

    pub fn key_extraction(label: impl Into<String>) -> Self {
        Self::KeyExtraction {
            label: label.into(),
        }
    }

    pub fn tool_failed(command: impl Into<String>, code: i32) -> Self {
        Self::ToolFailed {
            command: command.into(),
            code,
        }
    }

    /// Whether this error aborts the whole run rather than one segment.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
