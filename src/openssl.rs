//! External cryptographic tool interface
//!
//! Key generation, signing and digesting are delegated to an external tool
//! behind the [`CryptoTool`] trait. The stock implementation shells out to
//! the `openssl` binary with blocking child processes; tests substitute fakes.

use std::path::Path;
use std::process::Command;

use log::{debug, error};

use crate::algo::{HashAlgorithm, KeyAlgorithm};
use crate::error::{BuildError, Result};

/// Operations the image assembler needs from a cryptographic tool.
pub trait CryptoTool {
    /// Generate a fresh private key for `algo` at `out`.
    fn generate_private_key(&self, out: &Path, algo: &KeyAlgorithm) -> Result<()>;

    /// Derive the public key of `private` into `out`.
    fn derive_public_key(&self, private: &Path, out: &Path, algo: &KeyAlgorithm) -> Result<()>;

    /// Dump a public key's human-readable text form into `out`.
    fn dump_public_key_text(&self, public: &Path, out: &Path, algo: &KeyAlgorithm) -> Result<()>;

    /// Sign the contents of `data` with `private`, writing the raw signature to `out`.
    fn sign(&self, private: &Path, data: &Path, out: &Path, hash: HashAlgorithm) -> Result<()>;

    /// Write the binary digest of `data` to `out`.
    fn digest(&self, data: &Path, out: &Path, hash: HashAlgorithm) -> Result<()>;
}

/// [`CryptoTool`] backed by the `openssl` command line binary.
///
/// Key text parsing downstream depends on openssl's dump format, which is not
/// guaranteed stable across major versions.
pub struct OpensslTool;

impl OpensslTool {
    fn run(&self, mut cmd: Command) -> Result<()> {
        let line = render(&cmd);
        debug!("{line}");
        let status = cmd.status()?;
        if !status.success() {
            let code = status.code().unwrap_or(-1);
            error!("command `{line}` exited with code {code}");
            return Err(BuildError::tool_failed(line, code));
        }
        Ok(())
    }

    fn openssl() -> Command {
        Command::new("openssl")
    }
}

fn render(cmd: &Command) -> String {
    let mut line = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        line.push(' ');
        line.push_str(arg.to_string_lossy().as_ref());
    }
    line
}

impl CryptoTool for OpensslTool {
    fn generate_private_key(&self, out: &Path, algo: &KeyAlgorithm) -> Result<()> {
        let mut cmd = Self::openssl();
        match algo {
            KeyAlgorithm::Rsa(bits) => {
                cmd.arg("genrsa").arg("-out").arg(out).arg(bits.to_string());
            }
            KeyAlgorithm::Ecc(curve) => {
                cmd.args(["ecparam", "-genkey", "-name", curve, "-noout", "-out"])
                    .arg(out);
            }
        }
        self.run(cmd)
    }

    fn derive_public_key(&self, private: &Path, out: &Path, algo: &KeyAlgorithm) -> Result<()> {
        let mut cmd = Self::openssl();
        cmd.arg(key_subcommand(algo))
            .arg("-in")
            .arg(private)
            .arg("-pubout")
            .arg("-out")
            .arg(out);
        self.run(cmd)
    }

    fn dump_public_key_text(&self, public: &Path, out: &Path, algo: &KeyAlgorithm) -> Result<()> {
        let mut cmd = Self::openssl();
        cmd.arg(key_subcommand(algo))
            .arg("-in")
            .arg(public)
            .args(["-pubin", "-text", "-noout"])
            .arg("-out")
            .arg(out);
        self.run(cmd)
    }

    fn sign(&self, private: &Path, data: &Path, out: &Path, hash: HashAlgorithm) -> Result<()> {
        let mut cmd = Self::openssl();
        cmd.arg("dgst")
            .arg(format!("-{}", hash.tool_name()))
            .arg("-sign")
            .arg(private)
            .arg("-out")
            .arg(out)
            .arg(data);
        self.run(cmd)
    }

    fn digest(&self, data: &Path, out: &Path, hash: HashAlgorithm) -> Result<()> {
        let mut cmd = Self::openssl();
        cmd.arg("dgst")
            .arg(format!("-{}", hash.tool_name()))
            .arg("-binary")
            .arg("-out")
            .arg(out)
            .arg(data);
        self.run(cmd)
    }
}

fn key_subcommand(algo: &KeyAlgorithm) -> &'static str {
    match algo {
        KeyAlgorithm::Rsa(_) => "rsa",
        KeyAlgorithm::Ecc(_) => "ec",
    }
}
