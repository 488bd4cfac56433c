//! Signature segment builder
//!
//! Signs the resolved source bytes with the private key of a previously
//! built public-key segment. The algorithm combo supplies both the cipher
//! (validated) and the digest passed to the signing command.

use crate::algo;
use crate::binutil;
use crate::config::SignatureParams;
use crate::error::{BuildError, Result};

use super::{BuildContext, resolve_source};

pub fn build(ctx: &mut BuildContext, params: &SignatureParams) -> Result<Vec<u8>> {
    let cipher_spec = params.algorithm.as_deref().unwrap_or("RSA2048");
    algo::parse_key_algorithm(cipher_spec)?;
    let hash_spec = params.algorithm.as_deref().unwrap_or("SHA256");
    let hash = algo::parse_hash_algorithm(hash_spec)?;

    let private = ctx
        .store
        .key_pair(&params.key)
        .and_then(|pair| pair.private.clone())
        .ok_or_else(|| BuildError::missing_key(&params.key))?;

    let source = resolve_source(ctx, &params.source);
    let data_path = ctx.temp_file_with(&source)?;
    let sig_path = ctx.new_temp_file()?;
    ctx.tool.sign(&private, &data_path, &sig_path, hash)?;

    let payload = binutil::align(std::fs::read(&sig_path)?, params.align);
    ctx.store.put(&params.name, payload.clone());
    Ok(payload)
}
