//! Hash segment builder
//!
//! Writes the resolved source bytes to a scoped temporary file, runs the
//! external tool's digest command over it and embeds the binary digest.

use crate::algo;
use crate::binutil;
use crate::config::HashParams;
use crate::error::Result;

use super::{BuildContext, resolve_source};

pub fn build(ctx: &mut BuildContext, params: &HashParams) -> Result<Vec<u8>> {
    let hash = algo::parse_hash_algorithm(&params.algorithm)?;

    let source = resolve_source(ctx, &params.source);
    let data_path = ctx.temp_file_with(&source)?;
    let digest_path = ctx.new_temp_file()?;
    ctx.tool.digest(&data_path, &digest_path, hash)?;

    let payload = binutil::align(std::fs::read(&digest_path)?, params.align);
    ctx.store.put(&params.name, payload.clone());
    Ok(payload)
}
