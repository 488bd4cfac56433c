//! File segment builder
//!
//! Verbatim byte import from disk or from a previously built segment, used
//! for prebuilt sub-images and similar blobs.

use crate::binutil;
use crate::config::FileParams;
use crate::error::Result;

use super::{BuildContext, resolve_source};

pub fn build(ctx: &mut BuildContext, params: &FileParams) -> Result<Vec<u8>> {
    let payload = binutil::align(resolve_source(ctx, &params.source), params.align);
    ctx.store.put(&params.name, payload.clone());
    Ok(payload)
}
