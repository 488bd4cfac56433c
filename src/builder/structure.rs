//! Structure segment builder
//!
//! Encodes an ordered field list into bytes. Each field is a
//! `"label, value, size"` triple: the `name` label renames the structure's
//! record (last one wins, applied at the end), `pad` repeats one byte, and
//! any other label encodes its value as a scalar, string or operator result
//! aligned to the field size. A field position may also hold a full nested
//! segment definition whose payload is spliced inline. Malformed fields are
//! logged and contribute nothing.

use log::{debug, error};

use crate::binutil;
use crate::config::{FieldEntry, SegmentConfig};
use crate::operator;

use super::{BuildContext, SegmentOutput, build_segment};

pub fn build(ctx: &mut BuildContext, fields: &[FieldEntry]) -> SegmentOutput {
    let mut name = String::from("unknown");
    let mut payload = Vec::new();

    for entry in fields {
        match entry {
            FieldEntry::Text(text) => encode_field(ctx, text, &mut name, &mut payload),
            FieldEntry::Nested(map) => {
                for (kind, params) in map {
                    match SegmentConfig::from_entry(kind, params.clone()) {
                        Ok(segment) => {
                            let built = build_segment(ctx, &segment);
                            payload.extend_from_slice(&built.payload);
                        }
                        Err(err) => error!("unsupported structure subitem `{kind}`: {err}"),
                    }
                }
            }
            FieldEntry::Other(value) => error!("unsupported structure field {value}"),
        }
    }

    debug!("structure `{name}` has {} bytes", payload.len());
    ctx.store.put(name.clone(), payload.clone());
    SegmentOutput {
        name,
        payload,
        degraded: false,
    }
}

fn encode_field(ctx: &BuildContext, text: &str, name: &mut String, payload: &mut Vec<u8>) {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() < 3 {
        error!("field `{text}` must have at least 3 items");
        return;
    }
    let (label, value) = (parts[0], parts[1]);
    let Some(size) = binutil::parse_int(parts[2]) else {
        error!("field `{text}` has a non-numeric size");
        return;
    };
    let size = size as usize;

    match label {
        "name" => *name = value.to_string(),
        "pad" => {
            let Some(fill) = binutil::parse_int(value) else {
                error!("pad field `{text}` has a non-numeric value");
                return;
            };
            payload.resize(payload.len() + size, (fill & 0xFF) as u8);
        }
        _ => payload.extend(operator::encode_value(value, size, &ctx.store)),
    }
}
