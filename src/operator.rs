//! Computed-value field expressions
//!
//! A structure field value of the form `op(name[+name...])` is resolved
//! against the build store instead of being encoded literally. Unresolvable
//! names are logged and skipped so a partial configuration still produces a
//! best-effort image.

use std::sync::OnceLock;

use log::info;
use regex::Regex;

use crate::binutil;
use crate::crc::Crc32;
use crate::store::BuildStore;

/// Supported computed-value operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Summed byte length of the referenced payloads
    SizeOf,
    /// Wrapping sum of each payload's 32-bit running sum
    Sum32,
    /// CRC-32 with the state carried across payloads in order
    Crc32,
}

fn expr_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*(sizeof|sum32|crc32)\s*\((.+)\)\s*$").expect("operator pattern")
    })
}

/// Split an expression into its operator and raw argument string.
///
/// Returns `None` for anything that is not an operator expression.
pub fn parse(expr: &str) -> Option<(Operator, &str)> {
    let caps = expr_pattern().captures(expr)?;
    let op = match caps.get(1)?.as_str().to_ascii_lowercase().as_str() {
        "sizeof" => Operator::SizeOf,
        "sum32" => Operator::Sum32,
        _ => Operator::Crc32,
    };
    Some((op, caps.get(2)?.as_str()))
}

/// Evaluate an operator over its `+`-separated segment name arguments.
pub fn eval(op: Operator, args: &str, store: &BuildStore) -> u64 {
    match op {
        Operator::SizeOf => names(args).fold(0u64, |size, name| match store.payload(name) {
            Some(payload) => size + payload.len() as u64,
            None => {
                info!("no build record for `{name}`");
                size
            }
        }),
        Operator::Sum32 => u64::from(names(args).fold(0u32, |sum, name| {
            match store.payload(name) {
                Some(payload) => sum.wrapping_add(binutil::running_sum32(payload)),
                None => {
                    info!("no build record for `{name}`");
                    sum
                }
            }
        })),
        Operator::Crc32 => {
            let mut crc = Crc32::new();
            for name in names(args) {
                match store.payload(name) {
                    Some(payload) => crc.update(payload),
                    None => info!("no build record for `{name}`"),
                }
            }
            u64::from(crc.finalize())
        }
    }
}

/// Encode a field value as bytes aligned to the field size.
///
/// Operator expressions are evaluated first; everything else is a literal:
/// an integer (any base prefix) in little-endian form, or UTF-8 string bytes.
pub fn encode_value(value: &str, size: usize, store: &BuildStore) -> Vec<u8> {
    let raw = match parse(value) {
        Some((op, args)) => binutil::int_to_le_bytes(eval(op, args, store)),
        None => match binutil::parse_int(value) {
            Some(n) => binutil::int_to_le_bytes(n),
            None => value.as_bytes().to_vec(),
        },
    };
    binutil::align(raw, size)
}

fn names(args: &str) -> impl Iterator<Item = &str> {
    args.split('+').map(str::trim).filter(|n| !n.is_empty())
}
