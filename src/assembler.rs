//! Two-pass image assembly driver
//!
//! The assembler runs every module's every segment twice. The warmup pass
//! populates the build store with error-level logging suppressed, giving
//! forward operator references a chance to resolve; the commit pass rebuilds
//! each segment (only key material is memoized) and writes the payloads to
//! the output file in strict declaration order.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{LevelFilter, debug, warn};

use crate::builder::{BuildContext, build_segment};
use crate::config::{ImageConfig, SegmentConfig};
use crate::error::Result;
use crate::openssl::CryptoTool;

/// The two sequential passes of an assembly run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Warmup,
    Commit,
}

/// Aggregate result of the commit pass.
///
/// Per-segment failures do not abort the run; callers that need strictness
/// must check `degraded` instead of relying on the exit status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Segments built during commit
    pub segments: usize,
    /// Segments that degraded to an empty payload
    pub degraded: usize,
    /// Total bytes written to the output file
    pub bytes_written: u64,
}

/// Top-level driver owning the build context for one run.
pub struct ImageAssembler<'a> {
    config: &'a ImageConfig,
    ctx: BuildContext<'a>,
}

impl<'a> ImageAssembler<'a> {
    pub fn new(config: &'a ImageConfig, base_dir: PathBuf, tool: &'a dyn CryptoTool) -> Self {
        Self {
            config,
            ctx: BuildContext::new(base_dir, tool),
        }
    }

    /// Run both passes and write the flat image to `output`.
    ///
    /// Consumes the assembler; dropping it at the end of the run removes all
    /// temporary files created by either pass, even after an error.
    pub fn assemble(mut self, output: &Path) -> Result<BuildSummary> {
        self.run_phase(Phase::Warmup, None)?;

        let file = File::create(output)?;
        let mut writer = BufWriter::new(file);
        let summary = self.run_phase(Phase::Commit, Some(&mut writer))?;
        writer.flush()?;

        if summary.degraded > 0 {
            warn!(
                "{} of {} segments degraded to empty payloads",
                summary.degraded, summary.segments
            );
        }
        Ok(summary)
    }

    fn run_phase(&mut self, phase: Phase, mut out: Option<&mut dyn Write>) -> Result<BuildSummary> {
        // Only the most severe messages surface during warmup.
        let saved = log::max_level();
        if phase == Phase::Warmup {
            log::set_max_level(LevelFilter::Error);
        }

        let mut summary = BuildSummary::default();
        let result = (|| {
            for module in &self.config.image {
                debug!("building data of module `{}`", module.module);
                for entry in &module.data {
                    for (kind, params) in entry {
                        let segment = match SegmentConfig::from_entry(kind, params.clone()) {
                            Ok(segment) => segment,
                            Err(err) => {
                                warn!("skipping data entry `{kind}`: {err}");
                                continue;
                            }
                        };
                        let built = build_segment(&mut self.ctx, &segment);
                        summary.segments += 1;
                        if built.degraded {
                            summary.degraded += 1;
                        }
                        if let Some(writer) = out.as_mut() {
                            writer.write_all(&built.payload)?;
                            summary.bytes_written += built.payload.len() as u64;
                            debug!("wrote {} bytes of segment `{}`", built.payload.len(), built.name);
                        }
                    }
                }
            }
            Ok(summary)
        })();

        if phase == Phase::Warmup {
            log::set_max_level(saved);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::test_support::NullTool;
    use serde_json::json;

    static TOOL: NullTool = NullTool;

    fn config(doc: serde_json::Value) -> ImageConfig {
        serde_json::from_value(doc).unwrap()
    }

    #[test]
    fn test_segments_written_in_declaration_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(json!({
            "image": [
                {
                    "module": "fsbl",
                    "data": [
                        { "structure": ["name, hdr, 0", "magic, MYBOOT, 8"] },
                        { "structure": ["name, trailer, 0", "end, 0xAA, 1"] }
                    ]
                }
            ]
        }));

        let output = dir.path().join("img.bin");
        let summary = ImageAssembler::new(&config, dir.path().to_path_buf(), &TOOL)
            .assemble(&output)
            .unwrap();

        assert_eq!(summary.segments, 2);
        assert_eq!(summary.degraded, 0);
        assert_eq!(summary.bytes_written, 9);
        assert_eq!(std::fs::read(&output).unwrap(), b"MYBOOT\0\0\xAA".to_vec());
    }

    #[test]
    fn test_warmup_resolves_forward_reference() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("body.bin"), [0x11; 6]).unwrap();

        // `hdr` references `body`, declared later in the document. The warmup
        // pass builds `body` once, so the commit rebuild of `hdr` sees it.
        let config = config(json!({
            "image": [
                {
                    "module": "fsbl",
                    "data": [
                        { "structure": ["name, hdr, 0", "body_size, sizeof(body), 4"] },
                        { "file": { "name": "body", "source": "body.bin" } }
                    ]
                }
            ]
        }));

        let output = dir.path().join("img.bin");
        ImageAssembler::new(&config, dir.path().to_path_buf(), &TOOL)
            .assemble(&output)
            .unwrap();

        let image = std::fs::read(&output).unwrap();
        assert_eq!(&image[..4], &[6, 0, 0, 0]);
        assert_eq!(&image[4..], &[0x11; 6]);
    }

    #[test]
    fn test_degraded_segment_keeps_run_alive() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(json!({
            "image": [
                {
                    "module": "fsbl",
                    "data": [
                        { "signature": { "name": "sig", "key": "missing" } },
                        { "structure": ["name, hdr, 0", "magic, 0x42, 1"] }
                    ]
                }
            ]
        }));

        let output = dir.path().join("img.bin");
        let summary = ImageAssembler::new(&config, dir.path().to_path_buf(), &TOOL)
            .assemble(&output)
            .unwrap();

        assert_eq!(summary.segments, 2);
        assert_eq!(summary.degraded, 1);
        assert_eq!(std::fs::read(&output).unwrap(), vec![0x42]);
    }

    #[test]
    fn test_unknown_segment_type_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(json!({
            "image": [
                {
                    "module": "fsbl",
                    "data": [
                        { "mystery": { "name": "x" } },
                        { "structure": ["name, hdr, 0", "magic, 7, 1"] }
                    ]
                }
            ]
        }));

        let output = dir.path().join("img.bin");
        let summary = ImageAssembler::new(&config, dir.path().to_path_buf(), &TOOL)
            .assemble(&output)
            .unwrap();

        assert_eq!(summary.segments, 1);
        assert_eq!(std::fs::read(&output).unwrap(), vec![7]);
    }

    #[test]
    fn test_crc_field_over_stored_segments() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.bin"), b"first payload").unwrap();
        std::fs::write(dir.path().join("b.bin"), b"second payload").unwrap();

        let config = config(json!({
            "image": [
                {
                    "module": "fsbl",
                    "data": [
                        { "file": { "name": "a", "source": "a.bin" } },
                        { "file": { "name": "b", "source": "b.bin" } },
                        { "structure": ["name, footer, 0", "crc, crc32(a+b), 4"] }
                    ]
                }
            ]
        }));

        let output = dir.path().join("img.bin");
        ImageAssembler::new(&config, dir.path().to_path_buf(), &TOOL)
            .assemble(&output)
            .unwrap();

        let image = std::fs::read(&output).unwrap();
        let expected = crate::crc::calculate_crc32(b"first payloadsecond payload");
        let crc = u32::from_le_bytes(image[image.len() - 4..].try_into().unwrap());
        assert_eq!(crc, expected);
    }
}
