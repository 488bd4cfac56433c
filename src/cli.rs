//! Command line interface for mkfwimage

use std::path::{Path, PathBuf};

use clap::Parser;
use log::info;

use crate::VERSION;
use crate::assembler::ImageAssembler;
use crate::config::ImageConfig;
use crate::error::Result;
use crate::openssl::OpensslTool;

/// Command line arguments for mkfwimage
#[derive(Parser, Debug)]
#[command(name = "mkfwimage")]
#[command(version = VERSION)]
#[command(about = "Assemble a flat firmware image from a JSON configuration", long_about = None)]
pub struct Args {
    /// Configuration JSON file
    #[arg(short = 'c', long)]
    pub config: PathBuf,

    /// Output image file
    #[arg(short = 'o', long, default_value = "img.bin")]
    pub output: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode - only output errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Load the configuration, run the assembler and report the summary.
///
/// Per-segment failures do not fail the process; only a config or I/O error
/// yields a non-zero exit.
pub fn run_cli(args: Args) -> Result<()> {
    let config = ImageConfig::from_file(&args.config)?;
    config.log_info();

    let base_dir = args
        .config
        .parent()
        .unwrap_or(Path::new("."))
        .to_path_buf();
    let tool = OpensslTool;
    let summary = ImageAssembler::new(&config, base_dir, &tool).assemble(&args.output)?;

    info!(
        "wrote {} bytes ({} segments) to {}",
        summary.bytes_written,
        summary.segments,
        args.output.display()
    );
    Ok(())
}
