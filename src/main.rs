//! Main entry point for the mkfwimage CLI tool

use clap::Parser;
use log::LevelFilter;
use mkfwimage::cli::{Args, run_cli};

fn main() {
    let args = Args::parse();

    let level = if args.quiet {
        LevelFilter::Error
    } else if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(level).init();

    if let Err(e) = run_cli(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
