//! Command-line argument definitions for the Plotweave CLI.
//!
//! [`Args`] is parsed from the command line using [`clap`]. Arguments
//! control the input point file, the output path and format, the
//! configuration file and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Plotweave density map tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a JSON array of `[lon, lat]` pairs
    #[arg(help = "Path to the input JSON file")]
    pub input: String,

    /// Output file; the document is written to stdout when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format (svg or html)
    #[arg(short, long, default_value = "svg")]
    pub format: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Title drawn above the map
    #[arg(short, long)]
    pub title: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
