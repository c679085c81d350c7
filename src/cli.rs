use clap::{Parser, Subcommand};
use posterframe_av::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "posterframe")]
#[command(author, version, about = "Extract a poster frame from a video")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a thumbnail image from a video
    Thumbnail {
        /// Video file (with --stdin, only used to name the output)
        #[arg(required = true)]
        input: PathBuf,

        /// Output image path (default: <input stem>.<ext> in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seek position in seconds
        #[arg(long = "at")]
        timestamp: Option<f64>,

        /// Target width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Target height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Output format
        #[arg(long, value_parser = parse_format)]
        format: Option<OutputFormat>,

        /// Encoder quality between 0.0 and 1.0
        #[arg(long)]
        quality: Option<f64>,

        /// Abort extraction after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Read the video bytes from standard input
        #[arg(long)]
        stdin: bool,
    },

    /// Check that the decoder is available
    CheckTools {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}
