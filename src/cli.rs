use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "remixforge")]
#[command(author, version, about = "Batch media remix orchestrator driven by JSON rules")]
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
    /// Scan assets, normalize them, and run a rules document
    Run {
        /// Rules document (JSON)
        #[arg(required = true)]
        rules: PathBuf,

        /// Path to the ffmpeg binary (ffprobe and ffplay are looked up next to it)
        #[arg(long)]
        ffmpeg: Option<PathBuf>,

        /// Show what would be done without executing
        #[arg(long)]
        dry_run: bool,

        /// Seed for random chops, for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Skip the normalization pass even if the rules request it
        #[arg(long)]
        skip_normalize: bool,
    },

    /// Scan an asset directory and update the catalog index
    Scan {
        /// Directory to scan
        #[arg(required = true)]
        dir: PathBuf,

        /// Work directory holding the catalog index
        #[arg(long)]
        workdir: Option<PathBuf>,

        /// Normalize videos and GIFs using the configured preprocessing targets
        #[arg(long)]
        normalize: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe a media file and display information
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output the raw ffprobe document as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Parse a rules document and dry-run it
    Validate {
        /// Rules document (JSON)
        #[arg(required = true)]
        rules: PathBuf,
    },

    /// Display version information
    Version,
}
