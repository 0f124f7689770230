//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// GPU P2P bandwidth checker
///
/// Runs the CUDA p2pBandwidthLatencyTest sample, flags links whose
/// unidirectional bandwidth falls below the configured floors, and records
/// GPU UUIDs reported by nvidia-smi.
#[derive(Parser, Debug)]
#[command(name = "gpu-p2p-check")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive terminal UI (default)
    Tui,

    /// Run the bandwidth test once and print the analysis
    Run {
        /// Override the benchmark executable path
        #[arg(short, long)]
        benchmark: Option<PathBuf>,
    },

    /// Analyze a saved p2pBandwidthLatencyTest report ("-" reads stdin)
    Analyze {
        #[arg(short, long, default_value = "-")]
        input: String,
    },

    /// Query GPU UUIDs and save them as JSON
    Uuids {
        /// Override the output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
