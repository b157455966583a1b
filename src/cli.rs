//! Command-line interface for toxiguard
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// System-audio toxicity monitor
#[derive(Parser, Debug)]
#[command(
    name = "toxiguard",
    version,
    about = "Monitors system audio and records toxic speech incidents"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: per-window transcripts)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Capture device name substring (e.g., "cable output")
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Path to the Whisper model file (e.g., models/ggml-base.bin)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Language code for transcription. Examples: auto, en, de, es
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Directory for incident clips and reports
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Capture window duration. Examples: 15s, 30s, 1m
    #[arg(long, short = 'w', value_name = "DURATION", value_parser = parse_duration_secs)]
    pub window: Option<u64>,

    /// Pause between poll ticks. Examples: 5s, 10s, 1m
    #[arg(long, short = 'i', value_name = "DURATION", value_parser = parse_duration_secs)]
    pub interval: Option<u64>,

    /// Exit after the first poll tick
    #[arg(long)]
    pub once: bool,
}

/// Parse a duration string into seconds.
///
/// Supports any duration format accepted by `humantime`: bare numbers
/// (seconds), single-unit (`30s`, `5m`), and compound (`1m30s`).
fn parse_duration_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs())
        .map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available capture devices
    Devices,

    /// Check system dependencies (ffmpeg, model file, capture device)
    Check,
}
