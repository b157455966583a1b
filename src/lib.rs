//! toxiguard - System-audio toxicity monitor
//!
//! Listens to a loopback capture device, transcribes fixed windows of audio,
//! scans transcripts for toxic vocabulary, and records before/after incident
//! clips with a JSON report when something is flagged.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod clip;
pub mod config;
pub mod defaults;
#[cfg(feature = "cli")]
pub mod diagnostics;
pub mod error;
pub mod monitor;
pub mod stt;
pub mod toxicity;

// Composition root - needs everything
#[cfg(all(feature = "cpal-audio", feature = "cli"))]
pub mod app;

// Core traits (capture → transcribe → score)
pub use audio::source::AudioSource;
pub use clip::merger::{ClipMerger, CommandExecutor, SystemCommandExecutor};
pub use stt::transcriber::Transcriber;

// Pipeline
pub use monitor::{Monitor, MonitorConfig, MonitorHandle, TickOutcome};

// Error handling
pub use error::{Result, ToxiguardError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
