//! Default configuration constants for toxiguard.
//!
//! This module provides shared constants used across different configuration
//! types to ensure consistency and eliminate duplication.

/// Default audio sample rate in Hz.
///
/// 44.1kHz matches what loopback devices (VB-Cable and friends) expose for
/// outgoing system audio. Transcription resamples down to 16kHz internally.
pub const SAMPLE_RATE: u32 = 44100;

/// Duration of one monitoring window in seconds.
///
/// Each poll tick records this much audio before transcribing it. Detection
/// cannot be faster than one window length; 15s keeps whole utterances
/// inside a single window.
pub const WINDOW_SECS: u64 = 15;

/// Pause between poll ticks in seconds.
pub const POLL_INTERVAL_SECS: u64 = 5;

/// Bounded wait for a single transcription call in seconds.
///
/// A hung speech-to-text engine would otherwise wedge the monitoring loop
/// forever. Timeouts are per-tick recoverable.
pub const TRANSCRIPTION_TIMEOUT_SECS: u64 = 120;

/// Case-insensitive substring used to pick the loopback capture device.
///
/// "CABLE Output" is the VB-Cable virtual device that mirrors outgoing
/// system audio.
pub const DEVICE_PATTERN: &str = "cable output";

/// Default output directory for clips and reports.
pub const OUTPUT_DIR: &str = "ToxiGuard_Output";

/// Whisper model name transcription defaults to.
pub const DEFAULT_MODEL: &str = "models/ggml-base.bin";

/// Default language code for transcription.
pub const DEFAULT_LANGUAGE: &str = "en";

// File names inside the output directory. All flat, no subfolders; each
// incident overwrites the previous one's files.
pub const SCRATCH_CLIP: &str = "_temp.wav";
pub const BEFORE_CLIP: &str = "before.wav";
pub const AFTER_CLIP: &str = "after.wav";
pub const COMPOUND_CLIP: &str = "compound.wav";
pub const FILELIST_NAME: &str = "filelist.txt";
pub const TRANSCRIPT_FILE: &str = "transcription.txt";
pub const REPORT_FILE: &str = "toxicity_report.json";

/// Built-in toxic vocabulary, matched as case-insensitive substrings.
///
/// Declaration order is the reporting order. Exact substring matching only;
/// no stemming or fuzzy matching.
pub const TOXIC_VOCABULARY: &[&str] = &[
    "kill yourself",
    "retard",
    "trash",
    "noob",
    "stupid",
    "idiot",
    "dumb",
    "f***",
    "b****",
    "n****",
    "c****",
    "kys",
    "die",
];

/// Report the GPU backend compiled into this build.
///
/// Returns a human-readable name based on the compile-time feature flags.
/// Only one GPU backend can be active at a time; if none is enabled, returns "CPU".
pub fn gpu_backend() -> &'static str {
    if cfg!(feature = "cuda") {
        "CUDA"
    } else if cfg!(feature = "vulkan") {
        "Vulkan"
    } else if cfg!(feature = "hipblas") {
        "HipBLAS (AMD)"
    } else if cfg!(feature = "openblas") {
        "OpenBLAS"
    } else {
        "CPU"
    }
}
