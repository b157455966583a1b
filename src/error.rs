//! Error types for toxiguard.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToxiguardError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio capture errors
    #[error("No capture device matching '{pattern}' found")]
    DeviceNotFound { pattern: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Clip writing errors
    #[error("Cannot normalize silent buffer for clip '{name}'")]
    EmptyBuffer { name: String },

    // Transcription errors
    #[error("Transcription model not found at {path}")]
    TranscriptionModelNotFound { path: String },

    #[error("Transcription failed: {message}")]
    Transcription { message: String },

    #[error("Transcription did not finish within {secs}s")]
    TranscriptionTimeout { secs: u64 },

    // Clip merge errors
    #[error("Clip merge failed with status {status}: {message}")]
    MergeFailed { status: i32, message: String },

    #[error("Merge tool not found: {tool}")]
    MergeToolNotFound { tool: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ToxiguardError>;
