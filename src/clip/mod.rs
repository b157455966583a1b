//! Clip persistence: normalized WAV writing and ffmpeg concatenation.

pub mod merger;
pub mod store;
