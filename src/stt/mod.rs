//! Speech-to-text: transcriber trait, bounded-wait wrapper, Whisper backend.

pub mod transcriber;
pub mod whisper;
