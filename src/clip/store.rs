//! Clip file storage with peak normalization.

use crate::audio::AudioBuffer;
use crate::error::{Result, ToxiguardError};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes captured buffers as normalized 16-bit PCM WAV files under a single
/// flat output directory.
///
/// Every clip is amplitude-normalized to the full signed-16-bit range against
/// its own peak, never a global reference. Two clips written independently
/// may carry different absolute gain.
pub struct ClipStore {
    output_dir: PathBuf,
}

impl ClipStore {
    /// Create the store, creating the output directory if needed.
    ///
    /// Idempotent: an existing directory is reused. All clip and report
    /// files for a session live directly under it.
    pub fn new(output_dir: &Path) -> Result<Self> {
        fs::create_dir_all(output_dir)?;
        let output_dir = output_dir.canonicalize()?;
        Ok(Self { output_dir })
    }

    /// Absolute path of the output directory.
    pub fn dir(&self) -> &Path {
        &self.output_dir
    }

    /// Absolute path a named clip or report file would have.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    /// Write `buffer` as a peak-normalized 16-bit WAV named `name`.
    ///
    /// The container keeps the buffer's channel count and sample rate.
    ///
    /// # Errors
    /// Returns `ToxiguardError::EmptyBuffer` if the buffer's peak amplitude
    /// is zero; normalizing silence would divide by zero.
    pub fn write(&self, buffer: &AudioBuffer, name: &str) -> Result<PathBuf> {
        let peak = buffer.peak();
        if peak == 0.0 {
            return Err(ToxiguardError::EmptyBuffer {
                name: name.to_string(),
            });
        }
        let scale = i16::MAX as f32 / peak;

        let path = self.path_of(name);
        let spec = hound::WavSpec {
            channels: buffer.channels(),
            sample_rate: buffer.sample_rate(),
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer =
            hound::WavWriter::create(&path, spec).map_err(|e| ToxiguardError::Other(format!(
                "Failed to create clip {}: {}",
                path.display(),
                e
            )))?;

        for &sample in buffer.samples() {
            let scaled = (sample * scale).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
            writer
                .write_sample(scaled)
                .map_err(|e| ToxiguardError::Other(format!("Failed to write clip sample: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| ToxiguardError::Other(format!("Failed to finalize clip: {}", e)))?;

        Ok(path)
    }
}
