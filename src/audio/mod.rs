//! Audio capture: buffer type, source trait, and the cpal implementation.

#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod source;

/// One captured window of interleaved multi-channel PCM samples.
///
/// Immutable once captured; the pipeline iteration that recorded it owns it
/// until it is written to a clip file or discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from interleaved samples.
    ///
    /// `samples.len()` must be a multiple of `channels`; trailing partial
    /// frames are dropped.
    pub fn new(mut samples: Vec<f32>, channels: u16, sample_rate: u32) -> Self {
        let channels = channels.max(1);
        let full_frames = samples.len() / channels as usize;
        samples.truncate(full_frames * channels as usize);
        Self {
            samples,
            channels,
            sample_rate,
        }
    }

    /// Interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Peak absolute amplitude across all channels. Zero for silence.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_counts_per_channel() {
        let buf = AudioBuffer::new(vec![0.0; 8], 2, 44100);
        assert_eq!(buf.frames(), 4);
        assert_eq!(buf.channels(), 2);
        assert_eq!(buf.sample_rate(), 44100);
    }

    #[test]
    fn new_drops_trailing_partial_frame() {
        let buf = AudioBuffer::new(vec![0.1; 7], 2, 44100);
        assert_eq!(buf.samples().len(), 6);
        assert_eq!(buf.frames(), 3);
    }

    #[test]
    fn peak_is_max_absolute_sample() {
        let buf = AudioBuffer::new(vec![0.1, -0.8, 0.3, 0.2], 1, 44100);
        assert_eq!(buf.peak(), 0.8);
    }

    #[test]
    fn peak_of_silence_is_zero() {
        let buf = AudioBuffer::new(vec![0.0; 100], 2, 44100);
        assert_eq!(buf.peak(), 0.0);
    }

    #[test]
    fn zero_channels_clamped_to_one() {
        let buf = AudioBuffer::new(vec![0.0; 4], 0, 44100);
        assert_eq!(buf.channels(), 1);
        assert_eq!(buf.frames(), 4);
    }
}
