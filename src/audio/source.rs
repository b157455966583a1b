use crate::audio::AudioBuffer;
use crate::error::{Result, ToxiguardError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Trait for audio capture devices.
///
/// This trait allows swapping implementations (real loopback device vs mock).
pub trait AudioSource: Send {
    /// Record a fixed-duration window from the source.
    ///
    /// Blocks for the full duration. There is no partial-result path: a
    /// device-level error aborts the whole window, since a silently shortened
    /// window would be a monitoring gap.
    ///
    /// # Returns
    /// The captured buffer, or an error
    fn capture_window(&mut self, duration: Duration) -> Result<AudioBuffer>;

    /// Display name of the selected capture device.
    fn device_name(&self) -> &str;
}

/// Mock audio source for testing.
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    name: String,
    buffers: Vec<AudioBuffer>,
    next: usize,
    should_fail: bool,
    error_message: String,
    // Shared across clones so tests can observe calls from a moved mock
    captures: Arc<Mutex<usize>>,
}

impl MockAudioSource {
    /// Create a new mock audio source with default settings.
    ///
    /// Returns a quiet-but-not-silent 1-channel buffer on each capture.
    pub fn new() -> Self {
        Self {
            name: "Mock Loopback".to_string(),
            buffers: vec![AudioBuffer::new(vec![0.1; 441], 1, 44100)],
            next: 0,
            should_fail: false,
            error_message: "mock audio error".to_string(),
            captures: Arc::new(Mutex::new(0)),
        }
    }

    /// Configure the buffers returned by successive captures.
    ///
    /// The last buffer repeats once the list is exhausted.
    pub fn with_buffers(mut self, buffers: Vec<AudioBuffer>) -> Self {
        self.buffers = buffers;
        self
    }

    /// Configure the mock to fail on capture.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Configure the error message for failures.
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Number of capture calls made so far.
    pub fn captures(&self) -> usize {
        self.captures.lock().map(|n| *n).unwrap_or(0)
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn capture_window(&mut self, _duration: Duration) -> Result<AudioBuffer> {
        if let Ok(mut n) = self.captures.lock() {
            *n += 1;
        }
        if self.should_fail {
            return Err(ToxiguardError::AudioCapture {
                message: self.error_message.clone(),
            });
        }
        let idx = self.next.min(self.buffers.len().saturating_sub(1));
        if self.next + 1 < self.buffers.len() {
            self.next += 1;
        }
        self.buffers
            .get(idx)
            .cloned()
            .ok_or_else(|| ToxiguardError::AudioCapture {
                message: "mock has no buffers".to_string(),
            })
    }

    fn device_name(&self) -> &str {
        &self.name
    }
}
