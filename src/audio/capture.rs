//! Loopback audio capture using CPAL (Cross-Platform Audio Library).

use crate::audio::AudioBuffer;
use crate::audio::source::AudioSource;
use crate::error::{Result, ToxiguardError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// This suppresses noisy ALSA/JACK/PipeWire messages that CPAL triggers
/// when probing audio backends. The messages are harmless but confusing to users.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2 (stderr).
/// Safe as long as no other thread is concurrently manipulating fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Suppress noisy JACK/ALSA error messages that occur during audio backend probing.
///
/// # Safety
/// This modifies environment variables which is safe when called before spawning threads.
pub fn suppress_audio_warnings() {
    // SAFETY: Called at startup before any threads are spawned
    unsafe {
        std::env::set_var("JACK_NO_START_SERVER", "1");
        std::env::set_var("JACK_NO_AUDIO_RESERVATION", "1");
        std::env::set_var("PIPEWIRE_DEBUG", "0");
        std::env::set_var("ALSA_DEBUG", "0");
        std::env::set_var("PW_LOG", "0");
    }
}

/// Check whether a device name matches the loopback pattern (case-insensitive).
fn matches_pattern(name: &str, pattern: &str) -> bool {
    name.to_lowercase().contains(&pattern.to_lowercase())
}

/// List all available audio capture device names.
///
/// # Errors
/// Returns `ToxiguardError::AudioCapture` if device enumeration fails.
///
/// # Note
/// During enumeration, cpal may output ALSA/JACK warnings to stderr while
/// probing backends. These warnings are harmless and can be safely ignored.
pub fn list_devices() -> Result<Vec<String>> {
    let devices = with_suppressed_stderr(|| cpal::default_host().input_devices()).map_err(|e| {
        ToxiguardError::AudioCapture {
            message: format!("Failed to enumerate input devices: {}", e),
        }
    })?;

    let mut device_names = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            device_names.push(name);
        }
    }

    Ok(device_names)
}

/// Loopback capture implementation using CPAL.
///
/// Selects the capture device whose name contains a loopback-identifying
/// substring and records fixed-duration windows of interleaved PCM.
/// There is no retry on a missing device: the operator must fix the system
/// audio routing (e.g. enable VB-Cable) before starting the monitor.
pub struct CpalAudioSource {
    device: cpal::Device,
    name: String,
    channels: u16,
    sample_rate: u32,
}

impl CpalAudioSource {
    /// Open the capture device whose name matches `pattern` (case-insensitive).
    ///
    /// # Arguments
    /// * `pattern` - Loopback-identifying substring, e.g. "cable output"
    /// * `sample_rate` - Fixed recording sample rate in Hz
    ///
    /// # Errors
    /// Returns `ToxiguardError::DeviceNotFound` if no device name contains
    /// the pattern. Fatal at startup by design.
    pub fn open(pattern: &str, sample_rate: u32) -> Result<Self> {
        let (device, name) = with_suppressed_stderr(|| {
            let host = cpal::default_host();
            let devices = host
                .input_devices()
                .map_err(|e| ToxiguardError::AudioCapture {
                    message: format!("Failed to enumerate input devices: {}", e),
                })?;

            for device in devices {
                if let Ok(name) = device.name()
                    && matches_pattern(&name, pattern)
                {
                    return Ok((device, name));
                }
            }

            Err(ToxiguardError::DeviceNotFound {
                pattern: pattern.to_string(),
            })
        })?;

        // Record with the device's native channel count; the clip container
        // carries whatever layout the loopback exposes.
        let channels = device
            .default_input_config()
            .map(|cfg| cfg.channels())
            .unwrap_or(2);

        Ok(Self {
            device,
            name,
            channels,
            sample_rate,
        })
    }

    /// Build an input stream that appends interleaved f32 samples to `buffer`.
    ///
    /// Tries f32 first, then i16 with conversion, at the configured rate.
    fn build_stream(&self, buffer: Arc<Mutex<Vec<f32>>>) -> Result<cpal::Stream> {
        let config = cpal::StreamConfig {
            channels: self.channels,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_callback = |err| {
            eprintln!("Audio stream error: {}", err);
        };

        let sink = Arc::clone(&buffer);
        if let Ok(stream) = self.device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = sink.lock() {
                    buf.extend_from_slice(data);
                }
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        let sink = Arc::clone(&buffer);
        self.device
            .build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = sink.lock() {
                        buf.extend(data.iter().map(|&s| s as f32 / 32768.0));
                    }
                },
                err_callback,
                None,
            )
            .map_err(|e| ToxiguardError::AudioCapture {
                message: format!("Failed to build input stream: {}", e),
            })
    }
}

impl AudioSource for CpalAudioSource {
    fn capture_window(&mut self, duration: Duration) -> Result<AudioBuffer> {
        let target_frames = (self.sample_rate as u64 * duration.as_millis() as u64 / 1000) as usize;
        let target_samples = target_frames * self.channels as usize;

        let buffer = Arc::new(Mutex::new(Vec::with_capacity(target_samples)));
        let stream = self.build_stream(Arc::clone(&buffer))?;
        stream.play().map_err(|e| ToxiguardError::AudioCapture {
            message: format!("Failed to start audio stream: {}", e),
        })?;

        // Block until the full window is in the buffer. Grace period on top
        // of the nominal duration covers stream startup latency; a stream
        // that never delivers data is a capture failure, not a short window.
        let deadline = Instant::now() + duration + Duration::from_secs(5);
        loop {
            let captured = buffer
                .lock()
                .map_err(|e| ToxiguardError::AudioCapture {
                    message: format!("Failed to lock audio buffer: {}", e),
                })?
                .len();
            if captured >= target_samples {
                break;
            }
            if Instant::now() >= deadline {
                return Err(ToxiguardError::AudioCapture {
                    message: format!(
                        "Stream delivered {} of {} samples before deadline",
                        captured, target_samples
                    ),
                });
            }
            std::thread::sleep(Duration::from_millis(50));
        }

        let _ = stream.pause();
        drop(stream);

        let mut samples = buffer
            .lock()
            .map_err(|e| ToxiguardError::AudioCapture {
                message: format!("Failed to lock audio buffer: {}", e),
            })?
            .clone();
        samples.truncate(target_samples);

        Ok(AudioBuffer::new(samples, self.channels, self.sample_rate))
    }

    fn device_name(&self) -> &str {
        &self.name
    }
}
