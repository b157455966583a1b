use crate::error::{Result, ToxiguardError};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Trait for speech-to-text transcription of clip files.
///
/// This trait allows swapping implementations (real Whisper vs mock).
pub trait Transcriber: Send + Sync {
    /// Transcribe a normalized 16-bit PCM clip file to plain text.
    ///
    /// Best effort: an empty string is a valid result for silence or
    /// no-speech audio.
    ///
    /// # Arguments
    /// * `clip` - Path to the WAV file to transcribe
    fn transcribe(&self, clip: &Path) -> Result<String>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;

    /// Check if the transcriber is ready
    fn is_ready(&self) -> bool;
}

/// Implement Transcriber for Arc<T> to allow sharing across threads.
impl<T: Transcriber + ?Sized> Transcriber for Arc<T> {
    fn transcribe(&self, clip: &Path) -> Result<String> {
        (**self).transcribe(clip)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Run a transcription with a bounded wait.
///
/// The call itself runs on a worker thread; if it does not finish within
/// `timeout` the caller gets `TranscriptionTimeout` and moves on. The worker
/// is not cancelled: whisper inference runs to completion or failure and its
/// late result is dropped with the channel. This keeps a hung speech-to-text
/// engine from wedging the monitoring loop while preserving the sequential
/// one-tick-at-a-time model.
pub fn transcribe_with_timeout(
    transcriber: &Arc<dyn Transcriber>,
    clip: &Path,
    timeout: Duration,
) -> Result<String> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let worker = Arc::clone(transcriber);
    let clip = clip.to_path_buf();
    std::thread::spawn(move || {
        let _ = tx.send(worker.transcribe(&clip));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(_) => Err(ToxiguardError::TranscriptionTimeout {
            secs: timeout.as_secs(),
        }),
    }
}

/// Mock transcriber for testing.
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    model_name: String,
    response: String,
    should_fail: bool,
    delay: Option<Duration>,
    seen_clips: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            response: "mock transcription".to_string(),
            should_fail: false,
            delay: None,
            seen_clips: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Configure the mock to return a specific response
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Configure the mock to sleep before answering (for timeout tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Clip paths passed to transcribe so far, in call order.
    pub fn seen_clips(&self) -> Vec<PathBuf> {
        self.seen_clips.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, clip: &Path) -> Result<String> {
        if let Ok(mut seen) = self.seen_clips.lock() {
            seen.push(clip.to_path_buf());
        }
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.should_fail {
            Err(ToxiguardError::Transcription {
                message: "mock transcription failure".to_string(),
            })
        } else {
            Ok(self.response.clone())
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}
