//! Detection pipeline that runs from startup until shutdown.
//!
//! One logical thread of control: capture → transcribe → score →
//! maybe-capture-incident, one tick at a time, never overlapping. Audio
//! capture blocks for its full window and is the dominant latency source;
//! nothing can be detected faster than one window length.

use crate::audio::source::AudioSource;
use crate::clip::merger::ClipMerger;
use crate::clip::store::ClipStore;
use crate::defaults;
use crate::error::Result;
use crate::stt::transcriber::{Transcriber, transcribe_with_timeout};
use crate::toxicity::report::IncidentReport;
use crate::toxicity::scorer::ToxicityScorer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Configuration for the monitor loop.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Duration of one captured window
    pub window: Duration,
    /// Pause between poll ticks
    pub interval: Duration,
    /// Bounded wait for one transcription call
    pub transcription_timeout: Duration,
    /// Suppress status messages
    pub quiet: bool,
    /// Verbosity level (0=default, 1=per-tick transcripts)
    pub verbosity: u8,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(defaults::WINDOW_SECS),
            interval: Duration::from_secs(defaults::POLL_INTERVAL_SECS),
            transcription_timeout: Duration::from_secs(defaults::TRANSCRIPTION_TIMEOUT_SECS),
            quiet: false,
            verbosity: 0,
        }
    }
}

/// Result of one poll tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No vocabulary match in this window.
    Clean { transcript: String },
    /// Toxic speech detected; incident files written.
    Incident(IncidentReport),
}

/// The orchestrator: owns the poll loop and the
/// before/after/merge/score/report sequence. Sole stateful component.
pub struct Monitor {
    source: Box<dyn AudioSource>,
    transcriber: Arc<dyn Transcriber>,
    merger: Box<dyn ClipMerger>,
    store: ClipStore,
    scorer: ToxicityScorer,
    config: MonitorConfig,
}

impl Monitor {
    pub fn new(
        source: Box<dyn AudioSource>,
        transcriber: Arc<dyn Transcriber>,
        merger: Box<dyn ClipMerger>,
        store: ClipStore,
        scorer: ToxicityScorer,
        config: MonitorConfig,
    ) -> Self {
        Self {
            source,
            transcriber,
            merger,
            store,
            scorer,
            config,
        }
    }

    /// The clip store backing this monitor.
    pub fn store(&self) -> &ClipStore {
        &self.store
    }

    /// Run exactly one poll tick: capture a window, transcribe, score, and
    /// on a match run the incident-capture sequence.
    ///
    /// Capture, transcription, and silent-buffer errors propagate; the outer
    /// loop treats them as recoverable and retries next tick. Only a merge
    /// failure is swallowed here, so the incident report survives it.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        let buffer = self.source.capture_window(self.config.window)?;

        let scratch = self.store.write(&buffer, defaults::SCRATCH_CLIP)?;
        let transcript = transcribe_with_timeout(
            &self.transcriber,
            &scratch,
            self.config.transcription_timeout,
        )?;
        if self.config.verbosity >= 1 {
            eprintln!("transcript: \"{}\"", transcript);
        }

        let event = self.scorer.score(&transcript);
        if !event.is_incident() {
            return Ok(TickOutcome::Clean { transcript });
        }

        if !self.config.quiet {
            eprintln!(
                "Toxic speech detected ({}), capturing incident clip...",
                event.matched_terms.join(", ")
            );
        }

        // The "before" clip must be the exact buffer that was scored, never
        // a fresh recording; re-recording would lose the flagged audio.
        self.store.write(&buffer, defaults::BEFORE_CLIP)?;

        // The "after" window necessarily starts after the flag fired; the
        // audio between flag and capture start is lost. Accepted gap of
        // polling-based monitoring.
        let after = self.source.capture_window(self.config.window)?;
        self.store.write(&after, defaults::AFTER_CLIP)?;

        match self.merger.concat(
            &self.store,
            &[defaults::BEFORE_CLIP, defaults::AFTER_CLIP],
            defaults::COMPOUND_CLIP,
        ) {
            Ok(path) => {
                if !self.config.quiet {
                    eprintln!("Compound clip saved to {}", path.display());
                }
            }
            Err(e) => {
                // Incident-local failure: keep the unmerged before/after
                // clips and still write the report.
                eprintln!("toxiguard: clip merge failed, keeping unmerged clips: {}", e);
            }
        }

        // The report carries the transcript that tripped detection, not a
        // re-transcription of the compound clip. One transcription per
        // window; the report is about the flagged utterance.
        let report = IncidentReport::from_event(&event);
        report.write(&self.store)?;
        if !self.config.quiet {
            eprintln!(
                "Incident report written to {}",
                self.store.path_of(defaults::REPORT_FILE).display()
            );
        }

        Ok(TickOutcome::Incident(report))
    }

    /// Run the poll loop until `stop` is set.
    ///
    /// A failed tick is logged and the loop continues; no single tick's
    /// failure terminates monitoring. Startup failures (device selection,
    /// model loading) happen before a Monitor exists.
    pub fn run(&mut self, stop: &AtomicBool) {
        while !stop.load(Ordering::SeqCst) {
            match self.tick() {
                Ok(TickOutcome::Clean { .. }) => {
                    if self.config.verbosity >= 1 {
                        eprintln!("Window clean.");
                    }
                }
                Ok(TickOutcome::Incident(report)) => {
                    if !self.config.quiet {
                        eprintln!(
                            "Incident recorded: {} flagged term(s), score {:.3}",
                            report.flagged_words.len(),
                            report.toxicity_score
                        );
                    }
                }
                Err(e) => {
                    eprintln!("toxiguard: tick failed, retrying next window: {}", e);
                }
            }

            // Sliced sleep keeps shutdown responsive between ticks. An
            // in-flight capture or transcription still runs to completion.
            let deadline = Instant::now() + self.config.interval;
            while Instant::now() < deadline && !stop.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(100));
            }
        }
    }

    /// Start the monitor on a background thread.
    pub fn start(mut self) -> MonitorHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let thread = thread::spawn(move || {
            self.run(&thread_stop);
        });

        MonitorHandle {
            stop,
            thread: Some(thread),
        }
    }
}

/// Handle to a running monitor.
pub struct MonitorHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Signal shutdown and wait for the loop to finish its current tick.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take()
            && let Err(panic_info) = thread.join()
        {
            let msg = panic_info
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
                .unwrap_or("unknown panic");
            eprintln!("toxiguard: monitor thread panicked: {msg}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioBuffer;
    use crate::audio::source::MockAudioSource;
    use crate::clip::merger::MockClipMerger;
    use crate::error::ToxiguardError;
    use crate::stt::transcriber::MockTranscriber;
    use tempfile::TempDir;

    fn speech_buffer(frames: usize) -> AudioBuffer {
        let samples: Vec<f32> = (0..frames * 2)
            .map(|i| ((i % 20) as f32 - 10.0) * 0.05)
            .collect();
        AudioBuffer::new(samples, 2, 44100)
    }

    fn quiet_config() -> MonitorConfig {
        MonitorConfig {
            window: Duration::from_millis(10),
            interval: Duration::from_millis(10),
            transcription_timeout: Duration::from_secs(5),
            quiet: true,
            verbosity: 0,
        }
    }

    fn monitor_with(
        dir: &TempDir,
        source: MockAudioSource,
        transcriber: MockTranscriber,
        merger: MockClipMerger,
    ) -> Monitor {
        Monitor::new(
            Box::new(source),
            Arc::new(transcriber),
            Box::new(merger),
            ClipStore::new(dir.path()).unwrap(),
            ToxicityScorer::builtin(),
            quiet_config(),
        )
    }

    #[test]
    fn clean_tick_writes_only_scratch_clip() {
        let dir = TempDir::new().unwrap();
        let mut monitor = monitor_with(
            &dir,
            MockAudioSource::new().with_buffers(vec![speech_buffer(100)]),
            MockTranscriber::new("m").with_response("nice shot, well played"),
            MockClipMerger::new(),
        );

        let outcome = monitor.tick().unwrap();
        assert_eq!(
            outcome,
            TickOutcome::Clean {
                transcript: "nice shot, well played".to_string()
            }
        );

        let store = monitor.store();
        assert!(store.path_of(defaults::SCRATCH_CLIP).exists());
        assert!(!store.path_of(defaults::BEFORE_CLIP).exists());
        assert!(!store.path_of(defaults::AFTER_CLIP).exists());
        assert!(!store.path_of(defaults::COMPOUND_CLIP).exists());
        assert!(!store.path_of(defaults::REPORT_FILE).exists());
        assert!(!store.path_of(defaults::TRANSCRIPT_FILE).exists());
    }

    #[test]
    fn incident_tick_writes_full_file_set() {
        let dir = TempDir::new().unwrap();
        let mut monitor = monitor_with(
            &dir,
            MockAudioSource::new().with_buffers(vec![speech_buffer(100), speech_buffer(80)]),
            MockTranscriber::new("m").with_response("this game is trash"),
            MockClipMerger::new(),
        );

        let outcome = monitor.tick().unwrap();
        let TickOutcome::Incident(report) = outcome else {
            panic!("Expected incident");
        };
        assert_eq!(report.flagged_words, vec!["trash"]);
        assert_eq!(
            report.toxicity_score,
            1.0 / defaults::TOXIC_VOCABULARY.len() as f32
        );

        let store = monitor.store();
        for name in [
            defaults::SCRATCH_CLIP,
            defaults::BEFORE_CLIP,
            defaults::AFTER_CLIP,
            defaults::COMPOUND_CLIP,
            defaults::TRANSCRIPT_FILE,
            defaults::REPORT_FILE,
        ] {
            assert!(store.path_of(name).exists(), "{} missing", name);
        }
    }

    #[test]
    fn before_clip_is_the_scored_buffer_not_a_recapture() {
        let dir = TempDir::new().unwrap();
        // First capture 100 frames (the scored window), second 80 (after)
        let mut monitor = monitor_with(
            &dir,
            MockAudioSource::new().with_buffers(vec![speech_buffer(100), speech_buffer(80)]),
            MockTranscriber::new("m").with_response("kys"),
            MockClipMerger::new(),
        );

        monitor.tick().unwrap();

        let frames = |name: &str| {
            hound::WavReader::open(monitor.store().path_of(name))
                .unwrap()
                .duration()
        };
        assert_eq!(frames(defaults::BEFORE_CLIP), 100);
        assert_eq!(frames(defaults::AFTER_CLIP), 80);
        // Scratch and before come from the same buffer
        assert_eq!(frames(defaults::SCRATCH_CLIP), 100);
    }

    #[test]
    fn transcriber_sees_the_scratch_clip() {
        let dir = TempDir::new().unwrap();
        let transcriber = MockTranscriber::new("m").with_response("all clear");
        let mut monitor = monitor_with(
            &dir,
            MockAudioSource::new().with_buffers(vec![speech_buffer(50)]),
            transcriber.clone(),
            MockClipMerger::new(),
        );

        monitor.tick().unwrap();

        let seen = transcriber.seen_clips();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].ends_with(defaults::SCRATCH_CLIP));
    }

    #[test]
    fn merge_failure_still_writes_report() {
        let dir = TempDir::new().unwrap();
        let mut monitor = monitor_with(
            &dir,
            MockAudioSource::new().with_buffers(vec![speech_buffer(100), speech_buffer(80)]),
            MockTranscriber::new("m").with_response("what a stupid idiot"),
            MockClipMerger::new().with_failure(1),
        );

        let outcome = monitor.tick().unwrap();
        let TickOutcome::Incident(report) = outcome else {
            panic!("Expected incident despite merge failure");
        };
        assert_eq!(report.flagged_words, vec!["stupid", "idiot"]);

        let store = monitor.store();
        assert!(!store.path_of(defaults::COMPOUND_CLIP).exists());
        assert!(store.path_of(defaults::BEFORE_CLIP).exists());
        assert!(store.path_of(defaults::AFTER_CLIP).exists());
        assert!(store.path_of(defaults::REPORT_FILE).exists());
    }

    #[test]
    fn silent_window_aborts_tick_with_empty_buffer_error() {
        let dir = TempDir::new().unwrap();
        let silent = AudioBuffer::new(vec![0.0; 200], 2, 44100);
        let mut monitor = monitor_with(
            &dir,
            MockAudioSource::new().with_buffers(vec![silent]),
            MockTranscriber::new("m"),
            MockClipMerger::new(),
        );

        assert!(matches!(
            monitor.tick(),
            Err(ToxiguardError::EmptyBuffer { .. })
        ));
    }

    #[test]
    fn transcription_failure_aborts_tick() {
        let dir = TempDir::new().unwrap();
        let mut monitor = monitor_with(
            &dir,
            MockAudioSource::new().with_buffers(vec![speech_buffer(50)]),
            MockTranscriber::new("m").with_failure(),
            MockClipMerger::new(),
        );

        assert!(matches!(
            monitor.tick(),
            Err(ToxiguardError::Transcription { .. })
        ));
        assert!(!monitor.store().path_of(defaults::REPORT_FILE).exists());
    }

    #[test]
    fn capture_failure_aborts_tick() {
        let dir = TempDir::new().unwrap();
        let mut monitor = monitor_with(
            &dir,
            MockAudioSource::new().with_failure(),
            MockTranscriber::new("m"),
            MockClipMerger::new(),
        );

        assert!(matches!(
            monitor.tick(),
            Err(ToxiguardError::AudioCapture { .. })
        ));
    }

    #[test]
    fn start_stop_joins_cleanly_and_keeps_running_through_bad_ticks() {
        let dir = TempDir::new().unwrap();
        // Failing source: every tick errors, the loop must keep going
        let monitor = monitor_with(
            &dir,
            MockAudioSource::new().with_failure(),
            MockTranscriber::new("m"),
            MockClipMerger::new(),
        );

        let handle = monitor.start();
        thread::sleep(Duration::from_millis(100));
        handle.stop();
    }

    #[test]
    fn second_incident_overwrites_first_report() {
        let dir = TempDir::new().unwrap();
        let store = ClipStore::new(dir.path()).unwrap();

        let mut first = Monitor::new(
            Box::new(MockAudioSource::new().with_buffers(vec![speech_buffer(100)])),
            Arc::new(MockTranscriber::new("m").with_response("total noob")),
            Box::new(MockClipMerger::new()),
            ClipStore::new(dir.path()).unwrap(),
            ToxicityScorer::builtin(),
            quiet_config(),
        );
        first.tick().unwrap();

        let mut second = Monitor::new(
            Box::new(MockAudioSource::new().with_buffers(vec![speech_buffer(100)])),
            Arc::new(MockTranscriber::new("m").with_response("this game is trash")),
            Box::new(MockClipMerger::new()),
            ClipStore::new(dir.path()).unwrap(),
            ToxicityScorer::builtin(),
            quiet_config(),
        );
        second.tick().unwrap();

        let json = std::fs::read_to_string(store.path_of(defaults::REPORT_FILE)).unwrap();
        let report: IncidentReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report.transcription, "this game is trash");
        assert_eq!(report.flagged_words, vec!["trash"]);
    }
}
