//! Monitor application entry point.
//!
//! Orchestrates the complete detection flow:
//! capture → transcribe → score → incident capture

use crate::audio::capture::{CpalAudioSource, suppress_audio_warnings};
use crate::audio::source::AudioSource;
use crate::clip::merger::{ClipMerger, FfmpegMerger};
use crate::clip::store::ClipStore;
use crate::config::Config;
use crate::error::{Result, ToxiguardError};
use crate::monitor::{Monitor, MonitorConfig, TickOutcome};
use crate::stt::transcriber::Transcriber;
use crate::stt::whisper::{WhisperConfig, WhisperTranscriber};
use crate::toxicity::scorer::ToxicityScorer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Run the monitor command: poll system audio until interrupted.
///
/// # Arguments
/// * `config` - Base configuration (can be overridden by CLI args)
/// * `device` - Optional device pattern override from CLI
/// * `model` - Optional model path override from CLI
/// * `language` - Optional language override from CLI
/// * `output_dir` - Optional output directory override from CLI
/// * `window` - Optional capture window override in seconds
/// * `interval` - Optional poll interval override in seconds
/// * `quiet` - Suppress status messages
/// * `verbosity` - Verbosity level (0=default, 1=per-window transcripts)
/// * `once` - Exit after the first poll tick
#[allow(clippy::too_many_arguments)]
pub async fn run_monitor_command(
    mut config: Config,
    device: Option<String>,
    model: Option<String>,
    language: Option<String>,
    output_dir: Option<PathBuf>,
    window: Option<u64>,
    interval: Option<u64>,
    quiet: bool,
    verbosity: u8,
    once: bool,
) -> Result<()> {
    // Suppress noisy JACK/ALSA warnings before audio init
    suppress_audio_warnings();

    // Apply CLI overrides
    if let Some(d) = device {
        config.audio.device_pattern = d;
    }
    if let Some(m) = model {
        config.stt.model = m;
    }
    if let Some(l) = language {
        config.stt.language = l;
    }
    if let Some(dir) = output_dir {
        config.monitor.output_dir = dir;
    }
    if let Some(secs) = window {
        config.audio.window_secs = secs;
    }
    if let Some(secs) = interval {
        config.monitor.interval_secs = secs;
    }

    // Load the model ONCE before the loop (this is the slow part)
    if !quiet {
        eprintln!("Loading model '{}'...", config.stt.model);
    }
    let transcriber: Arc<dyn Transcriber> = Arc::new(WhisperTranscriber::new(WhisperConfig {
        model_path: PathBuf::from(&config.stt.model),
        language: config.stt.language.clone(),
        threads: None,
    })?);

    if verbosity >= 1 {
        match crate::audio::capture::list_devices() {
            Ok(devices) => {
                eprintln!("Capture devices:");
                for name in &devices {
                    eprintln!("  {}", name);
                }
            }
            Err(e) => eprintln!("Could not enumerate capture devices: {}", e),
        }
    }

    // Device selection is the one fatal startup step; a missing loopback
    // device means there is nothing to monitor.
    let source: Box<dyn AudioSource> = Box::new(CpalAudioSource::open(
        &config.audio.device_pattern,
        config.audio.sample_rate,
    )?);
    if !quiet {
        eprintln!(
            "Monitoring '{}' in {}s windows. Output: {}",
            source.device_name(),
            config.audio.window_secs,
            config.monitor.output_dir.display()
        );
    }

    let store = ClipStore::new(&config.monitor.output_dir)?;
    let merger: Box<dyn ClipMerger> = Box::new(FfmpegMerger::system());
    let scorer = ToxicityScorer::new(config.toxicity.vocabulary.clone());

    let monitor_config = MonitorConfig {
        window: Duration::from_secs(config.audio.window_secs),
        interval: Duration::from_secs(config.monitor.interval_secs),
        transcription_timeout: Duration::from_secs(config.monitor.transcription_timeout_secs),
        quiet,
        verbosity,
    };

    let mut monitor = Monitor::new(source, transcriber, merger, store, scorer, monitor_config);

    if once {
        match monitor.tick()? {
            TickOutcome::Clean { transcript } => {
                if !quiet {
                    eprintln!("No toxic speech detected.");
                }
                if verbosity >= 1 {
                    eprintln!("transcript: \"{}\"", transcript);
                }
            }
            TickOutcome::Incident(report) => {
                if !quiet {
                    eprintln!(
                        "Incident recorded: {} flagged term(s), score {:.3}",
                        report.flagged_words.len(),
                        report.toxicity_score
                    );
                }
            }
        }
        return Ok(());
    }

    let handle = monitor.start();

    // Wait for Ctrl+C
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| ToxiguardError::Other(format!("Failed to wait for Ctrl+C: {}", e)))?;

    if !quiet {
        eprintln!("\nShutting down...");
    }

    handle.stop();
    Ok(())
}
