use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub monitor: MonitorSection,
    pub stt: SttConfig,
    pub toxicity: ToxicityConfig,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    /// Case-insensitive substring matched against device names
    pub device_pattern: String,
    pub sample_rate: u32,
    pub window_secs: u64,
}

/// Monitor loop configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorSection {
    pub interval_secs: u64,
    pub output_dir: PathBuf,
    pub transcription_timeout_secs: u64,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub model: String,
    pub language: String,
}

/// Toxic vocabulary configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToxicityConfig {
    pub vocabulary: Vec<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device_pattern: defaults::DEVICE_PATTERN.to_string(),
            sample_rate: defaults::SAMPLE_RATE,
            window_secs: defaults::WINDOW_SECS,
        }
    }
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            interval_secs: defaults::POLL_INTERVAL_SECS,
            output_dir: PathBuf::from(defaults::OUTPUT_DIR),
            transcription_timeout_secs: defaults::TRANSCRIPTION_TIMEOUT_SECS,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Default for ToxicityConfig {
    fn default() -> Self {
        Self {
            vocabulary: defaults::TOXIC_VOCABULARY
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Self::default()
                } else {
                    panic!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Reject values the pipeline cannot run with.
    fn validate(&self) -> anyhow::Result<()> {
        if self.audio.window_secs == 0 {
            anyhow::bail!("audio.window_secs must be greater than zero");
        }
        if self.audio.sample_rate == 0 {
            anyhow::bail!("audio.sample_rate must be greater than zero");
        }
        if self.monitor.transcription_timeout_secs == 0 {
            anyhow::bail!("monitor.transcription_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - TOXIGUARD_MODEL → stt.model
    /// - TOXIGUARD_AUDIO_DEVICE → audio.device_pattern
    /// - TOXIGUARD_OUTPUT_DIR → monitor.output_dir
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("TOXIGUARD_MODEL")
            && !model.is_empty()
        {
            self.stt.model = model;
        }

        if let Ok(device) = std::env::var("TOXIGUARD_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device_pattern = device;
        }

        if let Ok(dir) = std::env::var("TOXIGUARD_OUTPUT_DIR")
            && !dir.is_empty()
        {
            self.monitor.output_dir = PathBuf::from(dir);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/toxiguard/config.toml on Linux
    #[cfg(feature = "cli")]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("toxiguard")
            .join("config.toml")
    }
}
