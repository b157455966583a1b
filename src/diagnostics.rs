//! System diagnostics and dependency checking.
//!
//! Verifies that required system tools are installed and configured correctly.

use crate::config::Config;
use crate::defaults;
use std::path::Path;
use std::process::Command;

/// Result of a dependency check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Dependency is present and working
    Ok,
    /// Dependency is not found
    NotFound,
    /// Dependency is found but has issues
    Warning(String),
}

/// Check if a command exists and is executable.
///
/// ffmpeg uses a single-dash `-version` flag, so the flag is a parameter.
fn check_command(command: &str, version_flag: &str) -> CheckResult {
    match Command::new(command).arg(version_flag).output() {
        Ok(output) if output.status.success() => CheckResult::Ok,
        Ok(_) => CheckResult::Warning(format!("'{}' found but {} failed", command, version_flag)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("Error checking '{}': {}", command, e)),
    }
}

/// Check that the configured Whisper model file exists on disk.
fn check_model_file(path: &Path) -> CheckResult {
    if path.is_file() {
        CheckResult::Ok
    } else {
        CheckResult::NotFound
    }
}

/// Check that a capture device matching the configured pattern exists.
#[cfg(feature = "cpal-audio")]
fn check_capture_device(pattern: &str) -> CheckResult {
    use crate::audio::capture::list_devices;

    match list_devices() {
        Ok(devices) => {
            let lower = pattern.to_lowercase();
            if devices.iter().any(|d| d.to_lowercase().contains(&lower)) {
                CheckResult::Ok
            } else if devices.is_empty() {
                CheckResult::NotFound
            } else {
                CheckResult::Warning(format!(
                    "No device matching '{}'. Available: {}",
                    pattern,
                    devices.join(", ")
                ))
            }
        }
        Err(e) => CheckResult::Warning(format!("Could not enumerate devices: {}", e)),
    }
}

/// Run all dependency checks and print results.
pub fn check_dependencies(config: &Config) {
    println!("toxiguard {}", crate::version_string());
    println!("Checking system dependencies...\n");

    print!("ffmpeg (clip merging): ");
    match check_command("ffmpeg", "-version") {
        CheckResult::Ok => println!("✓ OK"),
        CheckResult::NotFound => {
            println!("✗ NOT FOUND");
            println!("  Install: sudo apt install ffmpeg  (Debian/Ubuntu)");
            println!("           sudo pacman -S ffmpeg    (Arch)");
            println!("  Without it, incident clips stay unmerged but reports are still written.");
        }
        CheckResult::Warning(msg) => println!("⚠ WARNING: {}", msg),
    }

    let model_path = Path::new(&config.stt.model);
    print!("Whisper model ({}): ", model_path.display());
    match check_model_file(model_path) {
        CheckResult::Ok => println!("✓ OK"),
        CheckResult::NotFound => {
            println!("✗ NOT FOUND");
            println!("  Download a ggml model, e.g.:");
            println!(
                "  curl -Lo {} https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.bin",
                model_path.display()
            );
        }
        CheckResult::Warning(msg) => println!("⚠ WARNING: {}", msg),
    }

    #[cfg(feature = "cpal-audio")]
    {
        print!("Capture device ('{}'): ", config.audio.device_pattern);
        match check_capture_device(&config.audio.device_pattern) {
            CheckResult::Ok => println!("✓ OK"),
            CheckResult::NotFound => {
                println!("✗ NO CAPTURE DEVICES FOUND");
                println!("  A loopback device (e.g., VB-Cable or a PulseAudio monitor) is needed");
                println!("  to hear system audio rather than the microphone.");
            }
            CheckResult::Warning(msg) => println!("⚠ WARNING: {}", msg),
        }
    }

    println!();
    println!("GPU acceleration:");
    println!("  Compiled backend: {}", defaults::gpu_backend());
}
