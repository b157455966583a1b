//! Lossless clip concatenation through the external ffmpeg muxer.
//!
//! The `CommandExecutor` trait enables full testability without ffmpeg
//! installed: merge behavior is driven through a mock executor in tests.

use crate::clip::store::ClipStore;
use crate::defaults;
use crate::error::{Result, ToxiguardError};
use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// Outcome of one external command invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Trait for executing system commands.
///
/// Object-safe, Send + Sync for use in concurrent contexts.
/// Enables testability by allowing mock implementations.
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with arguments, capturing its output.
    ///
    /// A non-zero exit is NOT an error at this level; callers inspect the
    /// returned status. Only failure to launch the process is an error.
    fn execute(&self, command: &str, args: &[&str]) -> Result<CommandOutput>;
}

/// Production command executor using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor;

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> Result<CommandOutput> {
        let output = Command::new(command).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ToxiguardError::MergeToolNotFound {
                    tool: command.to_string(),
                }
            } else {
                ToxiguardError::Other(format!("Failed to execute {}: {}", command, e))
            }
        })?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Trait for merging clip files into one compound clip.
pub trait ClipMerger: Send {
    /// Losslessly concatenate `inputs` (clip names inside `store`, in the
    /// given order) into `output`.
    ///
    /// Ordering semantics belong to the caller; this component never
    /// reorders.
    ///
    /// # Errors
    /// Returns `ToxiguardError::MergeFailed` carrying the tool's exit status
    /// if the muxer exits non-zero or the output file is absent afterwards.
    fn concat(&self, store: &ClipStore, inputs: &[&str], output: &str) -> Result<PathBuf>;
}

/// ffmpeg-based merger using the concat demuxer with codec copy.
pub struct FfmpegMerger<E: CommandExecutor> {
    executor: E,
}

impl<E: CommandExecutor> FfmpegMerger<E> {
    /// Create a new FfmpegMerger with the given executor.
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

impl FfmpegMerger<SystemCommandExecutor> {
    /// Create an FfmpegMerger that invokes the real ffmpeg binary.
    pub fn system() -> Self {
        Self::new(SystemCommandExecutor::new())
    }
}

impl<E: CommandExecutor> ClipMerger for FfmpegMerger<E> {
    fn concat(&self, store: &ClipStore, inputs: &[&str], output: &str) -> Result<PathBuf> {
        // Concat list format: one `file '<name>'` line per input, names
        // relative to the list's own directory. `-safe 0` permits them.
        let mut filelist = String::new();
        for name in inputs {
            filelist.push_str(&format!("file '{}'\n", name));
        }
        let filelist_path = store.path_of(defaults::FILELIST_NAME);
        fs::write(&filelist_path, filelist)?;

        let output_path = store.path_of(output);
        let filelist_arg = filelist_path.to_string_lossy().to_string();
        let output_arg = output_path.to_string_lossy().to_string();

        let result = self.executor.execute(
            "ffmpeg",
            &[
                "-y",
                "-f",
                "concat",
                "-safe",
                "0",
                "-i",
                &filelist_arg,
                "-c",
                "copy",
                &output_arg,
            ],
        )?;

        if !result.success() {
            return Err(ToxiguardError::MergeFailed {
                status: result.status.unwrap_or(-1),
                message: result.stderr.trim().to_string(),
            });
        }
        if !output_path.exists() {
            return Err(ToxiguardError::MergeFailed {
                status: result.status.unwrap_or(-1),
                message: format!("ffmpeg exited cleanly but {} is absent", output),
            });
        }

        Ok(output_path)
    }
}

/// Mock merger for pipeline tests.
///
/// On success it writes a marker output file so existence checks hold.
#[derive(Debug, Clone)]
pub struct MockClipMerger {
    should_fail: bool,
    status: i32,
}

impl MockClipMerger {
    pub fn new() -> Self {
        Self {
            should_fail: false,
            status: 0,
        }
    }

    /// Configure the mock to fail with the given exit status.
    pub fn with_failure(mut self, status: i32) -> Self {
        self.should_fail = true;
        self.status = status;
        self
    }
}

impl Default for MockClipMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipMerger for MockClipMerger {
    fn concat(&self, store: &ClipStore, inputs: &[&str], output: &str) -> Result<PathBuf> {
        if self.should_fail {
            return Err(ToxiguardError::MergeFailed {
                status: self.status,
                message: "mock merge failure".to_string(),
            });
        }
        let path = store.path_of(output);
        fs::write(&path, inputs.join("+"))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioBuffer;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Executor that records invocations and returns a canned output.
    struct RecordingExecutor {
        calls: Mutex<Vec<(String, Vec<String>)>>,
        output: CommandOutput,
        create_output_file: bool,
    }

    impl RecordingExecutor {
        fn new(status: Option<i32>, stderr: &str, create_output_file: bool) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                output: CommandOutput {
                    status,
                    stdout: String::new(),
                    stderr: stderr.to_string(),
                },
                create_output_file,
            }
        }
    }

    impl CommandExecutor for RecordingExecutor {
        fn execute(&self, command: &str, args: &[&str]) -> Result<CommandOutput> {
            self.calls.lock().unwrap().push((
                command.to_string(),
                args.iter().map(|s| s.to_string()).collect(),
            ));
            if self.create_output_file {
                // The output path is ffmpeg's final argument
                if let Some(path) = args.last() {
                    fs::write(path, b"riff").unwrap();
                }
            }
            Ok(self.output.clone())
        }
    }

    fn store() -> (TempDir, ClipStore) {
        let dir = TempDir::new().unwrap();
        let store = ClipStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn concat_writes_filelist_in_order() {
        let (_dir, store) = store();
        let merger = FfmpegMerger::new(RecordingExecutor::new(Some(0), "", true));

        merger
            .concat(&store, &["before.wav", "after.wav"], "compound.wav")
            .unwrap();

        let filelist = fs::read_to_string(store.path_of(defaults::FILELIST_NAME)).unwrap();
        assert_eq!(filelist, "file 'before.wav'\nfile 'after.wav'\n");
    }

    #[test]
    fn concat_invokes_ffmpeg_concat_demuxer_with_copy() {
        let (_dir, store) = store();
        let executor = RecordingExecutor::new(Some(0), "", true);
        let merger = FfmpegMerger::new(executor);

        merger
            .concat(&store, &["before.wav", "after.wav"], "compound.wav")
            .unwrap();

        let calls = merger.executor.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (cmd, args) = &calls[0];
        assert_eq!(cmd, "ffmpeg");
        assert!(args.contains(&"concat".to_string()));
        assert!(args.contains(&"-safe".to_string()));
        assert!(args.contains(&"0".to_string()));
        assert!(args.contains(&"copy".to_string()));
        assert!(args.last().unwrap().ends_with("compound.wav"));
    }

    #[test]
    fn concat_nonzero_exit_is_merge_failed_with_status() {
        let (_dir, store) = store();
        let merger = FfmpegMerger::new(RecordingExecutor::new(Some(1), "bad concat list", false));

        let result = merger.concat(&store, &["before.wav", "after.wav"], "compound.wav");
        match result {
            Err(ToxiguardError::MergeFailed { status, message }) => {
                assert_eq!(status, 1);
                assert_eq!(message, "bad concat list");
            }
            _ => panic!("Expected MergeFailed"),
        }
    }

    #[test]
    fn concat_missing_output_file_is_merge_failed() {
        let (_dir, store) = store();
        // Exit 0 but never creates the output file
        let merger = FfmpegMerger::new(RecordingExecutor::new(Some(0), "", false));

        let result = merger.concat(&store, &["before.wav", "after.wav"], "compound.wav");
        match result {
            Err(ToxiguardError::MergeFailed { status, message }) => {
                assert_eq!(status, 0);
                assert!(message.contains("absent"));
            }
            _ => panic!("Expected MergeFailed"),
        }
    }

    #[test]
    fn concat_signal_killed_maps_to_minus_one() {
        let (_dir, store) = store();
        let merger = FfmpegMerger::new(RecordingExecutor::new(None, "killed", false));

        let result = merger.concat(&store, &["a.wav"], "compound.wav");
        match result {
            Err(ToxiguardError::MergeFailed { status, .. }) => assert_eq!(status, -1),
            _ => panic!("Expected MergeFailed"),
        }
    }

    #[test]
    fn mock_merger_creates_output_on_success() {
        let (_dir, store) = store();
        let merger = MockClipMerger::new();

        let path = merger
            .concat(&store, &["before.wav", "after.wav"], "compound.wav")
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn mock_merger_failure_carries_status() {
        let (_dir, store) = store();
        let merger = MockClipMerger::new().with_failure(187);

        match merger.concat(&store, &["a.wav"], "compound.wav") {
            Err(ToxiguardError::MergeFailed { status, .. }) => assert_eq!(status, 187),
            _ => panic!("Expected MergeFailed"),
        }
    }

    #[test]
    fn system_executor_reports_missing_tool() {
        let executor = SystemCommandExecutor::new();
        let result = executor.execute("definitely-not-a-real-tool-9941", &[]);
        match result {
            Err(ToxiguardError::MergeToolNotFound { tool }) => {
                assert_eq!(tool, "definitely-not-a-real-tool-9941");
            }
            _ => panic!("Expected MergeToolNotFound"),
        }
    }

    #[test]
    fn store_paths_used_by_merger_are_absolute() {
        let (_dir, store) = store();
        let buffer = AudioBuffer::new(vec![0.5; 4], 1, 44100);
        store.write(&buffer, "before.wav").unwrap();
        assert!(store.path_of(defaults::FILELIST_NAME).is_absolute());
    }
}
