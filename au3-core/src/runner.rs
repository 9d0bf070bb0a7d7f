//! One-shot child process execution with file-backed output capture.
//!
//! [`SinkRunner`] redirects the child's stdout and stderr into two
//! anonymous temporary files ("sinks") instead of pipes.  The parent never
//! reads while the child is running, so there is no pipe-buffer deadlock
//! and no interleaving race between the two streams: after the child
//! exits each sink is rewound and read to the end.
//!
//! Anonymous temp files are unlinked at creation and vanish when the last
//! handle is closed, so both sinks are released on every exit path,
//! including a failed spawn or wait.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::process::{Command, Stdio};

use serde::Serialize;

use crate::errors::AutoItError;

/// Exit code recorded when the child was terminated without one (signal).
pub const NO_EXIT_CODE: i32 = -1;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Outcome of a single child process run.  Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout decoded lossily as UTF-8.
    pub fn stdout_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }

    /// Stdout with surrounding whitespace removed; the form every
    /// single-line reply is compared in.
    pub fn reply(&self) -> String {
        self.stdout_text().trim().to_owned()
    }
}

// ---------------------------------------------------------------------------
// Runner seam
// ---------------------------------------------------------------------------

/// Runs one external command to completion.
///
/// Any exit code is returned as data; only failing to start or wait for
/// the child is an error.
pub trait ProcessRunner {
    fn run(&self, program: &Path, args: &[&OsStr]) -> Result<ExecutionResult, AutoItError>;
}

/// The production runner: stdin closed, stdout/stderr captured into sinks.
#[derive(Debug, Default, Clone, Copy)]
pub struct SinkRunner;

fn open_sink(stream: &str) -> Result<(File, Stdio), AutoItError> {
    let sink = tempfile::tempfile().map_err(|e| {
        AutoItError::ResourceError(format!("failed to create {stream} sink: {e}"))
    })?;
    let child_end = sink.try_clone().map_err(|e| {
        AutoItError::ResourceError(format!("failed to duplicate {stream} sink: {e}"))
    })?;
    Ok((sink, Stdio::from(child_end)))
}

/// Rewind a sink and read everything the child wrote into it.
fn drain(mut sink: File) -> Result<Vec<u8>, AutoItError> {
    sink.seek(SeekFrom::Start(0))?;
    let mut buf = Vec::new();
    sink.read_to_end(&mut buf)?;
    Ok(buf)
}

impl ProcessRunner for SinkRunner {
    fn run(&self, program: &Path, args: &[&OsStr]) -> Result<ExecutionResult, AutoItError> {
        let (stdout_sink, child_stdout) = open_sink("stdout")?;
        let (stderr_sink, child_stderr) = open_sink("stderr")?;

        log::debug!("spawning {} {:?}", program.display(), args);

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(child_stdout)
            .stderr(child_stderr)
            .spawn()
            .map_err(|e| {
                AutoItError::ResourceError(format!(
                    "failed to spawn {}: {e}",
                    program.display()
                ))
            })?;

        let status = child.wait().map_err(|e| {
            AutoItError::ResourceError(format!("failed to wait for {}: {e}", program.display()))
        })?;

        let exit_code = status.code().unwrap_or_else(|| {
            log::warn!(
                "{} terminated without an exit code ({status}), recording {NO_EXIT_CODE}",
                program.display()
            );
            NO_EXIT_CODE
        });

        let stdout = drain(stdout_sink)?;
        let stderr = drain(stderr_sink)?;

        log::debug!(
            "{} exited with {exit_code} ({} stdout bytes, {} stderr bytes)",
            program.display(),
            stdout.len(),
            stderr.len()
        );

        Ok(ExecutionResult {
            exit_code,
            stdout,
            stderr,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
