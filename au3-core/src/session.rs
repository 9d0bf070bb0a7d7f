//! The interpreter session: one script slot, one child process per call.
//!
//! A [`Session`] owns a single reusable temporary file (the *script slot*)
//! and the resolved interpreter path.  [`Session::execute`] writes the
//! script into the slot, runs `AutoIt3.exe <slot>` through a
//! [`ProcessRunner`], and empties the slot again on every exit path via
//! the [`LoadedSlot`] guard.
//!
//! # Concurrency
//!
//! `execute` takes `&mut self`: the slot is shared mutable state, so a
//! session serves one call at a time.  Use one session per concurrent
//! caller.  There is no timeout; a hung interpreter blocks the caller.

use std::ffi::OsStr;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tempfile::NamedTempFile;

use crate::errors::AutoItError;
use crate::locate::{is_executable, locate_interpreter};
use crate::path::PathTranslator;
use crate::runner::{ExecutionResult, ProcessRunner, SinkRunner};

/// Interpreter switch that sends fatal script errors to stdout instead of
/// a modal dialog.
pub const ERROR_STD_OUT_SWITCH: &str = "/ErrorStdOut";

/// Quote `text` as an AutoIt string literal.
///
/// Embedded double quotes are doubled and the whole value is wrapped in
/// double quotes.  This is the only escaping primitive the typed wrappers use.
pub fn quote_string(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How a [`Session`] is constructed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Explicit path to `AutoIt3.exe`; `None` or empty means auto-detect.
    pub interpreter: Option<PathBuf>,
    /// Pass [`ERROR_STD_OUT_SWITCH`] to the interpreter.
    pub error_std_out: bool,
}

impl SessionOptions {
    pub fn with_interpreter(path: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: Some(path.into()),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Script slot
// ---------------------------------------------------------------------------

/// The reusable script file.  Deleted from disk when dropped.
#[derive(Debug)]
struct ScriptSlot {
    file: NamedTempFile,
    /// Slot path as the interpreter must see it.
    host_path: PathBuf,
}

impl ScriptSlot {
    fn allocate(translator: &PathTranslator) -> Result<Self, AutoItError> {
        let file = tempfile::Builder::new()
            .prefix("au3-slot-")
            .suffix(".au3")
            .tempfile()
            .map_err(|e| {
                AutoItError::ResourceError(format!("failed to create script slot: {e}"))
            })?;
        let host_path = translator.to_host_convention(file.path())?;
        Ok(Self { file, host_path })
    }
}

/// RAII guard over a slot holding a script.
///
/// Dropping it rewinds the slot and truncates it to zero length, whether
/// the run succeeded, failed, or never started.
#[must_use = "the slot is emptied as soon as the guard is dropped"]
struct LoadedSlot<'a> {
    file: &'a mut File,
}

impl<'a> LoadedSlot<'a> {
    fn load(file: &'a mut File, script: &str) -> Result<Self, AutoItError> {
        let guard = Self { file };
        guard.file.write_all(script.as_bytes()).map_err(|e| {
            AutoItError::ResourceError(format!("failed to write script slot: {e}"))
        })?;
        guard.file.flush()?;
        Ok(guard)
    }
}

impl Drop for LoadedSlot<'_> {
    fn drop(&mut self) {
        let emptied = self
            .file
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.file.set_len(0));
        if let Err(e) = emptied {
            log::warn!("failed to empty script slot: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A driver for one `AutoIt3.exe` installation.
#[derive(Debug)]
pub struct Session<R = SinkRunner> {
    interpreter: PathBuf,
    slot: ScriptSlot,
    runner: R,
    translator: PathTranslator,
    error_std_out: bool,
}

impl Session<SinkRunner> {
    /// Build a session with the production runner and system path translation.
    pub fn new(options: SessionOptions) -> Result<Self, AutoItError> {
        Self::with_runner(options, PathTranslator::system(), SinkRunner)
    }

    /// Build a session for the auto-detected interpreter.
    pub fn autodetect() -> Result<Self, AutoItError> {
        Self::new(SessionOptions::default())
    }
}

impl<R: ProcessRunner> Session<R> {
    /// Build a session with an explicit translator and runner.
    ///
    /// Fails with [`AutoItError::ConfigurationError`] when the interpreter
    /// cannot be found or is not executable, and with
    /// [`AutoItError::ResourceError`] when the slot cannot be created.
    pub fn with_runner(
        options: SessionOptions,
        translator: PathTranslator,
        runner: R,
    ) -> Result<Self, AutoItError> {
        let located = match options.interpreter.filter(|p| !p.as_os_str().is_empty()) {
            Some(path) => path,
            None => locate_interpreter(false)?,
        };

        let interpreter = translator.to_interpreter_convention(&located)?;
        if !is_executable(&interpreter) {
            return Err(AutoItError::ConfigurationError(format!(
                "supplied interpreter path is not executable: {}",
                interpreter.display()
            )));
        }

        let slot = ScriptSlot::allocate(&translator)?;
        log::debug!(
            "session ready: interpreter={} slot={}",
            interpreter.display(),
            slot.host_path.display()
        );

        Ok(Self {
            interpreter,
            slot,
            runner,
            translator,
            error_std_out: options.error_std_out,
        })
    }

    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    /// Path of the script slot as handed to the interpreter.
    pub fn slot_path(&self) -> &Path {
        &self.slot.host_path
    }

    pub fn translator(&self) -> &PathTranslator {
        &self.translator
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run `script` once and return its captured output.
    ///
    /// A non-zero exit code becomes [`AutoItError::ExecutionError`], which
    /// still carries stdout and stderr.
    pub fn execute(&mut self, script: &str) -> Result<ExecutionResult, AutoItError> {
        let _loaded = LoadedSlot::load(self.slot.file.as_file_mut(), script)?;

        let mut args: Vec<&OsStr> = Vec::with_capacity(2);
        if self.error_std_out {
            args.push(OsStr::new(ERROR_STD_OUT_SWITCH));
        }
        args.push(self.slot.host_path.as_os_str());

        log::debug!("executing {} byte script", script.len());
        let result = self.runner.run(&self.interpreter, &args)?;

        if !result.success() {
            log::debug!(
                "script failed with {}: {}",
                result.exit_code,
                result.stderr_text().trim()
            );
            return Err(AutoItError::ExecutionError {
                code: result.exit_code,
                stdout: result.stdout,
                stderr: result.stderr,
            });
        }
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
