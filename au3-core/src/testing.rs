//! Test doubles shared by the module tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::errors::AutoItError;
use crate::path::PathTranslator;
use crate::runner::{ExecutionResult, ProcessRunner};
use crate::session::{Session, SessionOptions};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Slot contents at the moment the "process" ran.
    pub script: String,
}

/// A [`ProcessRunner`] that never spawns anything.
///
/// Records every call, reads the script out of the slot (the last
/// argument) and replays queued results; once the queue is empty it
/// answers exit 0 with empty output.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    results: RefCell<VecDeque<ExecutionResult>>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl RecordingRunner {
    pub fn with_results(results: impl IntoIterator<Item = ExecutionResult>) -> Self {
        Self {
            results: RefCell::new(results.into_iter().collect()),
            calls: RefCell::default(),
        }
    }

    /// Queue successful runs printing each of `replies`.
    pub fn replying<'a>(replies: impl IntoIterator<Item = &'a str>) -> Self {
        Self::with_results(replies.into_iter().map(|r| ExecutionResult {
            exit_code: 0,
            stdout: r.as_bytes().to_vec(),
            stderr: Vec::new(),
        }))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    pub fn spawn_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn last_script(&self) -> Option<String> {
        self.calls.borrow().last().map(|c| c.script.clone())
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, program: &Path, args: &[&OsStr]) -> Result<ExecutionResult, AutoItError> {
        let script = match args.last() {
            Some(slot) => std::fs::read_to_string(slot)?,
            None => String::new(),
        };
        self.calls.borrow_mut().push(RecordedCall {
            program: program.to_path_buf(),
            args: args.iter().map(|a| a.to_os_string()).collect(),
            script,
        });
        Ok(self
            .results
            .borrow_mut()
            .pop_front()
            .unwrap_or(ExecutionResult {
                exit_code: 0,
                stdout: Vec::new(),
                stderr: Vec::new(),
            }))
    }
}

/// A session over `runner` whose interpreter is the test binary itself,
/// which is an executable file on every platform.
pub fn recording_session(runner: RecordingRunner) -> Session<RecordingRunner> {
    let exe = std::env::current_exe().expect("test binary path");
    Session::with_runner(
        SessionOptions::with_interpreter(exe),
        PathTranslator::identity(),
        runner,
    )
    .expect("recording session")
}
