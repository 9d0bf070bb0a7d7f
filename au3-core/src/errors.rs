//! Error types for `au3_core`.
//!
//! All failures are funnelled through [`AutoItError`], which uses
//! `thiserror` for `Display` and `Error` derives.  Nothing is retried or
//! swallowed: every variant reaches the immediate caller of the session API.

use thiserror::Error;

/// Top-level error type for the `au3_core` library.
///
/// Each variant corresponds to a distinct failure kind.
#[derive(Debug, Error)]
pub enum AutoItError {
    /// Interpreter not found, not executable, or otherwise unusable.
    #[error("ConfigurationError: {0}")]
    ConfigurationError(String),

    /// Temporary file or process spawn allocation failure.
    #[error("ResourceError: {0}")]
    ResourceError(String),

    /// The interpreter exited with a non-zero code.
    ///
    /// The captured output is carried along so nothing is dropped.
    #[error("ExecutionError: AutoIt failed, returned error code {code}")]
    ExecutionError {
        code: i32,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },

    /// The interpreter rejected a call parameter (reported through its reply).
    #[error("InvalidParameterError: {0}")]
    InvalidParameterError(String),

    /// A call argument was rejected before anything was executed.
    #[error("InvalidArgumentError: {0}")]
    InvalidArgumentError(String),

    /// Screen capture reported a non-zero `@error` or produced no image.
    #[error("CaptureError: {0}")]
    CaptureError(String),
}

impl AutoItError {
    /// Exit code of a failed execution, if this is an [`AutoItError::ExecutionError`].
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            AutoItError::ExecutionError { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Convert a `std::io::Error` (temp file / spawn / read failure) into a
/// `AutoItError::ResourceError`.
impl From<std::io::Error> for AutoItError {
    fn from(err: std::io::Error) -> Self {
        AutoItError::ResourceError(format!("I/O error: {err}"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
