//! Locating `AutoIt3.exe` on disk.
//!
//! Probes a fixed, ordered list of well-known installation paths and
//! returns the first executable one.  The answer is memoized for the
//! process lifetime; pass `force_refresh` to probe again.
//!
//! # Thread safety
//!
//! The memo is a `parking_lot::Mutex` behind a `OnceLock`, so concurrent
//! first access is safe.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::errors::AutoItError;

/// Well-known installation paths, in probe order (64-bit builds first).
pub const DEFAULT_CANDIDATES: &[&str] = &[
    r"C:\Program Files (x86)\AutoIt3\AutoIt3_x64.exe",
    r"C:\Program Files (x86)\AutoIt3\AutoIt3.exe",
    r"C:\Program Files\AutoIt3\AutoIt3_x64.exe",
    r"C:\Program Files\AutoIt3\AutoIt3.exe",
];

// ---------------------------------------------------------------------------
// Singleton
// ---------------------------------------------------------------------------

static LOCATED: OnceLock<Mutex<Option<PathBuf>>> = OnceLock::new();

fn get_cache() -> &'static Mutex<Option<PathBuf>> {
    LOCATED.get_or_init(|| Mutex::new(None))
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Whether `path` names a file this process could execute.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Whether `path` names a file this process could execute.
#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// Return the first executable path among `candidates`, uncached.
pub fn locate_in<P: AsRef<Path>>(candidates: &[P]) -> Option<PathBuf> {
    for candidate in candidates {
        let path: &Path = candidate.as_ref();
        if is_executable(path) {
            return Some(path.to_path_buf());
        }
    }
    None
}

/// Locate the interpreter among [`DEFAULT_CANDIDATES`], memoized.
pub fn locate_interpreter(force_refresh: bool) -> Result<PathBuf, AutoItError> {
    let mut cache = get_cache().lock();

    if !force_refresh {
        if let Some(path) = cache.as_ref() {
            return Ok(path.clone());
        }
    }

    let found = locate_in(DEFAULT_CANDIDATES).ok_or_else(|| {
        AutoItError::ConfigurationError(format!(
            "unable to find AutoIt3.exe, probed: {}",
            DEFAULT_CANDIDATES.join(", ")
        ))
    })?;

    log::info!("located AutoIt interpreter at {}", found.display());
    *cache = Some(found.clone());
    Ok(found)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
