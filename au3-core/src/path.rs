//! Path translation between the host OS and a POSIX emulation layer.
//!
//! When this library runs inside Cygwin, its own filesystem view uses
//! `/cygdrive/c/...` style paths while `AutoIt3.exe` only understands
//! native Windows paths.  [`PathTranslator`] converts between the two by
//! shelling out to `cygpath`.  Everywhere else both conversions are the
//! identity.
//!
//! Naming follows the direction of the call sites in [`crate::session`]:
//!
//! | Method | Direction | `cygpath` flags |
//! |--------|-----------|-----------------|
//! | [`PathTranslator::to_interpreter_convention`] | native -> emulated | `-a` |
//! | [`PathTranslator::to_host_convention`] | emulated -> native | `-aw` |
//!
//! # Thread safety
//!
//! Whether the emulation layer is active is decided once per process and
//! memoized in a `OnceLock`.  Path values themselves are never cached.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use crate::errors::AutoItError;

/// The emulation layer's path conversion utility.
pub const CONVERTER: &str = "cygpath";

const TO_EMULATED_FLAG: &str = "-a";
const TO_NATIVE_FLAG: &str = "-aw";

// ---------------------------------------------------------------------------
// Singleton
// ---------------------------------------------------------------------------

static EMULATION_ACTIVE: OnceLock<bool> = OnceLock::new();

fn is_emulation_os(os: &str) -> bool {
    os.to_ascii_lowercase().contains("cygwin")
}

/// Whether this process runs under the POSIX emulation layer.
///
/// Computed lazily from the OS identity on first call, then memoized.
pub fn emulation_layer_active() -> bool {
    *EMULATION_ACTIVE.get_or_init(|| {
        let active = is_emulation_os(std::env::consts::OS);
        if active {
            log::info!("POSIX emulation layer detected, paths will go through {CONVERTER}");
        }
        active
    })
}

// ---------------------------------------------------------------------------
// Translator
// ---------------------------------------------------------------------------

/// Converts paths between host and interpreter conventions.
#[derive(Debug, Clone)]
pub struct PathTranslator {
    active: bool,
    /// Program plus any leading arguments, e.g. `["cygpath"]`.
    converter: Vec<OsString>,
}

impl Default for PathTranslator {
    fn default() -> Self {
        Self::system()
    }
}

impl PathTranslator {
    /// Translator for the running process, active only under the emulation layer.
    pub fn system() -> Self {
        Self::new(emulation_layer_active(), [CONVERTER])
    }

    /// A translator that never converts.
    pub fn identity() -> Self {
        Self::new(false, [CONVERTER])
    }

    /// A translator with an explicit activity flag and converter command.
    pub fn new<I, S>(active: bool, converter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            active,
            converter: converter.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Native path -> emulation layer path (`cygpath -a`).
    pub fn to_interpreter_convention(&self, path: &Path) -> Result<PathBuf, AutoItError> {
        self.convert(path, TO_EMULATED_FLAG)
    }

    /// Emulation layer path -> native path (`cygpath -aw`).
    pub fn to_host_convention(&self, path: &Path) -> Result<PathBuf, AutoItError> {
        self.convert(path, TO_NATIVE_FLAG)
    }

    fn convert(&self, path: &Path, flag: &str) -> Result<PathBuf, AutoItError> {
        if !self.active {
            return Ok(path.to_path_buf());
        }

        let (program, leading) = self.converter.split_first().ok_or_else(|| {
            AutoItError::ConfigurationError("path converter command is empty".into())
        })?;

        let output = Command::new(program)
            .args(leading)
            .arg(flag)
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                AutoItError::ResourceError(format!(
                    "failed to run {}: {e}",
                    Path::new(program).display()
                ))
            })?;

        if !output.status.success() {
            return Err(AutoItError::ResourceError(format!(
                "{} {flag} {} failed ({}): {}",
                Path::new(program).display(),
                path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let converted = stdout.trim_end();
        if converted.is_empty() {
            return Err(AutoItError::ResourceError(format!(
                "{} {flag} {} produced no output",
                Path::new(program).display(),
                path.display()
            )));
        }
        Ok(PathBuf::from(converted))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_emulation_os() {
        assert!(is_emulation_os("cygwin"));
        assert!(is_emulation_os("CYGWIN_NT-10.0-19045"));
        assert!(!is_emulation_os("windows"));
        assert!(!is_emulation_os("linux"));
    }

    #[test]
    fn test_emulation_flag_is_memoized() {
        let first = emulation_layer_active();
        assert_eq!(first, is_emulation_os(std::env::consts::OS));
        assert_eq!(emulation_layer_active(), first);
    }

    #[test]
    fn test_inactive_translator_is_identity() {
        let t = PathTranslator::new(false, ["/nonexistent/cygpath"]);
        let p = Path::new(r"C:\Program Files\AutoIt3\AutoIt3.exe");
        assert_eq!(t.to_interpreter_convention(p).unwrap(), p);
        assert_eq!(t.to_host_convention(p).unwrap(), p);
        assert!(!PathTranslator::identity().is_active());
    }

    #[test]
    fn test_empty_converter_is_configuration_error() {
        let t = PathTranslator::new(true, Vec::<OsString>::new());
        let err = t.to_host_convention(Path::new("/tmp/x")).unwrap_err();
        assert!(matches!(err, AutoItError::ConfigurationError(_)));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;

        /// A stand-in for `cygpath` that prefixes/strips `/emu` and
        /// terminates its output with CRLF like the real tool on Windows.
        const FAKE_CYGPATH: &str = r#"
case "$1" in
  -a) printf '/emu%s\n' "$2" ;;
  -aw) p="$2"; printf '%s\r\n' "${p#/emu}" ;;
  *) echo "bad flag $1" >&2; exit 2 ;;
esac
"#;

        fn fake_translator(dir: &tempfile::TempDir) -> PathTranslator {
            let script = dir.path().join("cygpath.sh");
            std::fs::write(&script, FAKE_CYGPATH).unwrap();
            PathTranslator::new(true, [OsString::from("/bin/sh"), script.into_os_string()])
        }

        #[test]
        fn test_active_round_trip() {
            let dir = tempfile::tempdir().unwrap();
            let t = fake_translator(&dir);
            let host = Path::new("/tmp/some dir/script.au3");

            let emulated = t.to_interpreter_convention(host).unwrap();
            assert_eq!(emulated, Path::new("/emu/tmp/some dir/script.au3"));
            assert_eq!(t.to_host_convention(&emulated).unwrap(), host);
        }

        #[test]
        fn test_trailing_newlines_are_trimmed() {
            let dir = tempfile::tempdir().unwrap();
            let t = fake_translator(&dir);
            let native = t.to_host_convention(Path::new("/emu/a/b")).unwrap();
            assert_eq!(native.to_string_lossy(), "/a/b");
        }

        #[test]
        fn test_failing_converter_is_resource_error() {
            let t = PathTranslator::new(true, ["/bin/sh", "-c", "exit 5"]);
            let err = t.to_interpreter_convention(Path::new("/x")).unwrap_err();
            assert!(matches!(err, AutoItError::ResourceError(_)));
        }
    }
}
