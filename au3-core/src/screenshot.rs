//! Screen capture via AutoIt's `_ScreenCapture_Capture` UDF.
//!
//! AutoIt writes the image itself and picks the encoder from the target
//! file's extension, so a caller-supplied target must have one.  Without a
//! target the capture goes to a temporary `.png` file whose bytes are
//! returned and which is removed afterwards.
//!
//! # Examples
//!
//! ```no_run
//! use au3_core::screenshot::CaptureRegion;
//! use au3_core::session::Session;
//!
//! let mut session = Session::autodetect().expect("AutoIt3.exe not found");
//! let png = session
//!     .screen_capture(None, &CaptureRegion::default(), false)
//!     .expect("capture failed")
//!     .expect("ephemeral capture returns bytes");
//! std::fs::write("desktop.png", &png).unwrap();
//! ```

use std::path::Path;

use image::ImageFormat;

use crate::errors::AutoItError;
use crate::runner::ProcessRunner;
use crate::session::{quote_string, Session};

/// `@error` value AutoIt reports for a successful capture.
const SUCCESS_REPLY: &str = "0";

// ---------------------------------------------------------------------------
// Public data types
// ---------------------------------------------------------------------------

/// Screen rectangle to capture.  `-1` for `right`/`bottom` means the
/// screen edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRegion {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Default for CaptureRegion {
    fn default() -> Self {
        Self {
            left: 0,
            top: 0,
            right: -1,
            bottom: -1,
        }
    }
}

// ---------------------------------------------------------------------------
// Script rendering
// ---------------------------------------------------------------------------

pub fn screen_capture_script(file: &str, region: &CaptureRegion, cursor: bool) -> String {
    format!(
        "#include <ScreenCapture.au3>\r\n\
         _ScreenCapture_Capture ( {}, {}, {},{},{},{} );\r\n\
         ConsoleWrite(@error);",
        quote_string(file),
        region.left,
        region.top,
        region.right,
        region.bottom,
        if cursor { "True" } else { "False" }
    )
}

/// Whether the file name ends in `.<something>`.  Dotfiles such as
/// `.png` count: AutoIt only looks at the text after the last dot.
fn has_extension(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.rsplit_once('.').map(|(_, ext)| !ext.is_empty()))
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl<R: ProcessRunner> Session<R> {
    /// Capture `region` of the screen.
    ///
    /// With `target = Some(path)` the image is written to `path` and
    /// `Ok(None)` is returned; `path` must carry an extension (`.png`,
    /// `.jpg`, `.bmp`, ...) or [`AutoItError::InvalidArgumentError`] is
    /// raised before anything runs.  The same error is raised for a target
    /// that is not valid UTF-8, since it cannot be written into the script
    /// unaltered.  With `target = None` the PNG bytes are returned.
    pub fn screen_capture(
        &mut self,
        target: Option<&Path>,
        region: &CaptureRegion,
        cursor: bool,
    ) -> Result<Option<Vec<u8>>, AutoItError> {
        if let Some(path) = target {
            if !has_extension(path) {
                return Err(AutoItError::InvalidArgumentError(format!(
                    "capture target must have an extension (.jpg, .png, .bmp, etc): {}",
                    path.display()
                )));
            }
            self.capture_to(path, region, cursor)?;
            return Ok(None);
        }

        let ephemeral = tempfile::Builder::new()
            .prefix("au3-capture-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| {
                AutoItError::ResourceError(format!("failed to create capture file: {e}"))
            })?
            .into_temp_path();

        self.capture_to(&ephemeral, region, cursor)?;
        let bytes = std::fs::read(&ephemeral)?;

        match image::guess_format(&bytes) {
            Ok(ImageFormat::Png) => Ok(Some(bytes)),
            Ok(other) => Err(AutoItError::CaptureError(format!(
                "expected a PNG capture, got {other:?}"
            ))),
            Err(e) => Err(AutoItError::CaptureError(format!(
                "capture produced no recognisable image ({} bytes): {e}",
                bytes.len()
            ))),
        }
    }

    fn capture_to(
        &mut self,
        file: &Path,
        region: &CaptureRegion,
        cursor: bool,
    ) -> Result<(), AutoItError> {
        let native = self.translator().to_host_convention(file)?;
        let native = native.to_str().ok_or_else(|| {
            AutoItError::InvalidArgumentError(format!(
                "capture target is not valid UTF-8: {}",
                native.display()
            ))
        })?;
        let reply = self
            .execute(&screen_capture_script(native, region, cursor))?
            .reply();
        if reply != SUCCESS_REPLY {
            return Err(AutoItError::CaptureError(format!(
                "AutoIt's @error was not 0 at exit, it was: {reply:?}"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
