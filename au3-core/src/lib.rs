//! `au3_core` -- Pure Rust driver for the AutoIt3 interpreter.
//!
//! Every call renders a short AutoIt script, hands it to `AutoIt3.exe` in
//! a fresh child process, and parses the single-line reply.  Nothing of
//! AutoIt itself is reimplemented here.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`errors`] | `AutoItError` enum via `thiserror` |
//! | [`runner`] | `ProcessRunner` seam and file-backed output capture |
//! | [`path`] | Cygwin path translation (`cygpath`) |
//! | [`locate`] | `AutoIt3.exe` discovery with a process-wide memo |
//! | [`session`] | Script slot lifecycle, `execute`, `quote_string` |
//! | [`input`] | `MouseMove` / `MouseClick` / `Send` wrappers |
//! | [`window`] | `WinWaitActive` wrapper |
//! | [`screenshot`] | `_ScreenCapture_Capture` wrapper |
//!
//! # Usage
//!
//! ```no_run
//! use au3_core::input::{Click, SendOptions};
//! use au3_core::session::Session;
//!
//! let mut au3 = Session::autodetect()?;
//! au3.mouse_click(&Click::at("left", 200, 300))?;
//! if au3.win_wait_active("Untitled - Notepad", "", 5)? {
//!     au3.send("hello{ENTER}", &SendOptions::default())?;
//! }
//! # Ok::<(), au3_core::errors::AutoItError>(())
//! ```

pub mod errors;
pub mod input;
pub mod locate;
pub mod path;
pub mod runner;
pub mod screenshot;
pub mod session;
pub mod window;

#[cfg(test)]
mod testing;

pub use errors::AutoItError;
pub use runner::{ExecutionResult, ProcessRunner, SinkRunner};
pub use session::{quote_string, Session, SessionOptions};
