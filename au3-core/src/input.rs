//! Keyboard and mouse input through generated AutoIt script.
//!
//! Each operation renders a short script fragment (the `*_script`
//! functions, pure and side-effect free) and runs it through
//! [`Session::execute`].  Replies are single-line values the script writes
//! with `ConsoleWrite`.

use crate::errors::AutoItError;
use crate::runner::ProcessRunner;
use crate::session::{quote_string, Session};

/// AutoIt's default mouse speed (0 = instant, 100 = slowest).
pub const DEFAULT_SPEED: i32 = 10;

/// Default `SendKeyDelay` / `SendKeyDownDelay`, in milliseconds.
pub const DEFAULT_KEY_DELAY_MS: i32 = 5;

/// AutoIt keyword that selects a parameter's built-in default.
const DEFAULT_KEYWORD: &str = "Default";

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Arguments for [`Session::mouse_click`].
///
/// A missing coordinate is sent as `Default`, i.e. the current cursor
/// position.  The button name is passed through unvalidated; AutoIt
/// decides whether it is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Click<'a> {
    pub button: &'a str,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub clicks: u32,
    pub speed: i32,
}

impl Default for Click<'_> {
    fn default() -> Self {
        Self {
            button: "left",
            x: None,
            y: None,
            clicks: 1,
            speed: DEFAULT_SPEED,
        }
    }
}

impl<'a> Click<'a> {
    /// A single click of `button` at (`x`, `y`).
    pub fn at(button: &'a str, x: i32, y: i32) -> Self {
        Self {
            button,
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }
}

/// Options for [`Session::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    /// Send `keys` literally instead of interpreting `{ENTER}`, `^c`, etc.
    pub raw: bool,
    pub key_delay: i32,
    pub key_down_delay: i32,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            raw: false,
            key_delay: DEFAULT_KEY_DELAY_MS,
            key_down_delay: DEFAULT_KEY_DELAY_MS,
        }
    }
}

// ---------------------------------------------------------------------------
// Script rendering
// ---------------------------------------------------------------------------

fn coordinate(value: Option<i32>) -> String {
    value.map_or_else(|| DEFAULT_KEYWORD.to_owned(), |v| v.to_string())
}

pub fn mouse_move_script(x: i32, y: i32, speed: i32) -> String {
    format!("MouseMove({x}, {y}, {speed});")
}

pub fn mouse_click_script(click: &Click<'_>) -> String {
    format!(
        "ConsoleWrite(MouseClick ({},{},{},{},{}));",
        quote_string(click.button),
        coordinate(click.x),
        coordinate(click.y),
        click.clicks,
        click.speed
    )
}

pub fn send_script(keys: &str, options: &SendOptions) -> String {
    format!(
        "AutoItSetOption ( 'SendKeyDelay', {});\r\n\
         AutoItSetOption ( 'SendKeyDownDelay', {});\r\n\
         Send({},{});",
        options.key_delay,
        options.key_down_delay,
        quote_string(keys),
        u8::from(options.raw)
    )
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl<R: ProcessRunner> Session<R> {
    /// Move the cursor to (`x`, `y`).
    pub fn mouse_move(&mut self, x: i32, y: i32, speed: i32) -> Result<(), AutoItError> {
        self.execute(&mouse_move_script(x, y, speed))?;
        Ok(())
    }

    /// Click a mouse button.
    ///
    /// AutoIt's `MouseClick` returns 1 on success; any other reply means an
    /// unknown button or an `x` without a `y`.
    pub fn mouse_click(&mut self, click: &Click<'_>) -> Result<(), AutoItError> {
        let reply = self.execute(&mouse_click_script(click))?.reply();
        if reply != "1" {
            return Err(AutoItError::InvalidParameterError(format!(
                "the button {:?} is not in the list or x was given without y (reply {reply:?})",
                click.button
            )));
        }
        Ok(())
    }

    /// Send simulated keystrokes to the active window.
    pub fn send(&mut self, keys: &str, options: &SendOptions) -> Result<(), AutoItError> {
        self.execute(&send_script(keys, options))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ExecutionResult;
    use crate::testing::{recording_session, RecordingRunner};

    #[test]
    fn test_mouse_move_script() {
        assert_eq!(mouse_move_script(100, -5, 0), "MouseMove(100, -5, 0);");
    }

    #[test]
    fn test_click_defaults_use_default_keyword() {
        assert_eq!(
            mouse_click_script(&Click::default()),
            "ConsoleWrite(MouseClick (\"left\",Default,Default,1,10));"
        );
    }

    #[test]
    fn test_click_button_is_quoted() {
        let click = Click {
            x: Some(3),
            ..Click::at("ri\"ght", 1, 2)
        };
        assert_eq!(
            mouse_click_script(&click),
            "ConsoleWrite(MouseClick (\"ri\"\"ght\",3,2,1,10));"
        );
    }

    #[test]
    fn test_send_script() {
        let raw = SendOptions {
            raw: true,
            key_delay: 1,
            key_down_delay: 2,
        };
        assert_eq!(
            send_script("{ENTER}", &raw),
            "AutoItSetOption ( 'SendKeyDelay', 1);\r\n\
             AutoItSetOption ( 'SendKeyDownDelay', 2);\r\n\
             Send(\"{ENTER}\",1);"
        );
        assert!(send_script("x", &SendOptions::default()).ends_with("Send(\"x\",0);"));
    }

    #[test]
    fn test_mouse_click_success() {
        let mut session = recording_session(RecordingRunner::replying(["1\r\n"]));
        session.mouse_click(&Click::default()).unwrap();
        assert_eq!(
            session.runner().last_script().as_deref(),
            Some("ConsoleWrite(MouseClick (\"left\",Default,Default,1,10));")
        );
    }

    #[test]
    fn test_mouse_click_invalid_button() {
        let mut session = recording_session(RecordingRunner::replying(["0"]));
        let err = session
            .mouse_click(&Click {
                button: "thumb",
                ..Click::default()
            })
            .unwrap_err();
        assert!(matches!(err, AutoItError::InvalidParameterError(ref m) if m.contains("thumb")));
    }

    #[test]
    fn test_mouse_click_empty_reply_is_rejected() {
        let mut session = recording_session(RecordingRunner::replying([""]));
        let err = session.mouse_click(&Click::at("left", 1, 1)).unwrap_err();
        assert!(matches!(err, AutoItError::InvalidParameterError(_)));
    }

    #[test]
    fn test_mouse_move_propagates_exit_code() {
        let mut session = recording_session(RecordingRunner::with_results([ExecutionResult {
            exit_code: 1,
            stdout: Vec::new(),
            stderr: Vec::new(),
        }]));
        let err = session.mouse_move(10, 20, DEFAULT_SPEED).unwrap_err();
        assert_eq!(err.exit_code(), Some(1));
    }

    #[test]
    fn test_send_ignores_output() {
        let mut session = recording_session(RecordingRunner::replying(["whatever"]));
        session.send("hello", &SendOptions::default()).unwrap();
        assert_eq!(session.runner().spawn_count(), 1);
    }
}
