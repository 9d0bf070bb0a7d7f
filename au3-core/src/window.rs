//! Window state queries through generated AutoIt script.

use crate::errors::AutoItError;
use crate::runner::ProcessRunner;
use crate::session::{quote_string, Session};

/// Reply `WinWaitActive` prints when the timeout elapsed.
const TIMED_OUT_REPLY: &str = "0";

pub fn win_wait_active_script(title: &str, text: &str, timeout_secs: u32) -> String {
    format!(
        "ConsoleWrite(WinWaitActive ({}, {},{timeout_secs}));",
        quote_string(title),
        quote_string(text)
    )
}

impl<R: ProcessRunner> Session<R> {
    /// Block until a window matching `title` / `text` is active.
    ///
    /// Returns `false` on timeout and `true` otherwise.  `timeout_secs` is
    /// handed to AutoIt unchanged.  A timeout of 0 means no timeout: the
    /// call blocks until a matching window becomes active.
    ///
    /// Only the exact reply `0` counts as a timeout; any other reply,
    /// including an empty or unexpected one, is reported as active.
    pub fn win_wait_active(
        &mut self,
        title: &str,
        text: &str,
        timeout_secs: u32,
    ) -> Result<bool, AutoItError> {
        let reply = self
            .execute(&win_wait_active_script(title, text, timeout_secs))?
            .reply();
        if reply != TIMED_OUT_REPLY && reply.parse::<i64>().ok() == Some(0) {
            log::debug!("WinWaitActive replied {reply:?}, treating as active");
        }
        Ok(reply != TIMED_OUT_REPLY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{recording_session, RecordingRunner};

    #[test]
    fn test_script_quotes_title_and_text() {
        assert_eq!(
            win_wait_active_script("Untitled - \"Notepad\"", "", 5),
            "ConsoleWrite(WinWaitActive (\"Untitled - \"\"Notepad\"\"\", \"\",5));"
        );
    }

    #[test]
    fn test_zero_timeout_is_passed_through() {
        let mut session = recording_session(RecordingRunner::replying(["0x1"]));
        assert!(session.win_wait_active("Notepad", "", 0).unwrap());
        assert_eq!(
            session.runner().last_script().as_deref(),
            Some("ConsoleWrite(WinWaitActive (\"Notepad\", \"\",0));")
        );
    }

    #[test]
    fn test_zero_reply_is_timeout() {
        let mut session = recording_session(RecordingRunner::replying(["0\r\n"]));
        assert!(!session.win_wait_active("no such window", "", 0).unwrap());
    }

    #[test]
    fn test_handle_reply_is_active() {
        let mut session = recording_session(RecordingRunner::replying(["0x00000000000A0B2C"]));
        assert!(session.win_wait_active("Notepad", "", 3).unwrap());
    }

    #[test]
    fn test_unexpected_reply_is_active() {
        let mut session = recording_session(RecordingRunner::replying(["", "00"]));
        assert!(session.win_wait_active("a", "", 1).unwrap());
        assert!(session.win_wait_active("a", "", 1).unwrap());
    }
}
