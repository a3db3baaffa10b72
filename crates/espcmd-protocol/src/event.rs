//! Classification of response lines.
//!
//! The ESP-AT firmware ends every command reply with one of three final
//! result lines. Everything before it is data for the caller.

/// Final result line for a successful command.
pub const TOKEN_OK: &str = "OK";

/// Final result line for a command the firmware rejected.
pub const TOKEN_ERROR: &str = "ERROR";

/// Final result line for a command the firmware accepted but could not carry out.
pub const TOKEN_FAIL: &str = "FAIL";

/// Protocol event produced for each read attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolEvent {
    /// Intermediate output; not a final result.
    Data,
    /// `OK` final result.
    Ok,
    /// `ERROR` final result.
    Error,
    /// `FAIL` final result.
    Fail,
    /// No line arrived within the read timeout.
    Timeout,
}

impl ProtocolEvent {
    /// Whether this event ends the read loop.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProtocolEvent::Data)
    }
}

/// Classify a received line.
///
/// The line must already be stripped of its terminator and trailing
/// whitespace. Only exact, case-sensitive matches of the result tokens count;
/// anything else, including the empty line, is [`ProtocolEvent::Data`].
/// Never returns [`ProtocolEvent::Timeout`].
pub fn classify(line: &str) -> ProtocolEvent {
    match line {
        TOKEN_OK => ProtocolEvent::Ok,
        TOKEN_ERROR => ProtocolEvent::Error,
        TOKEN_FAIL => ProtocolEvent::Fail,
        _ => ProtocolEvent::Data,
    }
}
