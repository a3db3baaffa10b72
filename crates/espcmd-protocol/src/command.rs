//! AT commands sent to the ESP8266.

use std::fmt;

use crate::codec::{LineCodec, LINE_TERMINATOR, MAX_FRAME_LENGTH};
use crate::error::CommandError;

/// Longest command text that still fits the frame once the terminator is added.
pub const MAX_COMMAND_LENGTH: usize = MAX_FRAME_LENGTH - LINE_TERMINATOR.len();

/// A validated AT command.
///
/// The text is never empty, never contains `\r` or `\n`, and its framed form
/// fits in [`MAX_FRAME_LENGTH`] bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtCommand {
    text: String,
}

impl AtCommand {
    /// Validate `text` as a single AT command.
    pub fn new(text: impl Into<String>) -> Result<Self, CommandError> {
        let text = text.into();

        if text.is_empty() {
            return Err(CommandError::Empty);
        }
        if text.contains(['\r', '\n']) {
            return Err(CommandError::EmbeddedTerminator);
        }
        if text.len() > MAX_COMMAND_LENGTH {
            return Err(CommandError::TooLong {
                max: MAX_COMMAND_LENGTH,
                actual: text.len(),
            });
        }

        Ok(AtCommand { text })
    }

    /// Get the command text without the terminator.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Encode the command as a line to send to the device.
    /// Returns the bytes to send (including the `\r\n` terminator).
    pub fn encode(&self) -> Vec<u8> {
        LineCodec::encode_command(&self.text)
    }
}

impl fmt::Display for AtCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::str::FromStr for AtCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AtCommand::new(s)
    }
}
