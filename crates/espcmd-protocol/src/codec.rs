//! Line-based codec for AT communication.
//!
//! The ESP-AT firmware terminates every line with `\r\n`. Commands sent to the
//! device use the same terminator. Incoming bytes are accumulated until a line
//! feed is seen; the carriage return before it is dropped.

use bytes::{Buf, BytesMut};

use crate::error::{TransportError, TransportResult};

/// Line terminator used in both directions.
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Maximum framed command length, terminator included.
///
/// The ESP-AT firmware reads commands into a fixed buffer of this size and
/// rejects anything longer.
pub const MAX_FRAME_LENGTH: usize = 128;

/// Maximum response line length, terminator excluded.
pub const MAX_LINE_LENGTH: usize = 1024;

/// A codec for reading AT response lines and writing AT commands.
#[derive(Debug)]
pub struct LineCodec {
    /// Buffer for accumulating incoming data.
    buffer: BytesMut,
    /// Longest line accepted before reporting an overflow.
    max_line_length: usize,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl LineCodec {
    /// Create a new line codec with the default line limit.
    pub fn new() -> Self {
        Self::with_max_line_length(MAX_LINE_LENGTH)
    }

    /// Create a line codec that accepts lines up to `max_line_length` bytes.
    pub fn with_max_line_length(max_line_length: usize) -> Self {
        LineCodec {
            buffer: BytesMut::with_capacity(256),
            max_line_length,
        }
    }

    /// Add received data to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode a complete line from the buffer.
    ///
    /// Returns `Ok(Some(line))` with the terminator removed, `Ok(None)` if more
    /// data is needed, or `LineTooLong` if the buffer holds more than the line
    /// limit without a line feed. Empty lines are returned as empty strings.
    pub fn decode_line(&mut self) -> TransportResult<Option<String>> {
        let Some(end) = self.buffer.iter().position(|&b| b == b'\n') else {
            if self.buffer.len() > self.max_line_length {
                return Err(TransportError::LineTooLong {
                    max: self.max_line_length,
                    actual: self.buffer.len(),
                });
            }
            return Ok(None);
        };

        let mut line_data = self.buffer.split_to(end);
        self.buffer.advance(1);

        if line_data.last() == Some(&b'\r') {
            line_data.truncate(line_data.len() - 1);
        }
        if line_data.len() > self.max_line_length {
            return Err(TransportError::LineTooLong {
                max: self.max_line_length,
                actual: line_data.len(),
            });
        }

        Ok(Some(String::from_utf8_lossy(&line_data).into_owned()))
    }

    /// Encode a command for transmission.
    ///
    /// Appends the `\r\n` terminator.
    pub fn encode_command(cmd: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(cmd.len() + LINE_TERMINATOR.len());
        buf.extend_from_slice(cmd.as_bytes());
        buf.extend_from_slice(LINE_TERMINATOR);
        buf
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Get the current buffer contents as a string (for debugging).
    pub fn buffer_as_str(&self) -> String {
        String::from_utf8_lossy(&self.buffer).to_string()
    }
}

/// Strip trailing whitespace and control characters from a received line.
pub fn trim_line(line: &str) -> &str {
    line.trim_end_matches(|c: char| c.is_whitespace() || c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_command() {
        let encoded = LineCodec::encode_command("AT+GMR");
        assert_eq!(encoded, b"AT+GMR\r\n");
    }

    #[test]
    fn test_decode_line() {
        let mut codec = LineCodec::new();
        codec.push(b"line1\r\nline2\r\n");

        assert_eq!(codec.decode_line().unwrap(), Some("line1".to_string()));
        assert_eq!(codec.decode_line().unwrap(), Some("line2".to_string()));
        assert_eq!(codec.decode_line().unwrap(), None);
        assert_eq!(codec.buffered_len(), 0);
    }

    #[test]
    fn test_partial_line() {
        let mut codec = LineCodec::new();
        codec.push(b"+CIFSR:STAIP,");

        assert_eq!(codec.decode_line().unwrap(), None);

        codec.push(b"\"192.168.1.10\"\r\n");
        assert_eq!(
            codec.decode_line().unwrap(),
            Some("+CIFSR:STAIP,\"192.168.1.10\"".to_string())
        );
    }

    #[test]
    fn test_empty_line_is_returned() {
        let mut codec = LineCodec::new();
        codec.push(b"\r\nOK\r\n");

        assert_eq!(codec.decode_line().unwrap(), Some(String::new()));
        assert_eq!(codec.decode_line().unwrap(), Some("OK".to_string()));
    }

    #[test]
    fn test_bare_line_feed_terminator() {
        let mut codec = LineCodec::new();
        codec.push(b"ready\n");
        assert_eq!(codec.decode_line().unwrap(), Some("ready".to_string()));
    }

    #[test]
    fn test_terminator_split_across_pushes() {
        let mut codec = LineCodec::new();
        codec.push(b"OK\r");
        assert_eq!(codec.decode_line().unwrap(), None);
        codec.push(b"\n");
        assert_eq!(codec.decode_line().unwrap(), Some("OK".to_string()));
    }

    #[test]
    fn test_line_too_long() {
        let mut codec = LineCodec::with_max_line_length(8);
        codec.push(b"0123456789");

        match codec.decode_line() {
            Err(TransportError::LineTooLong { max, actual }) => {
                assert_eq!(max, 8);
                assert_eq!(actual, 10);
            }
            other => panic!("expected LineTooLong, got {:?}", other),
        }
    }

    #[test]
    fn test_clear() {
        let mut codec = LineCodec::new();
        codec.push(b"partial");
        assert_eq!(codec.buffer_as_str(), "partial");
        codec.clear();
        assert_eq!(codec.buffered_len(), 0);
    }

    #[test]
    fn test_trim_line() {
        assert_eq!(trim_line("OK \t\r"), "OK");
        assert_eq!(trim_line("  data  "), "  data");
        assert_eq!(trim_line("\r"), "");
    }
}
