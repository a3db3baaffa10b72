//! Concrete transports for reaching the ESP8266.
//!
//! - [`SerialTransport`]: a local TTY device (Unix only)
//! - [`TcpTransport`]: a UART-over-TCP bridge such as ser2net
//!
//! Both read in short slices against a deadline so a silent device never holds
//! the caller much past the configured timeout.

#[cfg(unix)]
mod serial;
mod tcp;

#[cfg(unix)]
pub use serial::SerialTransport;
pub use tcp::TcpTransport;

use std::time::{Duration, Instant};

use espcmd_protocol::{ConfigError, LineCodec, Transport, TransportError, TransportResult};

use crate::config::TransportSettings;

/// Longest single blocking read while waiting for a line.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Outcome of one bounded read from the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fill {
    /// This many bytes were read into the buffer.
    Data(usize),
    /// Nothing arrived during the slice.
    Idle,
}

/// Read from `fill` into `codec` until a full line is available or `timeout` elapses.
///
/// `fill` is given the buffer and the longest it may block.
pub(crate) fn read_line_with_deadline<F>(
    codec: &mut LineCodec,
    timeout: Duration,
    mut fill: F,
) -> TransportResult<String>
where
    F: FnMut(&mut [u8], Duration) -> TransportResult<Fill>,
{
    let deadline = Instant::now() + timeout;
    let mut chunk = [0u8; 256];

    loop {
        if let Some(line) = codec.decode_line()? {
            return Ok(line);
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(TransportError::Timeout);
        }

        match fill(&mut chunk, remaining.min(POLL_INTERVAL))? {
            Fill::Data(n) => codec.push(&chunk[..n]),
            Fill::Idle => {}
        }
    }
}

/// Create the transport described by `settings`.
///
/// The transport is not opened until [`Transport::configure`] is called.
pub fn create_transport(settings: &TransportSettings) -> Result<Box<dyn Transport>, ConfigError> {
    match settings {
        TransportSettings::Tcp { address } => Ok(Box::new(TcpTransport::new(address.clone()))),
        #[cfg(unix)]
        TransportSettings::Serial { device } => Ok(Box::new(SerialTransport::new(device.clone()))),
        #[cfg(not(unix))]
        TransportSettings::Serial { .. } => Err(ConfigError::Invalid(
            "serial devices are only supported on Unix; use --tcp".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_line_across_fills() {
        let mut codec = LineCodec::new();
        let mut chunks = vec![&b"+CWMODE"[..], &b":1\r"[..], &b"\nOK\r\n"[..]].into_iter();

        let line = read_line_with_deadline(&mut codec, Duration::from_secs(1), |buf, _| {
            match chunks.next() {
                Some(chunk) => {
                    buf[..chunk.len()].copy_from_slice(chunk);
                    Ok(Fill::Data(chunk.len()))
                }
                None => Ok(Fill::Idle),
            }
        })
        .unwrap();

        assert_eq!(line, "+CWMODE:1");
        assert_eq!(codec.decode_line().unwrap(), Some("OK".to_string()));
    }

    #[test]
    fn test_read_line_times_out() {
        let mut codec = LineCodec::new();
        let start = Instant::now();

        let result = read_line_with_deadline(&mut codec, Duration::from_millis(50), |_, wait| {
            std::thread::sleep(wait);
            Ok(Fill::Idle)
        });

        assert!(matches!(result, Err(TransportError::Timeout)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_read_line_propagates_errors() {
        let mut codec = LineCodec::new();
        let result = read_line_with_deadline(&mut codec, Duration::from_secs(1), |_, _| {
            Err(TransportError::Closed)
        });
        assert!(matches!(result, Err(TransportError::Closed)));
    }

    #[test]
    fn test_buffered_line_needs_no_read() {
        let mut codec = LineCodec::new();
        codec.push(b"ready\r\n");
        let line = read_line_with_deadline(&mut codec, Duration::from_secs(1), |_, _| {
            panic!("should not read");
        })
        .unwrap();
        assert_eq!(line, "ready");
    }

    #[test]
    fn test_create_tcp_transport() {
        let settings = TransportSettings::Tcp { address: "127.0.0.1:1".to_string() };
        assert!(create_transport(&settings).is_ok());
    }
}
