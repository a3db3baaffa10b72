//! Transport over a local serial device.
//!
//! The device is opened in raw mode with `VMIN = 0` and `VTIME = 1`, so each
//! `read` returns after at most 100 ms even when the ESP8266 is silent.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use espcmd_protocol::{ConfigError, LineCodec, Transport, TransportError, TransportResult};
use nix::sys::termios::{
    cfmakeraw, cfsetspeed, tcflush, tcgetattr, tcsetattr, BaudRate, ControlFlags, FlushArg,
    SetArg, SpecialCharacterIndices,
};
use tracing::{debug, trace};

use super::{read_line_with_deadline, Fill};

/// Map a numeric baud rate to a termios speed.
pub fn baud_rate(rate: u32) -> Option<BaudRate> {
    let speed = match rate {
        9600 => BaudRate::B9600,
        19_200 => BaudRate::B19200,
        38_400 => BaudRate::B38400,
        57_600 => BaudRate::B57600,
        115_200 => BaudRate::B115200,
        230_400 => BaudRate::B230400,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        460_800 => BaudRate::B460800,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        921_600 => BaudRate::B921600,
        _ => return None,
    };
    Some(speed)
}

/// Transport on a TTY device such as `/dev/ttyUSB0`.
#[derive(Debug)]
pub struct SerialTransport {
    device: PathBuf,
    port: Option<File>,
    codec: LineCodec,
}

impl SerialTransport {
    /// Create an unopened transport for `device`.
    pub fn new(device: impl Into<PathBuf>) -> Self {
        SerialTransport {
            device: device.into(),
            port: None,
            codec: LineCodec::new(),
        }
    }

    /// The device path.
    pub fn device(&self) -> &Path {
        &self.device
    }

    /// Whether the device is open.
    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn open_error(&self, source: std::io::Error) -> ConfigError {
        ConfigError::Open {
            target: self.device.display().to_string(),
            source,
        }
    }

    /// Put the line in raw 8N1 mode at `speed` with a 100 ms read slice.
    fn setup_line(&self, port: &File, speed: BaudRate) -> nix::Result<()> {
        let mut termios = tcgetattr(port)?;
        cfmakeraw(&mut termios);
        cfsetspeed(&mut termios, speed)?;
        termios.control_flags |= ControlFlags::CLOCAL | ControlFlags::CREAD;
        termios.control_flags &= !ControlFlags::CRTSCTS;
        termios.control_chars[SpecialCharacterIndices::VMIN as usize] = 0;
        termios.control_chars[SpecialCharacterIndices::VTIME as usize] = 1;
        tcsetattr(port, SetArg::TCSANOW, &termios)?;

        // Drop anything the device printed before this session.
        tcflush(port, FlushArg::TCIFLUSH)
    }
}

impl Transport for SerialTransport {
    fn configure(&mut self, baud_rate_value: u32, _timeout: Duration) -> Result<(), ConfigError> {
        self.close();

        let speed = baud_rate(baud_rate_value)
            .ok_or(ConfigError::UnsupportedBaudRate(baud_rate_value))?;

        let port = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(nix::libc::O_NOCTTY)
            .open(&self.device)
            .map_err(|e| self.open_error(e))?;

        self.setup_line(&port, speed)
            .map_err(|errno| self.open_error(errno.into()))?;

        debug!(
            "Serial transport opened {} at {} baud",
            self.device.display(),
            baud_rate_value
        );
        self.port = Some(port);
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> TransportResult<()> {
        let port = self.port.as_mut().ok_or(TransportError::NotReady)?;
        trace!("Serial transport: writing {} bytes", data.len());
        port.write_all(data)?;
        port.flush()?;
        Ok(())
    }

    fn read_line(&mut self, timeout: Duration) -> TransportResult<String> {
        let port = self.port.as_mut().ok_or(TransportError::NotReady)?;

        // VTIME bounds each read, so the slice length is not needed here.
        read_line_with_deadline(&mut self.codec, timeout, |buf, _wait| match port.read(buf) {
            Ok(0) => Ok(Fill::Idle),
            Ok(n) => Ok(Fill::Data(n)),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                Ok(Fill::Idle)
            }
            Err(e) => Err(e.into()),
        })
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            debug!("Serial transport {} closed", self.device.display());
        }
        self.codec.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_baud_rates() {
        assert_eq!(baud_rate(9600), Some(BaudRate::B9600));
        assert_eq!(baud_rate(115_200), Some(BaudRate::B115200));
        assert_eq!(baud_rate(12_345), None);
        assert_eq!(baud_rate(0), None);
    }

    #[test]
    fn test_unsupported_baud_rate() {
        let mut transport = SerialTransport::new("/dev/null");
        let err = transport.configure(12_345, Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedBaudRate(12_345)));
        assert!(!transport.is_open());
    }

    #[test]
    fn test_missing_device() {
        let mut transport = SerialTransport::new("/dev/espcmd-does-not-exist");
        let err = transport.configure(115_200, Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, ConfigError::Open { .. }));
    }

    #[test]
    fn test_not_a_tty() {
        // /dev/null opens fine but has no termios.
        let mut transport = SerialTransport::new("/dev/null");
        let err = transport.configure(115_200, Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, ConfigError::Open { .. }));
        assert!(!transport.is_open());
    }

    #[test]
    fn test_send_before_configure() {
        let mut transport = SerialTransport::new("/dev/ttyUSB0");
        assert!(matches!(transport.send(b"AT\r\n"), Err(TransportError::NotReady)));
        transport.close();
        transport.close();
    }
}
