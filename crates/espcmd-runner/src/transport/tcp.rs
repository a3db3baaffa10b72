//! Transport over a UART-over-TCP bridge.
//!
//! The bridge relays raw bytes between the socket and the device's UART, so
//! the AT protocol runs unchanged over the connection. The baud rate is set on
//! the bridge side and is only recorded here.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use espcmd_protocol::{ConfigError, LineCodec, Transport, TransportError, TransportResult};
use tracing::{debug, trace};

use super::{read_line_with_deadline, Fill};

/// Transport connected to a `host:port` bridge.
#[derive(Debug)]
pub struct TcpTransport {
    address: String,
    stream: Option<TcpStream>,
    codec: LineCodec,
    baud_rate: u32,
}

impl TcpTransport {
    /// Create an unconnected transport for `address`.
    pub fn new(address: impl Into<String>) -> Self {
        TcpTransport {
            address: address.into(),
            stream: None,
            codec: LineCodec::new(),
            baud_rate: 0,
        }
    }

    /// The bridge address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Whether a connection is open.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Baud rate recorded by the last `configure` call.
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    fn open_error(&self, source: std::io::Error) -> ConfigError {
        ConfigError::Open {
            target: self.address.clone(),
            source,
        }
    }

    fn resolve(&self) -> Result<SocketAddr, ConfigError> {
        self.address
            .to_socket_addrs()
            .map_err(|e| self.open_error(e))?
            .next()
            .ok_or_else(|| {
                self.open_error(std::io::Error::new(
                    ErrorKind::NotFound,
                    "address resolved to nothing",
                ))
            })
    }
}

impl Transport for TcpTransport {
    fn configure(&mut self, baud_rate: u32, timeout: Duration) -> Result<(), ConfigError> {
        self.close();

        let addr = self.resolve()?;
        let stream = TcpStream::connect_timeout(&addr, timeout).map_err(|e| self.open_error(e))?;
        stream.set_nodelay(true).map_err(|e| self.open_error(e))?;

        debug!(
            "TCP transport connected to {} ({}; baud {} is set on the bridge)",
            self.address, addr, baud_rate
        );
        self.baud_rate = baud_rate;
        self.stream = Some(stream);
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> TransportResult<()> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotReady)?;
        trace!("TCP transport: writing {} bytes", data.len());
        stream.write_all(data)?;
        stream.flush()?;
        Ok(())
    }

    fn read_line(&mut self, timeout: Duration) -> TransportResult<String> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotReady)?;

        read_line_with_deadline(&mut self.codec, timeout, |buf, wait| {
            stream.set_read_timeout(Some(wait))?;
            match stream.read(buf) {
                Ok(0) => Err(TransportError::Closed),
                Ok(n) => Ok(Fill::Data(n)),
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                    ) =>
                {
                    Ok(Fill::Idle)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(std::net::Shutdown::Both);
            debug!("TCP transport to {} closed", self.address);
        }
        self.codec.clear();
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_send_before_configure() {
        let mut transport = TcpTransport::new("127.0.0.1:1");
        assert!(matches!(transport.send(b"AT\r\n"), Err(TransportError::NotReady)));
        assert!(matches!(
            transport.read_line(Duration::from_millis(10)),
            Err(TransportError::NotReady)
        ));
    }

    #[test]
    fn test_connect_refused() {
        // Bind and drop to get a port nobody listens on.
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let mut transport = TcpTransport::new(format!("127.0.0.1:{}", port));

        let err = transport.configure(115_200, Duration::from_millis(500)).unwrap_err();
        assert!(matches!(err, ConfigError::Open { .. }));
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_bad_address() {
        let mut transport = TcpTransport::new("not an address");
        let err = transport.configure(115_200, Duration::from_millis(500)).unwrap_err();
        assert!(matches!(err, ConfigError::Open { .. }));
    }

    #[test]
    fn test_round_trip_and_close() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let device = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut received = [0u8; 6];
            socket.read_exact(&mut received).unwrap();
            socket.write_all(b"AT\r\n\r\nOK\r\n").unwrap();
            received
        });

        let mut transport = TcpTransport::new(address);
        transport.configure(9600, Duration::from_secs(1)).unwrap();
        assert_eq!(transport.baud_rate(), 9600);

        transport.send(b"ATE1\r\n").unwrap();
        assert_eq!(transport.read_line(Duration::from_secs(2)).unwrap(), "AT");
        assert_eq!(transport.read_line(Duration::from_secs(2)).unwrap(), "");
        assert_eq!(transport.read_line(Duration::from_secs(2)).unwrap(), "OK");
        assert_eq!(&device.join().unwrap(), b"ATE1\r\n");

        transport.close();
        transport.close();
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_peer_close_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let device = thread::spawn(move || {
            let (socket, _) = listener.accept().unwrap();
            drop(socket);
        });

        let mut transport = TcpTransport::new(address);
        transport.configure(115_200, Duration::from_secs(1)).unwrap();
        device.join().unwrap();

        let err = transport.read_line(Duration::from_secs(2)).unwrap_err();
        assert!(matches!(err, TransportError::Closed));
    }
}
