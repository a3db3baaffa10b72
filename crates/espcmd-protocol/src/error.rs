//! Error types for the AT protocol.

use thiserror::Error;

/// Errors raised while validating a command before it is framed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The command text is empty.
    #[error("no command specified")]
    Empty,

    /// The framed command exceeds the device's command buffer.
    #[error("command too long: {actual} bytes, at most {max} fit with the \\r\\n terminator")]
    TooLong { max: usize, actual: usize },

    /// The command text contains a carriage return or line feed.
    #[error("command must not contain line terminators")]
    EmbeddedTerminator,
}

/// Errors that prevent a transport from being opened or configured.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The channel could not be opened.
    #[error("failed to open {target}: {source}")]
    Open {
        /// Device path or network address.
        target: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The channel does not support the requested baud rate.
    #[error("unsupported baud rate: {0}")]
    UnsupportedBaudRate(u32),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a transport while a session is running.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No complete line arrived within the read timeout.
    #[error("timeout waiting for response")]
    Timeout,

    /// The transport has not been configured, or has been closed.
    #[error("transport not ready")]
    NotReady,

    /// The remote end closed the channel.
    #[error("channel closed by peer")]
    Closed,

    /// A response line exceeded the line buffer.
    #[error("line too long: max {max} bytes, got {actual}")]
    LineTooLong { max: usize, actual: usize },

    /// Read or write failure on the underlying channel.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure injected by a scripted transport.
    #[error("{0}")]
    Scripted(String),
}

impl TransportError {
    /// Whether this error is the read timeout rather than a channel failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout)
    }
}

/// Result type alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
