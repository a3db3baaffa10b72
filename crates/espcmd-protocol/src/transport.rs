//! Transport contract and a scripted in-memory transport.

use std::collections::VecDeque;
use std::time::Duration;

use crate::error::{ConfigError, TransportError, TransportResult};

/// Default baud rate of the ESP-AT firmware UART.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default time to wait for each response line.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// A blocking, line-oriented channel to the device.
///
/// A transport is used by one session at a time; sessions borrow it mutably.
pub trait Transport {
    /// Open or set up the channel at the given rate.
    ///
    /// `timeout` becomes the default used by the implementation for
    /// operations that are not given one explicitly.
    fn configure(&mut self, baud_rate: u32, timeout: Duration) -> Result<(), ConfigError>;

    /// Write all bytes to the channel.
    fn send(&mut self, data: &[u8]) -> TransportResult<()>;

    /// Block until a complete line arrives or `timeout` elapses.
    ///
    /// The line terminator is stripped. Returns [`TransportError::Timeout`]
    /// if no terminated line arrives in time.
    fn read_line(&mut self, timeout: Duration) -> TransportResult<String>;

    /// Release the channel. Calling this more than once is harmless.
    fn close(&mut self);
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn configure(&mut self, baud_rate: u32, timeout: Duration) -> Result<(), ConfigError> {
        (**self).configure(baud_rate, timeout)
    }

    fn send(&mut self, data: &[u8]) -> TransportResult<()> {
        (**self).send(data)
    }

    fn read_line(&mut self, timeout: Duration) -> TransportResult<String> {
        (**self).read_line(timeout)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// One scripted reply to a `read_line` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// Return this line.
    Line(String),
    /// Report a read timeout.
    Timeout,
    /// Report a channel failure with this message.
    Fail(String),
}

/// Transport that replays a fixed script of response lines.
///
/// Reads past the end of the script time out, which models a device that has
/// gone silent.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    script: VecDeque<ScriptStep>,
    send_error: Option<String>,
    sent: Vec<Vec<u8>>,
    reads: usize,
    configured: Option<(u32, Duration)>,
    closed: bool,
}

impl ScriptedTransport {
    /// Create a transport replaying `steps`.
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        ScriptedTransport {
            script: steps.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Create a transport replaying plain response lines.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(lines.into_iter().map(|line| ScriptStep::Line(line.into())))
    }

    /// Make every `send` fail with the given message.
    pub fn with_send_error(mut self, message: impl Into<String>) -> Self {
        self.send_error = Some(message.into());
        self
    }

    /// Frames written so far.
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// Number of `read_line` calls made so far.
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Script steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Parameters passed to the last `configure` call.
    pub fn configured(&self) -> Option<(u32, Duration)> {
        self.configured
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Transport for ScriptedTransport {
    fn configure(&mut self, baud_rate: u32, timeout: Duration) -> Result<(), ConfigError> {
        if baud_rate == 0 {
            return Err(ConfigError::UnsupportedBaudRate(baud_rate));
        }
        self.configured = Some((baud_rate, timeout));
        self.closed = false;
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> TransportResult<()> {
        if let Some(message) = &self.send_error {
            return Err(TransportError::Scripted(message.clone()));
        }
        if self.closed {
            return Err(TransportError::NotReady);
        }
        self.sent.push(data.to_vec());
        Ok(())
    }

    fn read_line(&mut self, _timeout: Duration) -> TransportResult<String> {
        self.reads += 1;
        match self.script.pop_front() {
            Some(ScriptStep::Line(line)) => Ok(line),
            Some(ScriptStep::Fail(message)) => Err(TransportError::Scripted(message)),
            Some(ScriptStep::Timeout) | None => Err(TransportError::Timeout),
        }
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
