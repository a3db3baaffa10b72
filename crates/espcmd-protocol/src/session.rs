//! Command session: one request/response exchange with the device.
//!
//! A session frames a command, writes it to the transport and then reads
//! response lines until the first terminal event:
//!
//! ```text
//! Idle ──execute──▶ Sending ──sent──▶ AwaitingLine ──OK/ERROR/FAIL/timeout──▶ Terminated
//!                      │                  ▲     │
//!                      │                  └─Data┘
//!                      └──send failed──────────────────────────────────────▶ Terminated
//! ```
//!
//! Nothing is read after the terminal event, and nothing survives the session.

use std::fmt;
use std::time::Duration;

use log::{debug, trace, warn};

use crate::codec::trim_line;
use crate::command::AtCommand;
use crate::event::{classify, ProtocolEvent};
use crate::sink::{OutputSink, Stream};
use crate::transport::{Transport, DEFAULT_TIMEOUT};

/// Prefix for the echoed request line.
pub const REQUEST_PREFIX: &str = "> ";

/// Prefix for forwarded response data lines.
pub const RESPONSE_PREFIX: &str = "< ";

/// Configuration for a command session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long to wait for each response line.
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SessionConfig {
    /// Create a session config with the given per-line timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        SessionConfig { timeout }
    }
}

/// Outcome of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionResult {
    /// The device answered `OK`.
    Success,
    /// The device answered `ERROR`.
    ProtocolError,
    /// The device answered `FAIL`.
    ProtocolFail,
    /// No final result arrived within the timeout.
    TransportTimeout,
    /// The channel failed while sending or reading.
    TransportError,
}

impl SessionResult {
    /// Whether the command succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, SessionResult::Success)
    }

    /// Map a terminal protocol event to its session result.
    ///
    /// Returns `None` for [`ProtocolEvent::Data`].
    pub fn from_event(event: ProtocolEvent) -> Option<SessionResult> {
        match event {
            ProtocolEvent::Data => None,
            ProtocolEvent::Ok => Some(SessionResult::Success),
            ProtocolEvent::Error => Some(SessionResult::ProtocolError),
            ProtocolEvent::Fail => Some(SessionResult::ProtocolFail),
            ProtocolEvent::Timeout => Some(SessionResult::TransportTimeout),
        }
    }

    /// Short lowercase name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionResult::Success => "success",
            SessionResult::ProtocolError => "error",
            SessionResult::ProtocolFail => "fail",
            SessionResult::TransportTimeout => "timeout",
            SessionResult::TransportError => "transport error",
        }
    }
}

impl fmt::Display for SessionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a command session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, nothing sent yet.
    Idle,
    /// Writing the framed command.
    Sending,
    /// Waiting for the next response line.
    AwaitingLine,
    /// Finished with the given result.
    Terminated(SessionResult),
}

/// A single command/response exchange.
///
/// The session borrows the transport and the sink for its lifetime and is
/// consumed by [`execute`](Session::execute).
pub struct Session<'a, T: Transport + ?Sized, S: OutputSink + ?Sized> {
    config: &'a SessionConfig,
    transport: &'a mut T,
    sink: &'a mut S,
    state: SessionState,
    data_lines: usize,
}

impl<'a, T: Transport + ?Sized, S: OutputSink + ?Sized> Session<'a, T, S> {
    /// Create a new idle session.
    pub fn new(config: &'a SessionConfig, transport: &'a mut T, sink: &'a mut S) -> Self {
        Session {
            config,
            transport,
            sink,
            state: SessionState::Idle,
            data_lines: 0,
        }
    }

    /// Get the current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Send `command` and read the reply until a terminal event.
    pub fn execute(mut self, command: &AtCommand) -> SessionResult {
        let result = loop {
            self.state = self.step(command);
            if let SessionState::Terminated(result) = self.state {
                break result;
            }
        };

        debug!(
            "Session: '{}' finished with {} ({} data lines)",
            command, result, self.data_lines
        );
        result
    }

    /// Advance the state machine by one transition.
    fn step(&mut self, command: &AtCommand) -> SessionState {
        match self.state {
            SessionState::Idle => SessionState::Sending,
            SessionState::Sending => self.send(command),
            SessionState::AwaitingLine => self.await_line(),
            terminated @ SessionState::Terminated(_) => terminated,
        }
    }

    fn send(&mut self, command: &AtCommand) -> SessionState {
        let frame = command.encode();
        trace!("Session: sending '{}' ({} bytes)", command, frame.len());

        if let Err(e) = self.transport.send(&frame) {
            warn!("Session: failed to send '{}': {}", command, e);
            return SessionState::Terminated(SessionResult::TransportError);
        }

        self.sink
            .emit(Stream::Primary, &format!("{}{}", REQUEST_PREFIX, command));
        SessionState::AwaitingLine
    }

    fn await_line(&mut self) -> SessionState {
        let line = match self.transport.read_line(self.config.timeout) {
            Ok(line) => line,
            Err(e) if e.is_timeout() => {
                warn!(
                    "Session: no final result within {} ms",
                    self.config.timeout.as_millis()
                );
                return SessionState::Terminated(SessionResult::TransportTimeout);
            }
            Err(e) => {
                warn!("Session: read failed: {}", e);
                return SessionState::Terminated(SessionResult::TransportError);
            }
        };

        let line = trim_line(&line);
        let event = classify(line);
        trace!("Session: received {:?} '{}'", event, line);

        match SessionResult::from_event(event) {
            Some(result) => SessionState::Terminated(result),
            None => {
                if !line.is_empty() {
                    self.data_lines += 1;
                    self.sink
                        .emit(Stream::Primary, &format!("{}{}", RESPONSE_PREFIX, line));
                }
                SessionState::AwaitingLine
            }
        }
    }
}

/// Run one command over `transport`, echoing to `sink`.
pub fn execute<T, S>(
    config: &SessionConfig,
    transport: &mut T,
    sink: &mut S,
    command: &AtCommand,
) -> SessionResult
where
    T: Transport + ?Sized,
    S: OutputSink + ?Sized,
{
    Session::new(config, transport, sink).execute(command)
}
