//! ESP8266 AT Command Protocol
//!
//! This crate provides types and utilities for sending a single AT command to an
//! ESP8266 Wi-Fi co-processor and interpreting its reply. The ESP-AT firmware
//! speaks a simple line-based text protocol over its UART.
//!
//! # Protocol Overview
//!
//! - **Commands** (host → device): AT text terminated with `\r\n`
//! - **Responses** (device → host): zero or more data lines, then exactly one
//!   final result line: `OK`, `ERROR` or `FAIL`
//! - **Echo**: with echo enabled (`ATE1`) the device repeats the command as
//!   the first data line
//!
//! One command is in flight at a time. A [`Session`] frames the command, writes
//! it to a [`Transport`], then reads and classifies lines until a terminal
//! event, forwarding intermediate data lines to an [`OutputSink`].
//!
//! # Example
//!
//! ```rust
//! use espcmd_protocol::{
//!     AtCommand, MemorySink, ScriptedTransport, Session, SessionConfig, SessionResult,
//! };
//!
//! let command = AtCommand::new("AT+GMR").unwrap();
//! let mut transport = ScriptedTransport::from_lines(["AT version:1.7.4.0", "OK"]);
//! let mut sink = MemorySink::new();
//!
//! let config = SessionConfig::default();
//! let result = Session::new(&config, &mut transport, &mut sink).execute(&command);
//!
//! assert_eq!(result, SessionResult::Success);
//! assert_eq!(sink.primary_lines(), vec!["> AT+GMR", "< AT version:1.7.4.0"]);
//! ```

mod codec;
mod command;
mod error;
mod event;
mod session;
mod sink;
mod transport;

pub use codec::*;
pub use command::*;
pub use error::*;
pub use event::*;
pub use session::*;
pub use sink::*;
pub use transport::*;
