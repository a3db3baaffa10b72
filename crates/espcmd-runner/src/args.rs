//! CLI argument parsing using clap.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use espcmd_protocol::AtCommand;

use crate::error::{RunError, RunResult};

/// Send an AT command to an ESP8266 and print its reply
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "espcmd", version, about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Args {
    /// AT command to execute (e.g. "AT+GMR")
    pub command: Option<String>,

    /// No screen output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print version info
    ///
    /// Handled by clap during parsing; never set on a parsed `Args`.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,

    /// Serial device the ESP8266 is attached to
    #[arg(short, long, value_name = "PATH")]
    pub device: Option<PathBuf>,

    /// Reach the ESP8266 through a UART-over-TCP bridge instead of a serial device
    #[arg(long, value_name = "HOST:PORT", conflicts_with = "device")]
    pub tcp: Option<String>,

    /// Baud rate of the serial link
    #[arg(short, long, value_name = "RATE")]
    pub baud: Option<u32>,

    /// Time to wait for each response line, in milliseconds
    #[arg(short, long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// YAML configuration file
    #[arg(short, long, value_name = "FILE", env = "ESPCMD_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Parse arguments, returning clap's error instead of exiting.
    pub fn try_parse_args<I, T>(argv: I) -> Result<Args, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Args::try_parse_from(argv)
    }

    /// The validated AT command.
    pub fn at_command(&self) -> RunResult<AtCommand> {
        match self.command.as_deref() {
            None | Some("") => Err(RunError::Usage("no command specified".to_string())),
            Some(text) => Ok(AtCommand::new(text)?),
        }
    }
}

/// Whether the raw argument list asks for quiet mode.
///
/// Used to decide whether to print a usage error when full parsing failed.
pub fn quiet_requested<I, T>(argv: I) -> bool
where
    I: IntoIterator<Item = T>,
    T: AsRef<std::ffi::OsStr>,
{
    argv.into_iter()
        .skip(1)
        .any(|arg| matches!(arg.as_ref().to_str(), Some("-q") | Some("--quiet")))
}
