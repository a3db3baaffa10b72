//! Error types for the espcmd runner.

use std::path::PathBuf;

use espcmd_protocol::{CommandError, ConfigError};
use thiserror::Error;

use crate::exit;

/// Errors that end a run before a session result is available.
#[derive(Debug, Error)]
pub enum RunError {
    /// Bad command-line usage.
    #[error("{0}")]
    Usage(String),

    /// The command text is not a valid AT command.
    #[error("invalid command: {0}")]
    Command(#[from] CommandError),

    /// The configuration file is not valid YAML for this tool.
    #[error("failed to parse config file {}: {source}", .path.display())]
    ConfigParse {
        /// Path of the configuration file.
        path: PathBuf,
        /// YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The transport could not be configured.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RunError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Usage(_) | RunError::Command(_) => exit::USAGE,
            RunError::ConfigParse { .. } | RunError::Config(_) => exit::CONFIG,
        }
    }
}

/// Result type alias for runner operations.
pub type RunResult<T> = Result<T, RunError>;
