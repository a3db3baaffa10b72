//! Runner configuration.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. Built-in defaults (serial device `/dev/ttyUSB0`, 115200 baud, 2000 ms)
//! 2. An optional YAML file (`--config` or `ESPCMD_CONFIG`)
//! 3. Command-line flags
//!
//! ```yaml
//! transport:
//!   kind: tcp
//!   address: 127.0.0.1:9000
//! baud_rate: 115200
//! timeout_ms: 2000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use espcmd_protocol::{ConfigError, SessionConfig, DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::args::Args;
use crate::error::{RunError, RunResult};

/// Default serial device.
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// Which channel to reach the device over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransportSettings {
    /// A local serial device.
    Serial {
        /// Device path.
        #[serde(default = "default_device")]
        device: PathBuf,
    },
    /// A UART-over-TCP bridge.
    Tcp {
        /// `host:port` of the bridge.
        address: String,
    },
}

fn default_device() -> PathBuf {
    PathBuf::from(DEFAULT_DEVICE)
}

impl Default for TransportSettings {
    fn default() -> Self {
        TransportSettings::Serial {
            device: default_device(),
        }
    }
}

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EspcmdConfig {
    /// Channel to the device.
    pub transport: TransportSettings,
    /// Baud rate of the serial link.
    pub baud_rate: u32,
    /// Time to wait for each response line, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for EspcmdConfig {
    fn default() -> Self {
        EspcmdConfig {
            transport: TransportSettings::default(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
        }
    }
}

impl EspcmdConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> RunResult<Self> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config = Self::from_yaml_str(&text).map_err(|source| RunError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Build the configuration for a run: file (if any), then flag overrides.
    pub fn resolve(args: &Args) -> RunResult<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(args);
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line flags on top of this configuration.
    pub fn apply_overrides(&mut self, args: &Args) {
        if let Some(address) = &args.tcp {
            self.transport = TransportSettings::Tcp {
                address: address.clone(),
            };
        } else if let Some(device) = &args.device {
            self.transport = TransportSettings::Serial {
                device: device.clone(),
            };
        }
        if let Some(baud) = args.baud {
            self.baud_rate = baud;
        }
        if let Some(timeout_ms) = args.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baud_rate == 0 {
            return Err(ConfigError::Invalid("baud_rate must be greater than zero".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be greater than zero".to_string()));
        }
        if let TransportSettings::Tcp { address } = &self.transport {
            if address.is_empty() {
                return Err(ConfigError::Invalid("tcp address must not be empty".to_string()));
            }
        }
        Ok(())
    }

    /// Per-line read timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Session settings derived from this configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::with_timeout(self.timeout())
    }
}
