//! espcmd runner
//!
//! Command-line plumbing around [`espcmd_protocol`]: argument parsing,
//! configuration, concrete transports and exit statuses. The binary sends one
//! AT command, echoes the exchange unless `--quiet` is given, and exits with a
//! status that tells success, device rejection and transport trouble apart.

pub mod app;
pub mod args;
pub mod config;
pub mod error;
pub mod exit;
pub mod transport;

pub use app::{finish, main_status, run, run_command, usage_error};
pub use args::Args;
pub use config::{EspcmdConfig, TransportSettings};
pub use error::{RunError, RunResult};
