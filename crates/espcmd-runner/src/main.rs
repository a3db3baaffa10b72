use std::ffi::OsString;
use std::process::ExitCode;

use espcmd_protocol::ConsoleSink;
use espcmd_runner::main_status;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Diagnostics go to stderr; RUST_LOG=debug shows the full exchange.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let argv: Vec<OsString> = std::env::args_os().collect();
    ExitCode::from(main_status(&argv, ConsoleSink::new))
}
