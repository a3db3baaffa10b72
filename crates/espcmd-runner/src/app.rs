//! Top-level flow of one `espcmd` invocation.

use std::ffi::OsString;

use clap::error::ErrorKind;
use espcmd_protocol::{execute, AtCommand, OutputSink, SessionResult, Stream, Transport};
use tracing::{debug, info};

use crate::args::{quiet_requested, Args};
use crate::config::EspcmdConfig;
use crate::error::{RunError, RunResult};
use crate::exit;
use crate::transport::create_transport;

/// Parse `argv`, run the command and return the process exit status.
///
/// `make_sink` builds the output sink once the quiet setting is known. Help
/// and version text go through the sink too, so `-q` silences them.
pub fn main_status<S, F>(argv: &[OsString], make_sink: F) -> u8
where
    S: OutputSink,
    F: FnOnce(bool) -> S,
{
    let args = match Args::try_parse_args(argv) {
        Ok(args) => args,
        Err(e) => {
            let mut sink = make_sink(quiet_requested(argv));
            let text = e.render().to_string();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    emit_lines(&mut sink, Stream::Primary, &text);
                    exit::SUCCESS
                }
                _ => usage_error(text.trim_end(), &mut sink),
            };
        }
    };

    let mut sink = make_sink(args.quiet);
    let outcome = run(&args, &mut sink);
    finish(outcome, &mut sink)
}

/// Resolve configuration, open the transport and run the command.
pub fn run<S: OutputSink + ?Sized>(args: &Args, sink: &mut S) -> RunResult<SessionResult> {
    let command = args.at_command()?;
    let config = EspcmdConfig::resolve(args)?;
    debug!("Resolved config: {:?}", config);

    let mut transport = create_transport(&config.transport)?;
    run_command(&config, &mut transport, &command, sink)
}

/// Configure `transport`, run one session and close the transport again.
pub fn run_command<T, S>(
    config: &EspcmdConfig,
    transport: &mut T,
    command: &AtCommand,
    sink: &mut S,
) -> RunResult<SessionResult>
where
    T: Transport + ?Sized,
    S: OutputSink + ?Sized,
{
    if let Err(e) = transport.configure(config.baud_rate, config.timeout()) {
        transport.close();
        return Err(e.into());
    }

    let result = execute(&config.session_config(), transport, sink, command);
    transport.close();

    info!("'{}' -> {}", command, result);
    Ok(result)
}

/// Exit status for the outcome of [`run`], reporting errors to `sink`.
pub fn finish<S: OutputSink + ?Sized>(outcome: RunResult<SessionResult>, sink: &mut S) -> u8 {
    match outcome {
        Ok(result) => exit::for_result(result),
        Err(e) => {
            emit_lines(sink, Stream::Error, &e.to_string());
            e.exit_code()
        }
    }
}

fn emit_lines<S: OutputSink + ?Sized>(sink: &mut S, stream: Stream, text: &str) {
    for line in text.trim_end().lines() {
        sink.emit(stream, line);
    }
}

/// Report a usage error that happened before arguments were fully parsed.
pub fn usage_error<S: OutputSink + ?Sized>(message: &str, sink: &mut S) -> u8 {
    finish(Err(RunError::Usage(message.to_string())), sink)
}
