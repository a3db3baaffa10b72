//! Output sinks for echoed request and response lines.

use std::io::{self, Write};

/// Destination stream for an emitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Normal output (stdout for the console).
    Primary,
    /// Diagnostics (stderr for the console).
    Error,
}

/// Receives the lines a session echoes to the user.
///
/// Each call to [`emit`](OutputSink::emit) carries exactly one line of text
/// without a trailing newline.
pub trait OutputSink {
    /// Emit one line to the given stream.
    fn emit(&mut self, stream: Stream, text: &str);
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn emit(&mut self, stream: Stream, text: &str) {
        (**self).emit(stream, text)
    }
}

/// Sink writing to the process's stdout and stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink {
    quiet: bool,
}

impl ConsoleSink {
    /// Create a console sink. A quiet sink discards everything.
    pub fn new(quiet: bool) -> Self {
        ConsoleSink { quiet }
    }

    /// Whether output is suppressed.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

impl OutputSink for ConsoleSink {
    fn emit(&mut self, stream: Stream, text: &str) {
        if self.quiet {
            return;
        }

        // Write errors (closed pipe) are ignored.
        let _ = match stream {
            Stream::Primary => writeln!(io::stdout().lock(), "{}", text),
            Stream::Error => writeln!(io::stderr().lock(), "{}", text),
        };
    }
}

/// Sink that records emitted lines in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySink {
    quiet: bool,
    lines: Vec<(Stream, String)>,
}

impl MemorySink {
    /// Create a recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recording sink that drops everything, like a quiet console.
    pub fn quiet() -> Self {
        MemorySink {
            quiet: true,
            lines: Vec::new(),
        }
    }

    /// All recorded lines in emission order.
    pub fn lines(&self) -> &[(Stream, String)] {
        &self.lines
    }

    /// Lines recorded on the primary stream.
    pub fn primary_lines(&self) -> Vec<&str> {
        self.stream_lines(Stream::Primary)
    }

    /// Lines recorded on the error stream.
    pub fn error_lines(&self) -> Vec<&str> {
        self.stream_lines(Stream::Error)
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn stream_lines(&self, stream: Stream) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|(s, _)| *s == stream)
            .map(|(_, text)| text.as_str())
            .collect()
    }
}

impl OutputSink for MemorySink {
    fn emit(&mut self, stream: Stream, text: &str) {
        if !self.quiet {
            self.lines.push((stream, text.to_string()));
        }
    }
}
