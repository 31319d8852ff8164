//! Line-oriented progress reporting.
//!
//! A supervising process reads one event per line, each line starting with
//! `STATUS:`, `ERROR:` or `SUCCESS:`. Reporters are passed explicitly to
//! whoever drives a run; nothing here is global.

use std::fmt;
use std::io::Write;

use tracing::warn;

/// One event for the supervising process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Status(String),
    Error(String),
    Success(String),
}

impl ProgressEvent {
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::Success(message.into())
    }

    /// Line prefix including the colon.
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Status(_) => "STATUS:",
            Self::Error(_) => "ERROR:",
            Self::Success(_) => "SUCCESS:",
        }
    }

    #[must_use]
    pub fn payload(&self) -> &str {
        match self {
            Self::Status(m) | Self::Error(m) | Self::Success(m) => m,
        }
    }

    /// Parse a protocol line back into an event.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(rest) = line.strip_prefix("STATUS:") {
            Some(Self::status(rest))
        } else if let Some(rest) = line.strip_prefix("ERROR:") {
            Some(Self::error(rest))
        } else {
            line.strip_prefix("SUCCESS:").map(Self::success)
        }
    }
}

/// Renders the event as a single protocol line without the trailing newline.
/// Line breaks inside the payload are flattened to spaces.
impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload = self.payload().replace(['\r', '\n'], " ");
        write!(f, "{}{payload}", self.prefix())
    }
}

/// Sink for progress events.
pub trait ProgressReporter {
    fn report(&mut self, event: ProgressEvent);

    fn status(&mut self, message: &str) {
        self.report(ProgressEvent::status(message));
    }

    fn error(&mut self, message: &str) {
        self.report(ProgressEvent::error(message));
    }

    fn success(&mut self, message: &str) {
        self.report(ProgressEvent::success(message));
    }
}

/// Writes each event as one line and flushes immediately.
#[derive(Debug)]
pub struct LineReporter<W: Write> {
    writer: W,
}

impl<W: Write> LineReporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl LineReporter<std::io::Stdout> {
    /// Reporter on standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ProgressReporter for LineReporter<W> {
    fn report(&mut self, event: ProgressEvent) {
        let result = writeln!(self.writer, "{event}").and_then(|()| self.writer.flush());
        if let Err(e) = result {
            warn!(error = %e, "Failed to write progress line");
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn report(&mut self, _event: ProgressEvent) {}
}

/// Collects events in memory.
impl ProgressReporter for Vec<ProgressEvent> {
    fn report(&mut self, event: ProgressEvent) {
        self.push(event);
    }
}
