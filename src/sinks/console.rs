//! Console sinks for the standard output and error streams

use crate::core::{LineFormatter, OutputFormat, Record, Sink, SinkError, SinkResult};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleTarget {
    Stdout,
    Stderr,
}

impl ConsoleTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleTarget::Stdout => "stdout",
            ConsoleTarget::Stderr => "stderr",
        }
    }
}

impl fmt::Display for ConsoleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes one compact line per record to a console stream.
///
/// # Example
///
/// ```
/// use multisink_logger::sinks::ConsoleSink;
///
/// let sink = ConsoleSink::stderr().with_colors(true);
/// ```
pub struct ConsoleSink {
    target: ConsoleTarget,
    writer: Option<Box<dyn Write + Send>>,
    formatter: LineFormatter,
    use_colors: bool,
}

impl ConsoleSink {
    pub fn new(target: ConsoleTarget) -> Self {
        let writer: Box<dyn Write + Send> = match target {
            ConsoleTarget::Stdout => Box::new(io::stdout()),
            ConsoleTarget::Stderr => Box::new(io::stderr()),
        };
        Self::with_writer(target, writer)
    }

    pub fn stdout() -> Self {
        Self::new(ConsoleTarget::Stdout)
    }

    pub fn stderr() -> Self {
        Self::new(ConsoleTarget::Stderr)
    }

    /// Write to an arbitrary stream while keeping the target's name.
    pub fn with_writer(target: ConsoleTarget, writer: impl Write + Send + 'static) -> Self {
        Self {
            target,
            writer: Some(Box::new(writer)),
            formatter: LineFormatter::compact(),
            use_colors: false,
        }
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: LineFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }

    fn render(&self, record: &Record) -> String {
        let line = self.formatter.format(record);
        // JSON stays machine-readable
        if !self.use_colors || self.formatter.output_format() == OutputFormat::Json {
            return line;
        }
        line.color(record.severity().color()).to_string()
    }

    fn io_error(&self, operation: &str, source: io::Error) -> SinkError {
        SinkError::io_failure(self.target.as_str(), operation, source)
    }
}

impl Sink for ConsoleSink {
    fn write(&mut self, record: &Record) -> SinkResult<()> {
        let mut line = self.render(record);
        line.push('\n');

        let result = match self.writer.as_mut() {
            Some(writer) => writer.write_all(line.as_bytes()),
            None => return Err(SinkError::closed(self.target.as_str())),
        };
        result.map_err(|e| self.io_error("writing record", e))
    }

    fn flush(&mut self) -> SinkResult<()> {
        let result = match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        };
        result.map_err(|e| self.io_error("flushing", e))
    }

    fn close(&mut self) -> SinkResult<()> {
        let result = self.flush();
        // Dropping a std stream handle does not close the process-wide descriptor
        self.writer = None;
        result
    }

    fn name(&self) -> &str {
        self.target.as_str()
    }
}
