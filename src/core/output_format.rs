//! Line formatters
//!
//! - Compact: `WARNING: disk almost full` (console streams)
//! - Detailed: `[2025-01-08 10:30:45 +0000] WARNING [app] src/main.rs:42: disk almost full`
//! - Json: one object per line for machine processing

use super::record::Record;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Compact,
    Detailed,
    Json,
}

/// Renders a record into a single line, without the trailing newline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineFormatter {
    format: OutputFormat,
    timestamp_format: TimestampFormat,
}

impl LineFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            timestamp_format: TimestampFormat::default(),
        }
    }

    pub fn compact() -> Self {
        Self::new(OutputFormat::Compact)
    }

    pub fn detailed() -> Self {
        Self::new(OutputFormat::Detailed)
    }

    pub fn json() -> Self {
        Self::new(OutputFormat::Json)
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format
    }

    pub fn format(&self, record: &Record) -> String {
        match self.format {
            OutputFormat::Compact => format!("{}: {}", record.severity(), record.message()),
            OutputFormat::Detailed => self.format_detailed(record),
            OutputFormat::Json => self.format_json(record),
        }
    }

    fn format_detailed(&self, record: &Record) -> String {
        let origin = record.origin();
        format!(
            "[{}] {} [{}] {}:{}: {}",
            self.timestamp_format.format(record.timestamp()),
            record.severity(),
            origin.module(),
            origin.file(),
            origin.line(),
            record.message()
        )
    }

    fn format_json(&self, record: &Record) -> String {
        let origin = record.origin();
        let timestamp = match self.timestamp_format {
            TimestampFormat::UnixMillis => {
                serde_json::Value::from(record.timestamp().timestamp_millis())
            }
            ref other => serde_json::Value::from(other.format(record.timestamp())),
        };
        serde_json::json!({
            "timestamp": timestamp,
            "severity": record.severity().as_str(),
            "module": origin.module(),
            "file": origin.file(),
            "line": origin.line(),
            "thread": record.thread(),
            "message": record.message(),
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Origin;
    use crate::core::severity::Severity;
    use chrono::{TimeZone, Utc};

    fn sample(severity: Severity) -> Record {
        Record::at(
            Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap(),
            severity,
            "disk almost full",
            Origin::new("app", "src/main.rs", 42),
        )
    }

    #[test]
    fn test_compact_line() {
        let line = LineFormatter::compact().format(&sample(Severity::Warning));
        assert_eq!(line, "WARNING: disk almost full");
    }

    #[test]
    fn test_detailed_line() {
        let formatter =
            LineFormatter::detailed().with_timestamp_format(TimestampFormat::Rfc3339);
        let line = formatter.format(&sample(Severity::Error));
        assert_eq!(
            line,
            "[2025-01-08T10:30:45+00:00] ERROR [app] src/main.rs:42: disk almost full"
        );
    }

    #[test]
    fn test_json_line() {
        let formatter = LineFormatter::json().with_timestamp_format(TimestampFormat::UnixMillis);
        let line = formatter.format(&sample(Severity::Info));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["severity"], "INFO");
        assert_eq!(value["timestamp"], 1736332245000i64);
        assert_eq!(value["line"], 42);
        assert_eq!(value["message"], "disk almost full");
    }
}
