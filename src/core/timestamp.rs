//! Timestamp rendering for formatted lines

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// How a record's timestamp is rendered.
///
/// # Examples
///
/// ```
/// use multisink_logger::TimestampFormat;
/// use chrono::{TimeZone, Utc};
///
/// let ts = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(TimestampFormat::Iso8601.format(&ts), "2025-01-08T10:30:45.000Z");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// Local time with numeric offset: `2025-01-08 11:30:45 +0100`
    #[default]
    LocalWithOffset,

    /// UTC with milliseconds: `2025-01-08T10:30:45.123Z`
    Iso8601,

    /// RFC 3339 in UTC: `2025-01-08T10:30:45.123+00:00`
    Rfc3339,

    /// Milliseconds since the Unix epoch
    UnixMillis,

    /// strftime pattern applied in local time
    Custom(String),
}

impl TimestampFormat {
    pub const LOCAL_WITH_OFFSET_PATTERN: &'static str = "%Y-%m-%d %H:%M:%S %z";

    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::LocalWithOffset => datetime
                .with_timezone(&Local)
                .format(Self::LOCAL_WITH_OFFSET_PATTERN)
                .to_string(),
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(pattern) => {
                datetime.with_timezone(&Local).format(pattern).to_string()
            }
        }
    }
}
