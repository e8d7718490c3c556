//! Declarative logger configuration
//!
//! Every field has a default, so a partial JSON document (or `{}`) is enough:
//!
//! ```json
//! {
//!   "log_dir": "/var/log/myapp",
//!   "name": "myapp",
//!   "queue": { "bounded": 4096 },
//!   "stdout": { "colors": true },
//!   "file": { "max_bytes": 1048576, "backup_count": 3, "compress": true }
//! }
//! ```

use super::dispatcher::QueueCapacity;
use super::error::ConfigError;
use super::output_format::OutputFormat;
use super::severity::Severity;
use super::timestamp::TimestampFormat;
use crate::sinks::{ConsoleTarget, RotationPolicy, DEFAULT_BACKUP_COUNT, DEFAULT_MAX_BYTES};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings for one console stream.
///
/// Unset severity bounds fall back to the stream's routing defaults:
/// standard output carries `DEBUG..=INFO`, standard error `WARNING` and up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub format: OutputFormat,
    pub colors: bool,
    pub min_severity: Option<Severity>,
    pub max_severity: Option<Severity>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: OutputFormat::Compact,
            colors: false,
            min_severity: None,
            max_severity: None,
        }
    }
}

impl ConsoleConfig {
    /// Effective `(min, max)` bounds for `target`.
    pub fn severity_range(&self, target: ConsoleTarget) -> (Severity, Option<Severity>) {
        let (min, max) = match target {
            ConsoleTarget::Stdout => (Severity::Debug, Some(Severity::Info)),
            ConsoleTarget::Stderr => (Severity::Warning, None),
        };
        (self.min_severity.unwrap_or(min), self.max_severity.or(max))
    }
}

/// Settings for the rotating file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub enabled: bool,
    pub min_severity: Severity,
    pub format: OutputFormat,
    pub timestamp_format: TimestampFormat,
    pub max_bytes: u64,
    pub backup_count: usize,
    pub compress: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_severity: Severity::Info,
            format: OutputFormat::Detailed,
            timestamp_format: TimestampFormat::LocalWithOffset,
            max_bytes: DEFAULT_MAX_BYTES,
            backup_count: DEFAULT_BACKUP_COUNT,
            compress: false,
        }
    }
}

impl FileConfig {
    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy::new()
            .with_max_bytes(self.max_bytes)
            .with_backup_count(self.backup_count)
            .with_compression(self.compress)
    }
}

/// Complete logger configuration.
///
/// # Examples
///
/// ```
/// use multisink_logger::{LoggingConfig, Severity};
///
/// let config = LoggingConfig::from_json_str(r#"{ "name": "api", "min_severity": "INFO" }"#).unwrap();
/// assert_eq!(config.file_path(), std::path::Path::new("logs/api.log"));
/// assert_eq!(config.min_severity, Severity::Info);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Directory holding the log file; created on `init` if missing
    pub log_dir: PathBuf,
    /// Log file stem, `<log_dir>/<name>.log`
    pub name: String,
    /// Records below this severity are dropped before they are queued
    pub min_severity: Severity,
    pub queue: QueueCapacity,
    /// Time a dropped logger waits for the queue to drain
    pub shutdown_timeout_ms: u64,
    pub stdout: ConsoleConfig,
    pub stderr: ConsoleConfig,
    pub file: FileConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            name: "app".to_string(),
            min_severity: Severity::Debug,
            queue: QueueCapacity::Unbounded,
            shutdown_timeout_ms: 5_000,
            stdout: ConsoleConfig::default(),
            stderr: ConsoleConfig::default(),
            file: FileConfig::default(),
        }
    }
}

impl LoggingConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid("name", "log name must not be empty"));
        }
        if self.name.contains(['/', '\\']) || self.name == "." || self.name == ".." {
            return Err(ConfigError::invalid(
                "name",
                format!("'{}' is a path, not a file stem", self.name),
            ));
        }
        if self.queue == QueueCapacity::Bounded(0) {
            return Err(ConfigError::invalid(
                "queue",
                "bounded queue capacity must be at least 1",
            ));
        }

        for (target, console) in [
            (ConsoleTarget::Stdout, &self.stdout),
            (ConsoleTarget::Stderr, &self.stderr),
        ] {
            if let (min, Some(max)) = console.severity_range(target) {
                if console.enabled && min > max {
                    return Err(ConfigError::invalid(
                        target.as_str(),
                        format!("min_severity {} is above max_severity {}", min, max),
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn file_path(&self) -> PathBuf {
        self.log_dir.join(format!("{}.log", self.name))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}
