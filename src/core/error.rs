//! Error types for the logging pipeline
//!
//! - [`ConfigError`]: setup-time, fatal to `init`
//! - [`SinkError`]: per-write, isolated to one sink
//! - [`IncompleteDrain`]: shutdown-time, some records may be unflushed

use super::logger::LifecycleState;
use super::router::SinkId;
use std::time::Duration;

pub type SinkResult<T> = std::result::Result<T, SinkError>;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Underlying stream or file failed
    #[error("I/O failure in sink '{sink}' while {operation}: {source}")]
    IoFailure {
        sink: String,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Sink was already closed
    #[error("Sink '{sink}' is closed")]
    Closed { sink: String },

    /// Sink panicked while handling a record
    #[error("Sink '{sink}' panicked: {message}")]
    Panicked { sink: String, message: String },

    #[error("Sink '{sink}' failed: {message}")]
    Other { sink: String, message: String },
}

impl SinkError {
    pub fn io_failure(
        sink: impl Into<String>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        SinkError::IoFailure {
            sink: sink.into(),
            operation: operation.into(),
            source,
        }
    }

    pub fn closed(sink: impl Into<String>) -> Self {
        SinkError::Closed { sink: sink.into() }
    }

    pub fn panicked(sink: impl Into<String>, message: impl Into<String>) -> Self {
        SinkError::Panicked {
            sink: sink.into(),
            message: message.into(),
        }
    }

    pub fn other(sink: impl Into<String>, message: impl Into<String>) -> Self {
        SinkError::Other {
            sink: sink.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_io_failure(&self) -> bool {
        matches!(self, SinkError::IoFailure { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to open sink '{sink}': {source}")]
    OpenSink {
        sink: SinkId,
        #[source]
        source: SinkError,
    },

    #[error("Sink '{0}' is registered more than once")]
    DuplicateSink(SinkId),

    #[error("Invalid configuration for {component}: {message}")]
    Invalid { component: String, message: String },

    #[error("Failed to parse logging configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read configuration file '{path}': {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start dispatcher thread: {0}")]
    SpawnWorker(#[source] std::io::Error),

    #[error("Logger cannot be initialized while {0}")]
    InvalidState(LifecycleState),

    /// A previous `init` consumed the configured sinks
    #[error("Logger initialization was already attempted")]
    InitAttempted,
}

impl ConfigError {
    pub fn invalid(component: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// Shutdown finished without delivering everything that was queued.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IncompleteDrain {
    #[error("Shutdown gave up after {waited:?} with {pending} records still queued")]
    TimedOut { waited: Duration, pending: usize },

    #[error("Dispatcher worker panicked: {message}")]
    WorkerPanicked { message: String },
}
