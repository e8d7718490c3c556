//! # Multisink Logger
//!
//! Asynchronous logging that fans records out to several sinks.
//!
//! ## Features
//!
//! - **Non-blocking**: emitting a record only queues it; one dispatcher
//!   thread does all sink I/O
//! - **Severity routing**: standard output gets `DEBUG`/`INFO`, standard
//!   error gets `WARNING` and up, the file gets `INFO` and up
//! - **Rotating files**: size-bounded with a fixed number of backups
//! - **Guaranteed drain**: `shutdown` (or dropping the logger) delivers every
//!   queued record before the sinks are closed
//!
//! ## Example
//!
//! ```no_run
//! use multisink_logger::prelude::*;
//!
//! let logger = Logger::start(&LoggingConfig::default())?;
//! logger.info("ready");
//! multisink_logger::warning!(logger, "{} retries left", 2);
//! logger.shutdown(None).ok();
//! # Ok::<(), ConfigError>(())
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        ConfigError, Filter, IncompleteDrain, LifecycleState, LineFormatter, Logger,
        LoggerBuilder, LoggerHandle, LoggerMetrics, LoggingConfig, OutputFormat, QueueCapacity,
        Record, Severity, Sink, SinkError, SinkId, SinkResult, SinkSource,
        DEFAULT_SHUTDOWN_TIMEOUT,
    };
}

pub use crate::core::{
    ConfigError, ConsoleConfig, DispatchOutcome, FileConfig, Filter, IncompleteDrain,
    LifecycleState, LineFormatter, Logger, LoggerBuilder, LoggerHandle, LoggerMetrics,
    LoggingConfig, MaxSeverityFilter, ModuleFilter, Origin, OutputFormat, QueueCapacity, Record,
    Router, Severity, Sink, SinkError, SinkErrorCallback, SinkFailure, SinkId, SinkResult,
    SinkSource, TimestampFormat, DEFAULT_SHUTDOWN_TIMEOUT, WORKER_THREAD_NAME,
};
pub use sinks::{ConsoleSink, ConsoleTarget, RotatingFileSink, RotationPolicy};
