//! Core pipeline types and traits

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod filter;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod record;
pub mod router;
pub mod severity;
pub mod sink;
pub mod timestamp;

pub use config::{ConsoleConfig, FileConfig, LoggingConfig};
pub use dispatcher::{QueueCapacity, SinkErrorCallback, WORKER_THREAD_NAME};
pub use error::{ConfigError, IncompleteDrain, SinkError, SinkResult};
pub use filter::{Filter, MaxSeverityFilter, ModuleFilter};
pub use logger::{
    LifecycleState, Logger, LoggerBuilder, LoggerHandle, SinkSource, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use metrics::LoggerMetrics;
pub use output_format::{LineFormatter, OutputFormat};
pub use record::{Origin, Record};
pub use router::{DispatchOutcome, Router, SinkFailure, SinkId};
pub use severity::Severity;
pub use sink::Sink;
pub use timestamp::TimestampFormat;
