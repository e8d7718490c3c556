//! Logger lifecycle and the producer-facing API

use super::{
    config::LoggingConfig,
    dispatcher::{Dispatcher, ErrorReporter, QueueCapacity, SinkErrorCallback},
    error::{ConfigError, IncompleteDrain},
    filter::{Filter, MaxSeverityFilter},
    metrics::LoggerMetrics,
    output_format::LineFormatter,
    record::{Origin, Record},
    router::{Router, SinkId},
    severity::Severity,
    sink::Sink,
};
use crate::sinks::{ConsoleSink, ConsoleTarget, RotatingFileSink, RotationPolicy};
use crossbeam_channel::Sender;
use parking_lot::{Condvar, Mutex, RwLock};
use std::fmt;
use std::panic::Location;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default time a dropped [`Logger`] waits for its queue to drain
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Where a logger is in its one-way lifecycle:
/// `Uninitialized -> Running -> Draining -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LifecycleState {
    Uninitialized = 0,
    Running = 1,
    Draining = 2,
    Stopped = 3,
}

impl LifecycleState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LifecycleState::Uninitialized,
            1 => LifecycleState::Running,
            2 => LifecycleState::Draining,
            _ => LifecycleState::Stopped,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Running => "running",
            LifecycleState::Draining => "draining",
            LifecycleState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sink that is opened when the logger is initialized.
pub enum SinkSource {
    Console {
        target: ConsoleTarget,
        formatter: LineFormatter,
        colors: bool,
    },
    RotatingFile {
        path: PathBuf,
        policy: RotationPolicy,
        formatter: LineFormatter,
    },
    /// Already constructed; used as is
    Custom(Box<dyn Sink>),
}

impl SinkSource {
    /// Compact lines to a console stream
    pub fn console(target: ConsoleTarget) -> Self {
        SinkSource::Console {
            target,
            formatter: LineFormatter::compact(),
            colors: false,
        }
    }

    /// Detailed lines to a rotating file
    pub fn rotating_file(path: impl Into<PathBuf>, policy: RotationPolicy) -> Self {
        SinkSource::RotatingFile {
            path: path.into(),
            policy,
            formatter: LineFormatter::detailed(),
        }
    }

    pub fn custom(sink: impl Sink + 'static) -> Self {
        SinkSource::Custom(Box::new(sink))
    }

    fn open(self, id: SinkId) -> Result<Box<dyn Sink>, ConfigError> {
        match self {
            SinkSource::Console {
                target,
                formatter,
                colors,
            } => Ok(Box::new(
                ConsoleSink::new(target)
                    .with_formatter(formatter)
                    .with_colors(colors),
            )),
            SinkSource::RotatingFile {
                path,
                policy,
                formatter,
            } => RotatingFileSink::open(path, policy)
                .map(|sink| Box::new(sink.with_formatter(formatter)) as Box<dyn Sink>)
                .map_err(|source| ConfigError::OpenSink { sink: id, source }),
            SinkSource::Custom(sink) => Ok(sink),
        }
    }
}

struct BindingSpec {
    id: SinkId,
    source: SinkSource,
    min_severity: Severity,
    filter: Option<Box<dyn Filter>>,
}

/// Builder for a [`Logger`]
///
/// # Example
///
/// ```
/// use multisink_logger::prelude::*;
/// use multisink_logger::sinks::ConsoleTarget;
///
/// let logger = Logger::builder()
///     .min_severity(Severity::Info)
///     .queue(QueueCapacity::Bounded(1024))
///     .bind(SinkId::Stderr, SinkSource::console(ConsoleTarget::Stderr), Severity::Warning)
///     .build();
///
/// assert_eq!(logger.state(), LifecycleState::Uninitialized);
/// ```
pub struct LoggerBuilder {
    min_severity: Severity,
    queue: QueueCapacity,
    shutdown_timeout: Duration,
    on_sink_error: Option<SinkErrorCallback>,
    bindings: Vec<BindingSpec>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            min_severity: Severity::Debug,
            queue: QueueCapacity::Unbounded,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            on_sink_error: None,
            bindings: Vec::new(),
        }
    }

    /// Builder holding the console and file bindings described by `config`.
    pub fn from_config(config: &LoggingConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut builder = Self::new()
            .min_severity(config.min_severity)
            .queue(config.queue)
            .shutdown_timeout(config.shutdown_timeout());

        for (id, target, console) in [
            (SinkId::Stdout, ConsoleTarget::Stdout, &config.stdout),
            (SinkId::Stderr, ConsoleTarget::Stderr, &config.stderr),
        ] {
            if !console.enabled {
                continue;
            }
            let source = SinkSource::Console {
                target,
                formatter: LineFormatter::new(console.format),
                colors: console.colors,
            };
            builder = match console.severity_range(target) {
                (min, Some(max)) => {
                    builder.bind_filtered(id, source, min, MaxSeverityFilter::new(max))
                }
                (min, None) => builder.bind(id, source, min),
            };
        }

        if config.file.enabled {
            let formatter = LineFormatter::new(config.file.format)
                .with_timestamp_format(config.file.timestamp_format.clone());
            builder = builder.bind(
                SinkId::File,
                SinkSource::RotatingFile {
                    path: config.file_path(),
                    policy: config.file.rotation_policy(),
                    formatter,
                },
                config.file.min_severity,
            );
        }

        Ok(builder)
    }

    /// Records below this severity never reach the queue
    #[must_use = "builder methods return a new value"]
    pub fn min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn queue(mut self, capacity: QueueCapacity) -> Self {
        self.queue = capacity;
        self
    }

    /// Time allowed for draining when the logger is dropped
    #[must_use = "builder methods return a new value"]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Receive every sink failure instead of the stderr report.
    ///
    /// Runs on the dispatcher thread. It must not log through a bounded
    /// logger it belongs to, since a full queue would never drain.
    #[must_use = "builder methods return a new value"]
    pub fn on_sink_error(mut self, callback: SinkErrorCallback) -> Self {
        self.on_sink_error = Some(callback);
        self
    }

    /// Route records at or above `min_severity` to `source`
    #[must_use = "builder methods return a new value"]
    pub fn bind(self, id: SinkId, source: SinkSource, min_severity: Severity) -> Self {
        self.push(id, source, min_severity, None)
    }

    #[must_use = "builder methods return a new value"]
    pub fn bind_filtered(
        self,
        id: SinkId,
        source: SinkSource,
        min_severity: Severity,
        filter: impl Filter + 'static,
    ) -> Self {
        self.push(id, source, min_severity, Some(Box::new(filter)))
    }

    /// Shorthand for binding an already constructed sink
    #[must_use = "builder methods return a new value"]
    pub fn sink(self, id: SinkId, sink: impl Sink + 'static, min_severity: Severity) -> Self {
        self.bind(id, SinkSource::custom(sink), min_severity)
    }

    fn push(
        mut self,
        id: SinkId,
        source: SinkSource,
        min_severity: Severity,
        filter: Option<Box<dyn Filter>>,
    ) -> Self {
        self.bindings.push(BindingSpec {
            id,
            source,
            min_severity,
            filter,
        });
        self
    }

    pub fn build(self) -> Logger {
        let metrics = Arc::new(LoggerMetrics::new());
        let reporter = ErrorReporter::new(Arc::clone(&metrics), self.on_sink_error);
        let sink_ids = self.bindings.iter().map(|b| b.id).collect();

        Logger {
            handle: LoggerHandle {
                shared: Arc::new(Shared {
                    state: Arc::new(AtomicU8::new(LifecycleState::Uninitialized as u8)),
                    min_severity: self.min_severity,
                    sender: RwLock::new(None),
                    metrics,
                }),
            },
            setup: Mutex::new(Some(Setup {
                bindings: self.bindings,
                queue: self.queue,
            })),
            dispatcher: Mutex::new(None),
            drained: Mutex::new(None),
            drained_signal: Condvar::new(),
            reporter,
            sink_ids,
            shutdown_timeout: self.shutdown_timeout,
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything `init` consumes
struct Setup {
    bindings: Vec<BindingSpec>,
    queue: QueueCapacity,
}

impl Setup {
    /// Open every sink in order. Sinks opened before a failure are closed
    /// when the partial router is dropped.
    fn open_router(self) -> Result<Router, ConfigError> {
        for (index, spec) in self.bindings.iter().enumerate() {
            if self.bindings[..index].iter().any(|other| other.id == spec.id) {
                return Err(ConfigError::DuplicateSink(spec.id));
            }
        }

        let mut router = Router::new();
        for spec in self.bindings {
            let sink = spec.source.open(spec.id)?;
            router.register(spec.id, sink, spec.filter, spec.min_severity)?;
        }
        Ok(router)
    }
}

struct Shared {
    /// Also held by the dispatcher, which publishes `Stopped` after a timed out drain
    state: Arc<AtomicU8>,
    min_severity: Severity,
    /// `None` before `init` and after `shutdown`
    sender: RwLock<Option<Sender<Record>>>,
    metrics: Arc<LoggerMetrics>,
}

impl Shared {
    fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn submit(&self, severity: Severity, message: String, origin: impl FnOnce() -> Origin) {
        if severity < self.min_severity {
            self.metrics.record_filtered();
            return;
        }

        // Cloned out of the lock so a send waiting on a full queue never holds it
        let Some(sender) = self.sender.read().clone() else {
            self.metrics.record_rejected();
            return;
        };

        match sender.send(Record::new(severity, message, origin())) {
            Ok(()) => {
                self.metrics.record_enqueued();
            }
            Err(_) => {
                self.metrics.record_rejected();
            }
        }
    }
}

/// Cloneable producer side of a [`Logger`].
///
/// Emitting never touches a sink: the record is queued and the call returns.
/// Records emitted before `init` or after `shutdown` are counted as rejected
/// and dropped.
#[derive(Clone)]
pub struct LoggerHandle {
    shared: Arc<Shared>,
}

impl LoggerHandle {
    #[track_caller]
    pub fn log(&self, severity: Severity, message: impl Into<String>) {
        let location = Location::caller();
        self.shared
            .submit(severity, message.into(), || Origin::from_location(location));
    }

    /// Log with an explicit origin, as the logging macros do
    pub fn log_at(&self, severity: Severity, message: impl Into<String>, origin: Origin) {
        self.shared.submit(severity, message.into(), || origin);
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(Severity::Debug, message);
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log(Severity::Info, message);
    }

    #[track_caller]
    pub fn warning(&self, message: impl Into<String>) {
        self.log(Severity::Warning, message);
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log(Severity::Error, message);
    }

    #[track_caller]
    pub fn critical(&self, message: impl Into<String>) {
        self.log(Severity::Critical, message);
    }

    pub fn state(&self) -> LifecycleState {
        self.shared.state()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }
}

impl fmt::Debug for LoggerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerHandle")
            .field("state", &self.state())
            .field("min_severity", &self.shared.min_severity)
            .finish()
    }
}

/// Owner of the logging pipeline.
///
/// There is no global instance: construct one, call [`Logger::init`], and
/// share [`LoggerHandle`]s with the rest of the program. Dropping the logger
/// drains the queue.
///
/// # Example
///
/// ```no_run
/// use multisink_logger::{Logger, LoggingConfig};
/// use std::time::Duration;
///
/// let logger = Logger::start(&LoggingConfig::default()).unwrap();
/// logger.info("service started");
/// logger.warning("cache is cold");
///
/// if let Err(e) = logger.shutdown(Some(Duration::from_secs(10))) {
///     eprintln!("some records were lost: {}", e);
/// }
/// ```
pub struct Logger {
    handle: LoggerHandle,
    setup: Mutex<Option<Setup>>,
    dispatcher: Mutex<Option<Dispatcher>>,
    /// Result of the winning `shutdown`, for callers that raced it
    drained: Mutex<Option<Result<(), IncompleteDrain>>>,
    drained_signal: Condvar,
    reporter: ErrorReporter,
    sink_ids: Vec<SinkId>,
    shutdown_timeout: Duration,
}

impl Logger {
    /// Uninitialized logger for `config`; nothing is opened yet.
    pub fn new(config: &LoggingConfig) -> Result<Self, ConfigError> {
        Ok(LoggerBuilder::from_config(config)?.build())
    }

    /// `new` followed by `init`
    pub fn start(config: &LoggingConfig) -> Result<Self, ConfigError> {
        let logger = Self::new(config)?;
        logger.init()?;
        Ok(logger)
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Open every sink and start the dispatcher.
    ///
    /// # Errors
    ///
    /// Fails if any sink cannot be opened (already opened ones are closed and
    /// nothing runs), if the logger is past `Uninitialized`, or if a previous
    /// `init` already failed.
    pub fn init(&self) -> Result<(), ConfigError> {
        let mut slot = self.setup.lock();

        let state = self.state();
        if state != LifecycleState::Uninitialized {
            return Err(ConfigError::InvalidState(state));
        }

        let setup = slot.take().ok_or(ConfigError::InitAttempted)?;
        let queue = setup.queue;
        let router = setup.open_router()?;

        let (sender, dispatcher) = Dispatcher::spawn(
            router,
            queue,
            self.reporter.clone(),
            Arc::clone(&self.shared().state),
        )
        .map_err(ConfigError::SpawnWorker)?;

        *self.shared().sender.write() = Some(sender);
        *self.dispatcher.lock() = Some(dispatcher);
        self.shared()
            .state
            .store(LifecycleState::Running as u8, Ordering::Release);
        Ok(())
    }

    #[track_caller]
    pub fn log(&self, severity: Severity, message: impl Into<String>) {
        self.handle.log(severity, message);
    }

    pub fn log_at(&self, severity: Severity, message: impl Into<String>, origin: Origin) {
        self.handle.log_at(severity, message, origin);
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.handle.debug(message);
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.handle.info(message);
    }

    #[track_caller]
    pub fn warning(&self, message: impl Into<String>) {
        self.handle.warning(message);
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.handle.error(message);
    }

    #[track_caller]
    pub fn critical(&self, message: impl Into<String>) {
        self.handle.critical(message);
    }

    /// Producer handle usable from any thread
    pub fn handle(&self) -> LoggerHandle {
        self.handle.clone()
    }

    /// Stop accepting records, drain the queue, then flush and close every sink.
    ///
    /// Only the first call on a running logger drains. Calls made while that
    /// drain is in progress wait for it (up to their own timeout) and return
    /// its result; calls before `init` or after `Stopped` return `Ok(())`.
    /// With `None` it waits as long as draining takes.
    ///
    /// A timed out drain leaves the logger in `Draining` until the dispatcher
    /// has discarded the remaining records and closed the sinks, at which
    /// point it becomes `Stopped`.
    ///
    /// # Errors
    ///
    /// [`IncompleteDrain`] if the timeout expired first (the remaining records
    /// are discarded and the sinks closed by the dispatcher) or the dispatcher
    /// panicked.
    pub fn shutdown(&self, timeout: Option<Duration>) -> Result<(), IncompleteDrain> {
        let shared = self.shared();
        if shared
            .state
            .compare_exchange(
                LifecycleState::Running as u8,
                LifecycleState::Draining as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return self.await_drain(timeout);
        }

        // The worker sees disconnection once the queue is empty and every
        // producer still holding a clone has finished its send
        drop(shared.sender.write().take());

        let dispatcher = self.dispatcher.lock().take();
        let result = match dispatcher {
            Some(dispatcher) => dispatcher.join(timeout).map(|mut router| {
                self.reporter.report_all(&router.flush_all());
                self.reporter.report_all(&router.close_all());
            }),
            None => Ok(()),
        };

        if !matches!(result, Err(IncompleteDrain::TimedOut { .. })) {
            shared
                .state
                .store(LifecycleState::Stopped as u8, Ordering::Release);
        }

        *self.drained.lock() = Some(result.clone());
        self.drained_signal.notify_all();
        result
    }

    fn await_drain(&self, timeout: Option<Duration>) -> Result<(), IncompleteDrain> {
        if self.state() != LifecycleState::Draining {
            return Ok(());
        }

        let started = Instant::now();
        let mut drained = self.drained.lock();
        while drained.is_none() {
            match timeout {
                Some(limit) => {
                    let left = limit.saturating_sub(started.elapsed());
                    if self.drained_signal.wait_for(&mut drained, left).timed_out()
                        && drained.is_none()
                    {
                        return Err(IncompleteDrain::TimedOut {
                            waited: started.elapsed(),
                            pending: self.metrics().pending() as usize,
                        });
                    }
                }
                None => self.drained_signal.wait(&mut drained),
            }
        }
        (*drained).clone().unwrap_or(Ok(()))
    }

    pub fn state(&self) -> LifecycleState {
        self.handle.state()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.handle.metrics()
    }

    /// Bound sinks, in delivery order
    pub fn sink_ids(&self) -> &[SinkId] {
        &self.sink_ids
    }

    fn shared(&self) -> &Shared {
        &self.handle.shared
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("state", &self.state())
            .field("sinks", &self.sink_ids)
            .field("shutdown_timeout", &self.shutdown_timeout)
            .finish()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        let running = self.state() == LifecycleState::Running;
        if let Err(e) = self.shutdown(Some(self.shutdown_timeout)) {
            // An explicit shutdown already returned this error
            if running {
                eprintln!("[LOGGER WARNING] Shutdown on drop was incomplete: {}", e);
            }
        }

        let discarded = self.metrics().discarded();
        if discarded > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger stopped with {} records no sink could write (discard rate: {:.2}%)",
                discarded,
                self.metrics().discard_rate()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{SinkError, SinkResult};
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[derive(Clone, Default)]
    struct Capture {
        lines: Arc<Mutex<Vec<String>>>,
        closes: Arc<AtomicUsize>,
    }

    struct CaptureSink(Capture);

    impl Sink for CaptureSink {
        fn write(&mut self, record: &Record) -> SinkResult<()> {
            self.0.lines.lock().push(format!(
                "{}|{}|{}",
                record.severity(),
                record.message(),
                record.origin().line()
            ));
            Ok(())
        }

        fn flush(&mut self) -> SinkResult<()> {
            Ok(())
        }

        fn close(&mut self) -> SinkResult<()> {
            self.0.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &str {
            "capture"
        }
    }

    fn capture_logger(min_severity: Severity) -> (Logger, Capture) {
        let captured = Capture::default();
        let logger = Logger::builder()
            .min_severity(min_severity)
            .sink(SinkId::Custom(0), CaptureSink(captured.clone()), Severity::Debug)
            .build();
        (logger, captured)
    }

    #[test]
    fn test_builder_starts_uninitialized() {
        let (logger, _) = capture_logger(Severity::Debug);
        assert_eq!(logger.state(), LifecycleState::Uninitialized);
        assert_eq!(logger.sink_ids(), &[SinkId::Custom(0)]);
    }

    #[test]
    fn test_records_before_init_are_rejected() {
        let (logger, captured) = capture_logger(Severity::Debug);
        logger.info("too early");
        assert_eq!(logger.metrics().rejected(), 1);

        logger.init().unwrap();
        logger.shutdown(None).unwrap();
        assert!(captured.lines.lock().is_empty());
    }

    #[test]
    fn test_init_twice_fails() {
        let (logger, _) = capture_logger(Severity::Debug);
        logger.init().unwrap();
        let err = logger.init().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidState(LifecycleState::Running)
        ));
    }

    #[test]
    fn test_failed_init_cannot_be_retried() {
        let logger = Logger::builder()
            .sink(SinkId::File, CaptureSink(Capture::default()), Severity::Debug)
            .sink(SinkId::File, CaptureSink(Capture::default()), Severity::Debug)
            .build();

        assert!(matches!(
            logger.init(),
            Err(ConfigError::DuplicateSink(SinkId::File))
        ));
        assert_eq!(logger.state(), LifecycleState::Uninitialized);
        assert!(matches!(logger.init(), Err(ConfigError::InitAttempted)));
    }

    #[test]
    fn test_min_severity_filters_before_queue() {
        let (logger, captured) = capture_logger(Severity::Warning);
        logger.init().unwrap();
        logger.debug("hidden");
        logger.info("hidden");
        logger.error("shown");
        logger.shutdown(None).unwrap();

        assert_eq!(logger.metrics().filtered(), 2);
        assert_eq!(logger.metrics().enqueued(), 1);
        assert_eq!(captured.lines.lock().len(), 1);
    }

    #[test]
    fn test_origin_is_call_site() {
        let (logger, captured) = capture_logger(Severity::Debug);
        logger.init().unwrap();
        logger.critical("where");
        let line = line!() - 1;
        logger.shutdown(None).unwrap();

        assert_eq!(*captured.lines.lock(), vec![format!("CRITICAL|where|{}", line)]);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let (logger, captured) = capture_logger(Severity::Debug);
        assert!(logger.shutdown(None).is_ok());
        assert_eq!(logger.state(), LifecycleState::Uninitialized);

        logger.init().unwrap();
        logger.info("one");
        assert!(logger.shutdown(None).is_ok());
        assert!(logger.shutdown(Some(Duration::from_millis(10))).is_ok());
        assert_eq!(logger.state(), LifecycleState::Stopped);
        assert_eq!(captured.closes.load(Ordering::SeqCst), 1);

        logger.info("too late");
        assert_eq!(logger.metrics().rejected(), 1);
    }

    #[test]
    fn test_handles_from_many_threads() {
        let (logger, captured) = capture_logger(Severity::Debug);
        logger.init().unwrap();

        let workers: Vec<_> = (0..4)
            .map(|n| {
                let handle = logger.handle();
                thread::spawn(move || {
                    for i in 0..25 {
                        handle.info(format!("{}-{}", n, i));
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        logger.shutdown(None).unwrap();
        assert_eq!(captured.lines.lock().len(), 100);
        assert_eq!(logger.metrics().delivered(), 100);
    }

    #[test]
    fn test_drop_drains() {
        let (logger, captured) = capture_logger(Severity::Debug);
        logger.init().unwrap();
        for n in 0..50 {
            logger.debug(format!("record {}", n));
        }
        drop(logger);

        assert_eq!(captured.lines.lock().len(), 50);
        assert_eq!(captured.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unopenable_file_fails_init() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let logger = Logger::builder()
            .bind(
                SinkId::File,
                SinkSource::rotating_file(blocker.join("app.log"), RotationPolicy::default()),
                Severity::Info,
            )
            .build();

        match logger.init() {
            Err(ConfigError::OpenSink { sink, source }) => {
                assert_eq!(sink, SinkId::File);
                assert!(matches!(source, SinkError::IoFailure { .. }));
            }
            other => panic!("unexpected init result: {:?}", other),
        }
        assert_eq!(logger.state(), LifecycleState::Uninitialized);
    }
}
