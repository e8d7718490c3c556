//! Logging macros with `format!`-style arguments.
//!
//! They work with both [`Logger`](crate::Logger) and
//! [`LoggerHandle`](crate::LoggerHandle) and record the calling module path,
//! not just the file.
//!
//! # Examples
//!
//! ```
//! use multisink_logger::prelude::*;
//! use multisink_logger::info;
//!
//! let logger = Logger::builder().build();
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Log at an explicit severity.
///
/// ```
/// # use multisink_logger::prelude::*;
/// # let logger = Logger::builder().build();
/// use multisink_logger::log;
/// log!(logger, Severity::Info, "Simple message");
/// log!(logger, Severity::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $severity:expr, $($arg:tt)+) => {
        $logger.log_at(
            $severity,
            format!($($arg)+),
            $crate::Origin::new(module_path!(), file!(), line!()),
        )
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Warning, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Error, $($arg)+)
    };
}

/// Log a critical message.
///
/// ```
/// # use multisink_logger::prelude::*;
/// # let logger = Logger::builder().build();
/// use multisink_logger::critical;
/// critical!(logger, "Critical failure: {}", "disk");
/// ```
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Critical, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Logger, Record, Severity, Sink, SinkId, SinkResult};
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct OriginSink(Arc<Mutex<Vec<String>>>);

    impl Sink for OriginSink {
        fn write(&mut self, record: &Record) -> SinkResult<()> {
            self.0.lock().push(format!(
                "{} {} {}",
                record.severity(),
                record.origin().module(),
                record.message()
            ));
            Ok(())
        }

        fn flush(&mut self) -> SinkResult<()> {
            Ok(())
        }

        fn close(&mut self) -> SinkResult<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "origin"
        }
    }

    #[test]
    fn test_macros_format_and_capture_module() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let logger = Logger::builder()
            .sink(SinkId::Custom(0), OriginSink(Arc::clone(&seen)), Severity::Debug)
            .build();
        logger.init().unwrap();

        debug!(logger, "Count: {}", 5);
        info!(logger, "Items: {}", 100);
        warning!(logger, "Retry {} of {}", 1, 3);
        error!(logger, "Code: {}", 500);
        critical!(logger.handle(), "Critical failure: {}", "system");
        log!(logger, Severity::Info, "plain");
        logger.shutdown(None).unwrap();

        let module = module_path!();
        assert_eq!(
            *seen.lock(),
            vec![
                format!("DEBUG {} Count: 5", module),
                format!("INFO {} Items: 100", module),
                format!("WARNING {} Retry 1 of 3", module),
                format!("ERROR {} Code: 500", module),
                format!("CRITICAL {} Critical failure: system", module),
                format!("INFO {} plain", module),
            ]
        );
    }
}
