//! Immutable log records and their call-site metadata

use super::severity::Severity;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::cell::RefCell;
use std::panic::Location;
use std::path::Path;

// Computed once per thread; records are created on hot paths
thread_local! {
    static THREAD_LABEL: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn thread_label() -> String {
    THREAD_LABEL.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| {
                let current = std::thread::current();
                match current.name() {
                    Some(name) => name.to_string(),
                    None => format!("{:?}", current.id()),
                }
            })
            .clone()
    })
}

/// Where a record was emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Origin {
    module: Cow<'static, str>,
    file: Cow<'static, str>,
    line: u32,
}

impl Origin {
    pub fn new(
        module: impl Into<Cow<'static, str>>,
        file: impl Into<Cow<'static, str>>,
        line: u32,
    ) -> Self {
        Self {
            module: module.into(),
            file: file.into(),
            line,
        }
    }

    /// Origin of the calling code. The module is the source file's stem.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &'static Location<'static>) -> Self {
        let file: &'static str = location.file();
        let module = Path::new(file)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("unknown");
        Self::new(module, file, location.line())
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

/// One log event. Built once, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    timestamp: DateTime<Utc>,
    severity: Severity,
    message: String,
    origin: Origin,
    thread: String,
}

impl Record {
    /// Escape line breaks and tabs so a record always occupies exactly one line.
    fn sanitize_message(message: String) -> String {
        if !message.contains(['\n', '\r', '\t']) {
            return message;
        }
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(severity: Severity, message: impl Into<String>, origin: Origin) -> Self {
        Self::at(Utc::now(), severity, message, origin)
    }

    /// Build a record with an explicit timestamp.
    pub fn at(
        timestamp: DateTime<Utc>,
        severity: Severity,
        message: impl Into<String>,
        origin: Origin,
    ) -> Self {
        Self {
            timestamp,
            severity,
            message: Self::sanitize_message(message.into()),
            origin,
            thread: thread_label(),
        }
    }

    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Name of the emitting thread, or its id when unnamed.
    pub fn thread(&self) -> &str {
        &self.thread
    }
}
