//! Record filters attached to router bindings

use super::record::Record;
use super::severity::Severity;

/// Pure predicate over a record. Implementations must not perform I/O.
pub trait Filter: Send + Sync {
    fn admit(&self, record: &Record) -> bool;
}

impl<F> Filter for F
where
    F: Fn(&Record) -> bool + Send + Sync,
{
    fn admit(&self, record: &Record) -> bool {
        self(record)
    }
}

/// Admits records at or below a threshold.
///
/// Used to keep warnings and errors off the standard-out stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxSeverityFilter {
    threshold: Severity,
}

impl MaxSeverityFilter {
    pub fn new(threshold: Severity) -> Self {
        Self { threshold }
    }

    pub fn boxed(threshold: Severity) -> Box<dyn Filter> {
        Box::new(Self::new(threshold))
    }

    pub fn threshold(&self) -> Severity {
        self.threshold
    }
}

impl Filter for MaxSeverityFilter {
    fn admit(&self, record: &Record) -> bool {
        record.severity() <= self.threshold
    }
}

/// Admits records whose origin module is `name` or nested below it (`name::...`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFilter {
    name: String,
}

impl ModuleFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Filter for ModuleFilter {
    fn admit(&self, record: &Record) -> bool {
        let module = record.origin().module();
        match module.strip_prefix(self.name.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with("::"),
            None => false,
        }
    }
}
