//! Severity-based routing of records to sinks

use super::{
    error::{ConfigError, SinkError, SinkResult},
    filter::Filter,
    record::Record,
    severity::Severity,
    sink::Sink,
};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Typed key of a registered sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkId {
    Stdout,
    Stderr,
    File,
    Custom(u16),
}

impl fmt::Display for SinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkId::Stdout => f.write_str("stdout"),
            SinkId::Stderr => f.write_str("stderr"),
            SinkId::File => f.write_str("file"),
            SinkId::Custom(n) => write!(f, "custom-{}", n),
        }
    }
}

/// A sink that failed to handle a record, flush, or close.
#[derive(Debug)]
pub struct SinkFailure {
    pub sink: SinkId,
    pub error: SinkError,
}

/// Result of delivering one record.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Bindings whose severity gate and filter accepted the record
    pub matched: usize,
    /// Bindings that wrote the record successfully
    pub delivered: usize,
    pub failures: Vec<SinkFailure>,
}

impl DispatchOutcome {
    /// Every binding that wanted the record failed to write it.
    pub fn is_discarded(&self) -> bool {
        self.matched > 0 && self.delivered == 0
    }
}

struct Binding {
    id: SinkId,
    sink: Box<dyn Sink>,
    min_severity: Severity,
    filter: Option<Box<dyn Filter>>,
}

impl Binding {
    /// A filter that panics rejects the record and is reported as a failure.
    fn accepts(&self, record: &Record) -> SinkResult<bool> {
        if record.severity() < self.min_severity {
            return Ok(false);
        }
        let Some(ref filter) = self.filter else {
            return Ok(true);
        };
        catch_unwind(AssertUnwindSafe(|| filter.admit(record))).map_err(|payload| {
            SinkError::panicked(
                self.sink.name(),
                format!("filter panicked: {}", panic_message(payload)),
            )
        })
    }
}

pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Runs one sink operation, turning a panic into a [`SinkError::Panicked`].
fn isolated(
    sink: &mut Box<dyn Sink>,
    op: impl FnOnce(&mut Box<dyn Sink>) -> SinkResult<()>,
) -> SinkResult<()> {
    let name = sink.name().to_string();
    match catch_unwind(AssertUnwindSafe(|| op(sink))) {
        Ok(result) => result,
        Err(payload) => Err(SinkError::panicked(name, panic_message(payload))),
    }
}

/// Ordered bindings of sinks, each with a minimum severity and optional filter.
#[derive(Default)]
pub struct Router {
    bindings: Vec<Binding>,
    closed: bool,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink. Delivery follows registration order.
    pub fn register(
        &mut self,
        id: SinkId,
        sink: Box<dyn Sink>,
        filter: Option<Box<dyn Filter>>,
        min_severity: Severity,
    ) -> Result<(), ConfigError> {
        if self.bindings.iter().any(|b| b.id == id) {
            return Err(ConfigError::DuplicateSink(id));
        }
        self.bindings.push(Binding {
            id,
            sink,
            min_severity,
            filter,
        });
        Ok(())
    }

    pub fn sink_ids(&self) -> Vec<SinkId> {
        self.bindings.iter().map(|b| b.id).collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Deliver a record to every accepting binding. A failing sink never
    /// prevents delivery to the others.
    pub fn dispatch(&mut self, record: &Record) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();

        for binding in self.bindings.iter_mut() {
            match binding.accepts(record) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(error) => {
                    outcome.failures.push(SinkFailure {
                        sink: binding.id,
                        error,
                    });
                    continue;
                }
            }
            outcome.matched += 1;

            match isolated(&mut binding.sink, |sink| sink.write(record)) {
                Ok(()) => outcome.delivered += 1,
                Err(error) => outcome.failures.push(SinkFailure {
                    sink: binding.id,
                    error,
                }),
            }
        }

        outcome
    }

    pub fn flush_all(&mut self) -> Vec<SinkFailure> {
        if self.closed {
            return Vec::new();
        }
        self.for_each_sink(|sink| sink.flush())
    }

    /// Close every sink. Only the first call has any effect.
    pub fn close_all(&mut self) -> Vec<SinkFailure> {
        if self.closed {
            return Vec::new();
        }
        self.closed = true;
        self.for_each_sink(|sink| sink.close())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn for_each_sink(
        &mut self,
        op: impl Fn(&mut Box<dyn Sink>) -> SinkResult<()>,
    ) -> Vec<SinkFailure> {
        self.bindings
            .iter_mut()
            .filter_map(|binding| {
                isolated(&mut binding.sink, &op)
                    .err()
                    .map(|error| SinkFailure {
                        sink: binding.id,
                        error,
                    })
            })
            .collect()
    }
}

impl Drop for Router {
    /// Sinks of a router that never went through shutdown still get closed.
    fn drop(&mut self) {
        for failure in self.close_all() {
            eprintln!(
                "[LOGGER ERROR] Sink '{}' failed to close: {}",
                failure.sink, failure.error
            );
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("sinks", &self.sink_ids())
            .field("closed", &self.closed)
            .finish()
    }
}
