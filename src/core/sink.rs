//! Sink trait for log destinations

use super::{error::SinkResult, record::Record};

/// A destination for formatted records.
///
/// Sinks are owned and driven by the single dispatcher worker, so they only
/// need to be `Send`; no internal locking is required.
///
/// # Example
///
/// ```
/// use multisink_logger::{Record, Sink, SinkResult};
///
/// struct CountingSink(usize);
///
/// impl Sink for CountingSink {
///     fn write(&mut self, _record: &Record) -> SinkResult<()> {
///         self.0 += 1;
///         Ok(())
///     }
///
///     fn flush(&mut self) -> SinkResult<()> {
///         Ok(())
///     }
///
///     fn close(&mut self) -> SinkResult<()> {
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "counting"
///     }
/// }
/// ```
pub trait Sink: Send {
    fn write(&mut self, record: &Record) -> SinkResult<()>;

    fn flush(&mut self) -> SinkResult<()>;

    /// Flush and release the underlying resource. Writes after `close` fail.
    fn close(&mut self) -> SinkResult<()>;

    fn name(&self) -> &str;
}
