//! Single-consumer dispatch queue
//!
//! Producers push records into a crossbeam channel; exactly one worker thread
//! pulls them off and hands them to the [`Router`]. The worker is the only
//! code that ever touches a sink.

use super::{
    error::IncompleteDrain,
    logger::LifecycleState,
    metrics::LoggerMetrics,
    record::Record,
    router::{panic_message, DispatchOutcome, Router, SinkFailure},
};
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub const WORKER_THREAD_NAME: &str = "log-dispatcher";

/// Print one stderr line for the first sink failure and every 1000th after
const REPORT_EVERY: u64 = 1000;

/// Worker handshake: whoever moves the phase off `DRAINING` first decides
/// who closes the sinks.
const DRAINING: u8 = 0;
const ABANDONED: u8 = 1;
const FINISHED: u8 = 2;

/// Queue sizing between producers and the worker.
///
/// A bounded queue makes producers wait for space instead of growing memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueCapacity {
    #[default]
    Unbounded,
    Bounded(usize),
}

impl QueueCapacity {
    fn channel<T>(&self) -> (Sender<T>, Receiver<T>) {
        match self {
            QueueCapacity::Unbounded => unbounded(),
            QueueCapacity::Bounded(capacity) => bounded(*capacity),
        }
    }
}

/// Callback receiving every sink failure instead of the stderr report.
pub type SinkErrorCallback = Arc<dyn Fn(&SinkFailure) + Send + Sync>;

/// Counts sink failures and forwards them to the configured error channel.
#[derive(Clone)]
pub(crate) struct ErrorReporter {
    metrics: Arc<LoggerMetrics>,
    callback: Option<SinkErrorCallback>,
}

impl ErrorReporter {
    pub(crate) fn new(metrics: Arc<LoggerMetrics>, callback: Option<SinkErrorCallback>) -> Self {
        Self { metrics, callback }
    }

    pub(crate) fn report(&self, failure: &SinkFailure) {
        let previous = self.metrics.record_sink_failure();

        if let Some(ref callback) = self.callback {
            // A panicking callback must not take the worker down with it
            if catch_unwind(AssertUnwindSafe(|| callback(failure))).is_err() {
                eprintln!("[LOGGER ERROR] Sink error callback panicked");
            }
            return;
        }

        if previous == 0 || (previous + 1) % REPORT_EVERY == 0 {
            eprintln!(
                "[LOGGER ERROR] Sink '{}' failed: {} ({} failures so far)",
                failure.sink,
                failure.error,
                previous + 1
            );
        }
    }

    pub(crate) fn report_all(&self, failures: &[SinkFailure]) {
        for failure in failures {
            self.report(failure);
        }
    }

    fn record_outcome(&self, outcome: &DispatchOutcome) {
        self.metrics.record_dispatched();
        self.metrics.record_delivered(outcome.delivered as u64);
        self.report_all(&outcome.failures);
        if outcome.is_discarded() {
            self.metrics.record_discarded();
        }
    }
}

/// Handle on the running worker thread.
pub(crate) struct Dispatcher {
    worker: JoinHandle<Router>,
    /// Disconnects when the worker thread exits, normally or by panic
    done: Receiver<()>,
    phase: Arc<AtomicU8>,
    /// Observes queue depth after the sender is gone
    queue: Receiver<Record>,
}

impl Dispatcher {
    /// Start the worker. The returned sender is the only way into the queue;
    /// dropping it (and every clone) is the drain signal.
    ///
    /// `state` is set to `Stopped` by the worker itself when a timed out
    /// shutdown leaves it to close the sinks.
    pub(crate) fn spawn(
        router: Router,
        capacity: QueueCapacity,
        reporter: ErrorReporter,
        state: Arc<AtomicU8>,
    ) -> std::io::Result<(Sender<Record>, Self)> {
        let (sender, receiver) = capacity.channel();
        let (done_tx, done_rx) = bounded::<()>(0);
        let phase = Arc::new(AtomicU8::new(DRAINING));

        let worker_receiver = receiver.clone();
        let worker_phase = Arc::clone(&phase);
        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let _done = done_tx;
                run(worker_receiver, router, &reporter, &worker_phase, &state)
            })?;

        Ok((
            sender,
            Self {
                worker,
                done: done_rx,
                phase,
                queue: receiver,
            },
        ))
    }

    /// Wait for the worker to drain the queue and hand back the router.
    ///
    /// With a timeout, an overdue worker is told to discard what is left and
    /// close the sinks itself; the caller learns how many records were queued.
    pub(crate) fn join(self, timeout: Option<Duration>) -> Result<Router, IncompleteDrain> {
        let started = Instant::now();

        if let Some(limit) = timeout {
            if let Err(RecvTimeoutError::Timeout) = self.done.recv_timeout(limit) {
                let abandoned = self
                    .phase
                    .compare_exchange(DRAINING, ABANDONED, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok();
                // Otherwise the worker finished the drain just past the deadline
                if abandoned {
                    return Err(IncompleteDrain::TimedOut {
                        waited: started.elapsed(),
                        pending: self.queue.len(),
                    });
                }
            }
        }

        self.worker
            .join()
            .map_err(|payload| IncompleteDrain::WorkerPanicked {
                message: panic_message(payload),
            })
    }
}

fn run(
    receiver: Receiver<Record>,
    mut router: Router,
    reporter: &ErrorReporter,
    phase: &AtomicU8,
    state: &AtomicU8,
) -> Router {
    while let Ok(record) = receiver.recv() {
        if phase.load(Ordering::Acquire) == ABANDONED {
            let abandoned = 1 + receiver.try_iter().count();
            reporter.metrics.record_abandoned(abandoned as u64);
            break;
        }

        let outcome = router.dispatch(&record);
        reporter.record_outcome(&outcome);

        if receiver.is_empty() {
            reporter.report_all(&router.flush_all());
        }
    }

    let finished = phase
        .compare_exchange(DRAINING, FINISHED, Ordering::AcqRel, Ordering::Acquire)
        .is_ok();

    // Nobody joins an abandoned worker, so it releases the sinks itself
    if !finished {
        drop(receiver);
        reporter.report_all(&router.flush_all());
        reporter.report_all(&router.close_all());
        state.store(LifecycleState::Stopped as u8, Ordering::Release);
    }

    router
}
