//! Background dispatch worker.
//!
//! Normalised payloads are queued by [`Logger::write`](super::Logger::write)
//! and delivered one at a time on a dedicated thread. Each job gets exactly one
//! attempt; failures are logged by the route and never reach the caller.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError, bounded};
use log::{debug, error, warn};

use crate::error::DispatchError;
use crate::hooks::SuppressReports;
use crate::payload::NormalisedPayload;
use crate::queue::QueuePublisher;
use crate::rate_limited_warner::RateLimitedWarner;

use super::route::Route;

/// Default capacity for the bounded channel feeding the worker thread.
pub(crate) const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// A payload bound to the route chosen for it.
pub(crate) struct Job {
    pub(crate) route: Arc<Route>,
    pub(crate) payload: NormalisedPayload,
}

pub(crate) enum DispatchCommand {
    Deliver(Job),
    Flush(Sender<()>),
    Shutdown(Sender<()>),
}

/// Spawn the worker thread and return its command channel.
pub(crate) fn spawn_worker(
    publisher: Arc<dyn QueuePublisher>,
    capacity: usize,
) -> io::Result<(Sender<DispatchCommand>, JoinHandle<()>)> {
    let (tx, rx) = bounded(capacity.max(1));
    let handle = thread::Builder::new()
        .name("filog-dispatch".into())
        .spawn(move || Worker { publisher }.run(rx))?;
    Ok((tx, handle))
}

struct Worker {
    publisher: Arc<dyn QueuePublisher>,
}

impl Worker {
    fn deliver(&self, job: Job) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            job.route.deliver(&job.payload, self.publisher.as_ref())
        }));
        match outcome {
            Ok(Ok(delivery)) => debug!("filog: {} settled as {delivery:?}", job.route.url()),
            Ok(Err(_)) => {}
            Err(_) => error!("filog: delivery to {} panicked", job.route.url()),
        }
    }

    fn drain_pending(&self, rx: &Receiver<DispatchCommand>) {
        loop {
            match rx.try_recv() {
                Ok(DispatchCommand::Deliver(job)) => self.deliver(job),
                Ok(DispatchCommand::Flush(ack) | DispatchCommand::Shutdown(ack)) => {
                    let _ = ack.send(());
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
    }

    fn run(self, rx: Receiver<DispatchCommand>) {
        // Panics caught in `deliver` must not feed back into the process hooks.
        let _suppress = SuppressReports::enter();
        loop {
            match rx.recv() {
                Ok(DispatchCommand::Deliver(job)) => self.deliver(job),
                Ok(DispatchCommand::Flush(ack)) => {
                    let _ = ack.send(());
                }
                Ok(DispatchCommand::Shutdown(ack)) => {
                    self.drain_pending(&rx);
                    let _ = ack.send(());
                    break;
                }
                Err(_) => {
                    self.drain_pending(&rx);
                    break;
                }
            }
        }
    }
}

/// Queue `job` without blocking.
///
/// # Errors
///
/// * [`DispatchError::QueueFull`] when the channel is at capacity.
/// * [`DispatchError::Closed`] when the worker has stopped.
///
/// Either way the payload is dropped and a rate-limited warning logged.
pub(crate) fn enqueue(
    tx: &Sender<DispatchCommand>,
    job: Job,
    warner: &RateLimitedWarner,
) -> Result<(), DispatchError> {
    match tx.try_send(DispatchCommand::Deliver(job)) {
        Ok(()) => Ok(()),
        Err(TrySendError::Full(_)) => {
            warner.record_drop();
            warner.warn_if_due(|count| {
                warn!("filog: dispatch queue full; dropped {count} payloads");
            });
            Err(DispatchError::QueueFull)
        }
        Err(TrySendError::Disconnected(_)) => {
            warner.record_drop();
            warner.warn_if_due(|count| {
                warn!("filog: dispatch worker stopped; dropped {count} payloads");
            });
            Err(DispatchError::Closed)
        }
    }
}

fn round_trip(
    tx: &Sender<DispatchCommand>,
    command: impl FnOnce(Sender<()>) -> DispatchCommand,
    timeout: Duration,
) -> bool {
    let deadline = Instant::now() + timeout;
    let (ack_tx, ack_rx) = bounded(1);
    if tx.send_timeout(command(ack_tx), timeout).is_err() {
        return false;
    }
    let remaining = deadline.saturating_duration_since(Instant::now());
    ack_rx.recv_timeout(remaining).is_ok()
}

/// Wait until every job queued before this call has been attempted.
///
/// Returns `false` when the acknowledgement does not arrive within `timeout`.
pub(crate) fn flush_queue(tx: &Sender<DispatchCommand>, timeout: Duration) -> bool {
    round_trip(tx, DispatchCommand::Flush, timeout)
}

/// Ask the worker to drain its queue and exit.
pub(crate) fn request_shutdown(tx: &Sender<DispatchCommand>, timeout: Duration) -> bool {
    round_trip(tx, DispatchCommand::Shutdown, timeout)
}
