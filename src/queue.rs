//! Message-queue delivery boundary.
//!
//! Publishing to AMQP brokers is left to the host application: it supplies a
//! [`QueuePublisher`] when building the [`Logger`](crate::Logger). Without
//! one, payloads routed to `amqp://` or `amqps://` destinations are reported
//! as undeliverable.

use log::warn;

use crate::error::DispatchError;
use crate::payload::NormalisedPayload;

/// Publishes a payload to a queue endpoint.
///
/// Implementations are shared with the dispatch worker, hence `Send + Sync`.
/// A successful return means the publish was attempted; no acknowledgement
/// contract beyond that is implied.
pub trait QueuePublisher: Send + Sync {
    fn publish(&self, url: &str, payload: &NormalisedPayload) -> Result<(), DispatchError>;
}

impl<F> QueuePublisher for F
where
    F: Fn(&str, &NormalisedPayload) -> Result<(), DispatchError> + Send + Sync,
{
    fn publish(&self, url: &str, payload: &NormalisedPayload) -> Result<(), DispatchError> {
        self(url, payload)
    }
}

/// Default publisher used when the host registers none.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnconfiguredQueuePublisher;

impl QueuePublisher for UnconfiguredQueuePublisher {
    fn publish(&self, url: &str, _payload: &NormalisedPayload) -> Result<(), DispatchError> {
        warn!("filog: no queue publisher configured; dropping payload for {url}");
        Err(DispatchError::Queue(format!(
            "no queue publisher configured for {url}"
        )))
    }
}
