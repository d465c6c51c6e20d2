//! Resolved delivery target for one transport.

use log::error;

use crate::error::DispatchError;
use crate::http_sender::{HttpSender, HttpSenderConfig};
use crate::payload::NormalisedPayload;
use crate::queue::QueuePublisher;
use crate::transport::{Delivery, DestinationScheme, TransportDescriptor};

use super::builder::Timeouts;

enum Sink {
    Http(HttpSender),
    Queue,
    Unsupported,
}

/// A transport paired with the mechanism its URL scheme selects.
pub(crate) struct Route {
    descriptor: TransportDescriptor,
    sink: Sink,
}

impl Route {
    pub(crate) fn new(descriptor: TransportDescriptor, timeouts: Timeouts) -> Self {
        let sink = match descriptor.scheme() {
            DestinationScheme::Http => {
                let config = HttpSenderConfig::new(descriptor.url.clone(), descriptor.auth_scheme())
                    .with_connect_timeout(timeouts.connect)
                    .with_request_timeout(timeouts.request);
                Sink::Http(HttpSender::with_config(config))
            }
            DestinationScheme::Amqp => Sink::Queue,
            DestinationScheme::Unsupported => Sink::Unsupported,
        };
        Self { descriptor, sink }
    }

    pub(crate) fn url(&self) -> &str {
        &self.descriptor.url
    }

    /// Make exactly one delivery attempt.
    pub(crate) fn deliver(
        &self,
        payload: &NormalisedPayload,
        publisher: &dyn QueuePublisher,
    ) -> Result<Delivery, DispatchError> {
        match &self.sink {
            Sink::Http(sender) => sender.send(payload),
            Sink::Queue => publisher
                .publish(self.url(), payload)
                .map(|()| Delivery::Queue)
                .inspect_err(|err| error!("filog: queue publish to {} failed: {err}", self.url())),
            Sink::Unsupported => {
                error!("filog: no delivery mechanism for {}", self.url());
                Err(DispatchError::UnsupportedScheme {
                    url: self.url().to_owned(),
                })
            }
        }
    }
}
