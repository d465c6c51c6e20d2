//! A queue publisher that accumulates payloads in memory for assertions.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::DispatchError;
use crate::payload::NormalisedPayload;
use crate::queue::QueuePublisher;

/// Publisher that stores every `(url, payload)` it receives.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    published: Arc<Mutex<Vec<(String, NormalisedPayload)>>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far.
    pub fn published(&self) -> Vec<(String, NormalisedPayload)> {
        self.published.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.published.lock().len()
    }
}

impl QueuePublisher for RecordingPublisher {
    fn publish(&self, url: &str, payload: &NormalisedPayload) -> Result<(), DispatchError> {
        self.published.lock().push((url.to_owned(), payload.clone()));
        Ok(())
    }
}
