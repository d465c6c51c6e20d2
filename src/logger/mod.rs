//! The client-facing [`Logger`].
//!
//! A logger owns an ordered list of transports. Each [`write`](Logger::write)
//! picks one transport for the payload's level, normalises the payload, and
//! hands it to a background worker that makes exactly one delivery attempt.
//! Failures are reported through the `log` facade and never returned to the
//! caller; use [`write_blocking`](Logger::write_blocking) to observe them.

mod builder;
mod convenience_methods;
mod route;
mod worker;

use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Sender;
use log::{error, warn};
// parking_lot avoids poisoning when an echo writer panics
use parking_lot::Mutex;

use crate::config::LoggerConfig;
use crate::error::{ConfigError, DispatchError};
use crate::hooks::SuppressReports;
use crate::normalise::{PayloadDefaults, normalise_payload};
use crate::payload::{ErrorLike, LogPayload, NormalisedPayload};
use crate::queue::QueuePublisher;
use crate::rate_limited_warner::RateLimitedWarner;
use crate::transport::{Delivery, TransportDescriptor, select_transport_index};

pub use builder::LoggerBuilder;
pub use convenience_methods::EventOptions;

use route::Route;
use worker::{DispatchCommand, Job};

const LOGGER_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Per-call switches for [`Logger::write`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Echo the normalised description to the logger's echo writer.
    pub verbose: bool,
    /// Error whose description replaces the payload's own.
    pub original_error: Option<ErrorLike>,
}

impl WriteOptions {
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub fn with_original_error(mut self, error: ErrorLike) -> Self {
        self.original_error = Some(error);
        self
    }
}

/// Routes payloads to remote collectors.
pub struct Logger {
    transports: Vec<TransportDescriptor>,
    routes: Vec<Arc<Route>>,
    defaults: PayloadDefaults,
    publisher: Arc<dyn QueuePublisher>,
    echo: Mutex<Box<dyn Write + Send>>,
    drop_warner: RateLimitedWarner,
    tx: Option<Sender<DispatchCommand>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Logger {
    /// Build a logger with default collaborators.
    ///
    /// No network I/O happens here.
    ///
    /// # Errors
    ///
    /// See [`LoggerBuilder::build`].
    pub fn new(config: impl Into<LoggerConfig>) -> Result<Self, ConfigError> {
        LoggerBuilder::new(config).build()
    }

    pub fn builder(config: impl Into<LoggerConfig>) -> LoggerBuilder {
        LoggerBuilder::new(config)
    }

    pub fn transports(&self) -> &[TransportDescriptor] {
        &self.transports
    }

    /// Dispatch `payload` without waiting for the outcome.
    ///
    /// When no transport accepts the level, the payload is dropped and an
    /// error is logged locally.
    pub fn write(&self, payload: LogPayload, options: WriteOptions) {
        let _suppress = SuppressReports::enter();
        let Ok((route, payload)) = self.prepare(payload, &options) else {
            return;
        };
        let Some(tx) = &self.tx else {
            self.drop_warner.record_drop();
            self.drop_warner.warn_if_due(|count| {
                warn!("filog: logger is closed; dropped {count} payloads");
            });
            return;
        };
        let _ = worker::enqueue(tx, Job { route, payload }, &self.drop_warner);
    }

    /// Dispatch `payload` on the calling thread and return the outcome.
    ///
    /// # Errors
    ///
    /// * [`DispatchError::NoTransport`] when no transport accepts the level.
    /// * Any error raised by the HTTP sender or queue publisher.
    pub fn write_blocking(
        &self,
        payload: LogPayload,
        options: WriteOptions,
    ) -> Result<Delivery, DispatchError> {
        let _suppress = SuppressReports::enter();
        let (route, payload) = self.prepare(payload, &options)?;
        route.deliver(&payload, self.publisher.as_ref())
    }

    /// Wait until every payload written so far has been attempted.
    ///
    /// Returns `false` if the worker does not acknowledge within two seconds
    /// or has already shut down.
    pub fn flush(&self) -> bool {
        match &self.tx {
            Some(tx) => worker::flush_queue(tx, LOGGER_FLUSH_TIMEOUT),
            None => false,
        }
    }

    /// Drain pending payloads and stop the worker. Later writes are dropped.
    pub fn close(&mut self) {
        let Some(tx) = self.tx.take() else {
            return;
        };
        if !worker::request_shutdown(&tx, LOGGER_FLUSH_TIMEOUT) {
            warn!("filog: dispatch worker did not acknowledge shutdown");
        }
        drop(tx);
        // Release the lock before joining.
        let handle = { self.handle.lock().take() };
        if let Some(handle) = handle
            && handle.join().is_err()
        {
            warn!("filog: dispatch worker panicked");
        }
        self.drop_warner.flush(|count| {
            warn!("filog: dropped {count} payloads before close");
        });
    }

    fn prepare(
        &self,
        payload: LogPayload,
        options: &WriteOptions,
    ) -> Result<(Arc<Route>, NormalisedPayload), DispatchError> {
        let level = payload.log_level;
        let Some(index) = select_transport_index(&self.transports, level) else {
            error!("filog: no transport configured for level {level}; payload dropped");
            return Err(DispatchError::NoTransport { level });
        };
        let normalised =
            normalise_payload(payload, &self.defaults, options.original_error.as_ref());
        if options.verbose {
            self.echo(&normalised);
        }
        Ok((Arc::clone(&self.routes[index]), normalised))
    }

    /// Echo failures, panics included, are logged and otherwise ignored.
    fn echo(&self, payload: &NormalisedPayload) {
        let line = format!(
            "[{}] {}\n",
            payload.log_level,
            payload.error_description.trim_end()
        );
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut echo = self.echo.lock();
            echo.write_all(line.as_bytes()).and_then(|()| echo.flush())
        }));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!("filog: failed to echo payload: {err}"),
            Err(_) => error!("filog: echo writer panicked"),
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("transports", &self.transports)
            .field("defaults", &self.defaults)
            .field("closed", &self.tx.is_none())
            .finish_non_exhaustive()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.close();
    }
}
