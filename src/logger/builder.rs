//! Builder for [`Logger`].

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::LoggerConfig;
use crate::error::ConfigError;
use crate::http_sender::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};
use crate::queue::{QueuePublisher, UnconfiguredQueuePublisher};
use crate::rate_limited_warner::RateLimitedWarner;

use super::Logger;
use super::route::Route;
use super::worker::{DEFAULT_CHANNEL_CAPACITY, spawn_worker};

/// Connect and request timeouts applied to every HTTP route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Timeouts {
    pub(crate) connect: Duration,
    pub(crate) request: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: DEFAULT_CONNECT_TIMEOUT,
            request: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Configures optional collaborators before the worker starts.
///
/// ```no_run
/// use filog::{LogLevel, Logger, LoggerConfig, TransportDescriptor};
///
/// let config = LoggerConfig::from(vec![TransportDescriptor::new(
///     "shop-web",
///     "https://collector.example/log",
///     LogLevel::Error,
/// )]);
/// let logger = Logger::builder(config)
///     .with_echo_writer(std::io::stdout())
///     .build()
///     .expect("valid configuration");
/// logger.error("checkout failed");
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    publisher: Arc<dyn QueuePublisher>,
    echo: Box<dyn Write + Send>,
    timeouts: Timeouts,
    capacity: usize,
}

impl LoggerBuilder {
    pub fn new(config: impl Into<LoggerConfig>) -> Self {
        Self {
            config: config.into(),
            publisher: Arc::new(UnconfiguredQueuePublisher),
            echo: Box::new(io::stderr()),
            timeouts: Timeouts::default(),
            capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Publisher used for `amqp://` and `amqps://` transports.
    #[must_use]
    pub fn with_queue_publisher(mut self, publisher: impl QueuePublisher + 'static) -> Self {
        self.publisher = Arc::new(publisher);
        self
    }

    /// Destination for verbose echoes. Defaults to stderr.
    #[must_use]
    pub fn with_echo_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.echo = Box::new(writer);
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connect = timeout;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.request = timeout;
        self
    }

    /// Maximum number of payloads awaiting dispatch. Values below one are
    /// raised to one.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Validate the configuration and start the dispatch worker.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::UnsupportedScheme`] for a transport URL that is neither
    ///   HTTP(S) nor AMQP(S).
    /// * [`ConfigError::Io`] when the worker thread cannot be spawned.
    pub fn build(self) -> Result<Logger, ConfigError> {
        self.config.validate()?;
        let (transports, defaults) = self.config.into_parts();
        let routes = transports
            .iter()
            .cloned()
            .map(|descriptor| Arc::new(Route::new(descriptor, self.timeouts)))
            .collect();
        let (tx, handle) = spawn_worker(Arc::clone(&self.publisher), self.capacity)?;

        Ok(Logger {
            transports,
            routes,
            defaults,
            publisher: self.publisher,
            echo: Mutex::new(self.echo),
            drop_warner: RateLimitedWarner::default(),
            tx: Some(tx),
            handle: Mutex::new(Some(handle)),
        })
    }
}
