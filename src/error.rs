//! Error types for dispatch and configuration.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::level::LogLevel;

/// Sanitised application-level error returned by a destination.
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteError {
    /// HTTP status, when the error arrived with a non-2xx response.
    pub status: Option<u16>,
    pub message: String,
    /// `extensions.code` of the first GraphQL error, if any.
    pub code: Option<String>,
    /// First error object with `locations` and `extensions.stacktrace`
    /// removed.
    pub details: Option<serde_json::Value>,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(status) = self.status {
            write!(f, "status {status}: ")?;
        }
        f.write_str(&self.message)?;
        if let Some(code) = &self.code {
            write!(f, " ({code})")?;
        }
        Ok(())
    }
}

/// Outcome of a failed dispatch attempt.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No transport accepts the level and no `ANY` fallback exists.
    #[error("no transport configured for level {level}")]
    NoTransport { level: LogLevel },
    /// The destination URL is neither HTTP(S) nor AMQP(S).
    #[error("unsupported destination scheme: {url}")]
    UnsupportedScheme { url: String },
    /// The destination could not be reached.
    #[error("could not connect to {url}: {reason}")]
    Connectivity { url: String, reason: String },
    /// The destination answered with an error body.
    #[error("remote error: {0}")]
    Remote(RemoteError),
    /// The payload could not be encoded.
    #[error("failed to serialise payload: {0}")]
    Serialization(String),
    /// The queue publisher rejected the payload.
    #[error("queue publish failed: {0}")]
    Queue(String),
    /// The dispatch worker has shut down.
    #[error("logger is closed")]
    Closed,
    /// The dispatch queue is full.
    #[error("dispatch queue is full")]
    QueueFull,
}

/// Errors raised while building or loading a logger configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A transport URL is neither HTTP(S) nor AMQP(S).
    #[error("transport {client_id:?} has unsupported url {url:?}")]
    UnsupportedScheme { client_id: String, url: String },
    /// A log type string is not a level or `ANY`.
    #[error("invalid log type {0:?}")]
    InvalidLogType(String),
    /// An auth kind is not `api_key`, `basic` or `cookie`.
    #[error("invalid auth kind {0:?}")]
    InvalidAuth(String),
    /// A required key is absent from a configuration section.
    #[error("section [{section}] is missing key {key:?}")]
    MissingKey { section: String, key: String },
    #[error("failed to read configuration: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid INI configuration: {0}")]
    Ini(String),
}
