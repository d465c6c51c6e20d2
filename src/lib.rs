//! Client-side error reporting.
//!
//! A [`Logger`] routes structured log payloads to remote collectors. Each
//! payload is matched to one configured transport by level, normalised into a
//! wire-safe shape, and delivered in the background either by HTTP POST or
//! through a host-supplied [`QueuePublisher`].

pub mod config;
mod error;
pub mod frame_filter;
pub mod hooks;
pub mod http_sender;
mod level;
mod logger;
pub mod normalise;
mod payload;
mod queue;
mod rate_limited_warner;
pub mod stack_parser;
mod transport;

pub use config::{ExtendedConfig, LoggerConfig, LoggerConfigBuilder};
pub use error::{ConfigError, DispatchError, RemoteError};
pub use hooks::{ErrorHook, ErrorHookRegistry, ProcessHooks, report_unhandled_rejection};
pub use http_sender::{HttpSender, HttpSenderConfig};
pub use level::{LogLevel, LogType, ParseLevelError};
pub use logger::{EventOptions, Logger, LoggerBuilder, WriteOptions};
pub use payload::{
    ErrorDescription, ErrorLike, LogPayload, NormalisedPayload, Source, new_log_ticket,
};
pub use queue::{QueuePublisher, UnconfiguredQueuePublisher};
pub use transport::{
    AuthScheme, CLIENT_ID_HEADER, Delivery, DestinationScheme, TransportDescriptor,
    select_transport,
};

#[cfg(test)]
mod test_utils;
