//! Level-named shorthands over [`Logger::write`].
//!
//! Each method fixes the payload level and derives the event code from the
//! error's name when none is given. Without a custom payload a fresh ticket
//! is generated per call.

use crate::level::LogLevel;
use crate::payload::{ErrorDescription, LogPayload, new_log_ticket};

use super::{Logger, WriteOptions};

/// Optional extras for [`Logger::log_event`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventOptions {
    /// Overrides the event code derived from the error name.
    pub event_code: Option<String>,
    /// Base payload supplying ticket, environment or source.
    pub payload: Option<LogPayload>,
    /// Echo the description locally.
    pub print_out: bool,
}

impl EventOptions {
    #[must_use]
    pub fn with_event_code(mut self, code: impl Into<String>) -> Self {
        self.event_code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: LogPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    #[must_use]
    pub fn print_out(mut self, print_out: bool) -> Self {
        self.print_out = print_out;
        self
    }
}

/// Assemble the payload written by [`Logger::log_event`].
///
/// The description always comes from the call. A custom payload's event
/// code wins over `options.event_code`, which wins over the error name.
pub(crate) fn event_payload(
    level: LogLevel,
    description: ErrorDescription,
    options: &mut EventOptions,
) -> LogPayload {
    let mut payload = options
        .payload
        .take()
        .unwrap_or_else(|| LogPayload::default().with_ticket(new_log_ticket()));
    let derived_code = description.error_name().map(str::to_owned);
    payload.log_level = level;
    payload.event_code = payload
        .event_code
        .or_else(|| options.event_code.take())
        .or(derived_code);
    payload.error_description = description;
    payload
}

impl Logger {
    pub fn debug(&self, description: impl Into<ErrorDescription>) {
        self.log_event(LogLevel::Debug, description, EventOptions::default());
    }

    pub fn info(&self, description: impl Into<ErrorDescription>) {
        self.log_event(LogLevel::Info, description, EventOptions::default());
    }

    pub fn warning(&self, description: impl Into<ErrorDescription>) {
        self.log_event(LogLevel::Warning, description, EventOptions::default());
    }

    /// Report an error or message at `ERROR`.
    ///
    /// ```no_run
    /// # use filog::{ErrorLike, LogLevel, Logger, TransportDescriptor};
    /// # let logger = Logger::new(vec![TransportDescriptor::new(
    /// #     "c", "https://collector.example/log", LogLevel::Error,
    /// # )]).unwrap();
    /// logger.error(ErrorLike::new("TypeError", "x is undefined"));
    /// ```
    pub fn error(&self, description: impl Into<ErrorDescription>) {
        self.log_event(LogLevel::Error, description, EventOptions::default());
    }

    /// Write `description` at `level` with the given extras.
    pub fn log_event(
        &self,
        level: LogLevel,
        description: impl Into<ErrorDescription>,
        mut options: EventOptions,
    ) {
        let payload = event_payload(level, description.into(), &mut options);
        self.write(payload, WriteOptions::default().verbose(options.print_out));
    }
}
