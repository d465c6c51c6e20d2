//! Payload types exchanged between callers, the logger and the transports.
//!
//! [`LogPayload`] is what callers hand to the logger. Its description may still
//! hold an [`ErrorLike`] value. Transports only ever see a
//! [`NormalisedPayload`], whose description is a plain string, so a live error
//! value cannot reach the wire.

use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::level::LogLevel;

/// Application identity attached to every payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub app_name: String,
    pub app_version: String,
    pub package_name: String,
}

impl Source {
    pub fn new(
        app_name: impl Into<String>,
        app_version: impl Into<String>,
        package_name: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            app_version: app_version.into(),
            package_name: package_name.into(),
        }
    }
}

/// Structured error value carrying a name, a message and an optional textual
/// stack trace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLike {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorLike {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Capture a Rust error together with the current backtrace.
    ///
    /// The name is the unqualified type name of `E`. The message joins the
    /// error and its `source()` chain with `": "`.
    pub fn from_error<E: StdError + ?Sized>(err: &E) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self {
            name: short_type_name(std::any::type_name::<E>()).to_owned(),
            message,
            stack: Some(Backtrace::force_capture().to_string()),
        }
    }
}

impl fmt::Display for ErrorLike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

/// Reduce `core::num::ParseIntError` or `dyn core::error::Error` to its last
/// path segment, ignoring generic arguments.
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).trim()
}

/// Description carried by a payload: free text or a structured error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDescription {
    Text(String),
    Error(ErrorLike),
}

impl ErrorDescription {
    /// Name of the wrapped error, if the description is structured.
    pub fn error_name(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Error(err) => Some(err.name.as_str()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }
}

impl Default for ErrorDescription {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for ErrorDescription {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ErrorDescription {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<ErrorLike> for ErrorDescription {
    fn from(value: ErrorLike) -> Self {
        Self::Error(value)
    }
}

/// Generate a fresh log ticket.
pub fn new_log_ticket() -> String {
    Uuid::new_v4().to_string()
}

/// Payload handed to [`Logger::write`](crate::Logger::write).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPayload {
    pub log_level: LogLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_ticket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(default)]
    pub error_description: ErrorDescription,
}

impl LogPayload {
    pub fn new(level: LogLevel, description: impl Into<ErrorDescription>) -> Self {
        Self {
            log_level: level,
            error_description: description.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_ticket(mut self, ticket: impl Into<String>) -> Self {
        self.log_ticket = Some(ticket.into());
        self
    }

    #[must_use]
    pub fn with_event_code(mut self, code: impl Into<String>) -> Self {
        self.event_code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }
}

/// Wire form of a payload. The description is always a string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalisedPayload {
    pub log_level: LogLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_ticket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    pub error_description: String,
}

impl NormalisedPayload {
    /// Serialise to the JSON request body.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
