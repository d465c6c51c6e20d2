//! Transport descriptors, credentials and level-based selection.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use serde::{Deserialize, Serialize};

use crate::level::{LogLevel, LogType};

/// Header carrying the client identity when no explicit credential is set.
pub const CLIENT_ID_HEADER: &str = "client-id";

/// Credential injected into every request sent to a transport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthScheme {
    /// Arbitrary `<name>: <value>` header.
    ApiKey { name: String, value: String },
    /// `Authorization: <value>`, sent verbatim.
    BasicAuth { value: String },
    /// `Cookie: <name>=<value>`.
    Cookie { name: String, value: String },
}

impl AuthScheme {
    /// The minimal credential: a single `client-id` header.
    pub fn client_id(id: impl Into<String>) -> Self {
        Self::ApiKey {
            name: CLIENT_ID_HEADER.to_owned(),
            value: id.into(),
        }
    }

    /// HTTP Basic credentials encoded as `Basic <base64(user:password)>`.
    pub fn basic(username: &str, password: &str) -> Self {
        let encoded = BASE64_STANDARD.encode(format!("{username}:{password}"));
        Self::BasicAuth {
            value: format!("Basic {encoded}"),
        }
    }

    /// Header name and value to attach to a request.
    pub fn header(&self) -> (String, String) {
        match self {
            Self::ApiKey { name, value } => (name.clone(), value.clone()),
            Self::BasicAuth { value } => ("Authorization".to_owned(), value.clone()),
            Self::Cookie { name, value } => ("Cookie".to_owned(), format!("{name}={value}")),
        }
    }
}

/// Delivery mechanism implied by a destination URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DestinationScheme {
    /// `http://` or `https://`.
    Http,
    /// `amqp://` or `amqps://`.
    Amqp,
    /// Anything else; nothing is dispatched.
    Unsupported,
}

impl DestinationScheme {
    /// Classify `url` by its scheme prefix.
    pub fn of(url: &str) -> Self {
        let lower = url.trim_start().to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Http
        } else if lower.starts_with("amqp://") || lower.starts_with("amqps://") {
            Self::Amqp
        } else {
            Self::Unsupported
        }
    }
}

/// One configured destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportDescriptor {
    pub client_id: String,
    pub url: String,
    #[serde(rename = "logType")]
    pub log_type: LogType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthScheme>,
}

impl TransportDescriptor {
    pub fn new(
        client_id: impl Into<String>,
        url: impl Into<String>,
        log_type: impl Into<LogType>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            url: url.into(),
            log_type: log_type.into(),
            auth: None,
        }
    }

    #[must_use]
    pub fn with_auth(mut self, auth: AuthScheme) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Credential used for this destination, falling back to the client id.
    pub fn auth_scheme(&self) -> AuthScheme {
        self.auth
            .clone()
            .unwrap_or_else(|| AuthScheme::client_id(&self.client_id))
    }

    pub fn scheme(&self) -> DestinationScheme {
        DestinationScheme::of(&self.url)
    }
}

/// Pick the transport for `level`.
///
/// The first transport tagged with exactly `level` wins. Without one, the
/// first `ANY` transport is used. Later matches are never consulted.
pub fn select_transport(
    transports: &[TransportDescriptor],
    level: LogLevel,
) -> Option<&TransportDescriptor> {
    select_transport_index(transports, level).map(|index| &transports[index])
}

/// Position of the transport [`select_transport`] would pick.
pub fn select_transport_index(
    transports: &[TransportDescriptor],
    level: LogLevel,
) -> Option<usize> {
    transports
        .iter()
        .position(|t| t.log_type.is_exactly(level))
        .or_else(|| transports.iter().position(|t| t.log_type.is_any()))
}

/// Outcome of a settled dispatch attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// The HTTP destination answered with a 2xx `status`.
    Http { status: u16 },
    /// The queue publisher accepted the payload.
    Queue,
}
