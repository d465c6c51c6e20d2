//! Configuration consumed by [`HttpSender`](super::HttpSender).

use std::time::Duration;

use crate::transport::AuthScheme;

/// Default timeout for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default timeout for the whole request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// `user-agent` header sent with every request.
pub const USER_AGENT: &str = concat!("filog-client/", env!("CARGO_PKG_VERSION"));

/// Destination, credential and timeouts for one sender.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpSenderConfig {
    /// Target URL for the POST.
    pub url: String,
    /// Credential injected as a header or cookie.
    pub auth: AuthScheme,
    /// Timeout for establishing connections.
    pub connect_timeout: Duration,
    /// Timeout for the complete request.
    pub request_timeout: Duration,
}

impl HttpSenderConfig {
    pub fn new(url: impl Into<String>, auth: AuthScheme) -> Self {
        Self {
            url: url.into(),
            auth,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
