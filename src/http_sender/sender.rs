//! Blocking HTTP POST of a single payload.

use std::error::Error as StdError;
use std::io;
use std::sync::Arc;

use log::{debug, error, warn};
use native_tls::TlsConnector;
use serde::Serialize;
use ureq::{Agent, AgentBuilder};

use crate::error::{DispatchError, RemoteError};
use crate::transport::{AuthScheme, Delivery};

use super::config::{HttpSenderConfig, USER_AGENT};
use super::response::{error_from_status, errors_in_success, is_graphql_request};

/// Sends payloads to one URL with one credential.
///
/// Every failure is logged through the `log` facade before being returned, so
/// callers that ignore the result still leave a local trace.
pub struct HttpSender {
    config: HttpSenderConfig,
    agent: Agent,
}

impl HttpSender {
    /// Bind `url` and `auth` using default timeouts.
    pub fn new(url: impl Into<String>, auth: AuthScheme) -> Self {
        Self::with_config(HttpSenderConfig::new(url, auth))
    }

    pub fn with_config(config: HttpSenderConfig) -> Self {
        let agent = build_agent(&config);
        Self { config, agent }
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// POST `payload` as JSON and return the response status as a [`Delivery`].
    ///
    /// # Errors
    ///
    /// * [`DispatchError::Serialization`] when `payload` cannot be encoded.
    /// * [`DispatchError::Connectivity`] when the destination is unreachable.
    /// * [`DispatchError::Remote`] when the destination reports an error,
    ///   either through a non-2xx status or a GraphQL `errors` array.
    pub fn send<T: Serialize + ?Sized>(&self, payload: &T) -> Result<Delivery, DispatchError> {
        let body = serde_json::to_value(payload).map_err(|err| {
            error!("filog: failed to serialise payload for {}: {err}", self.config.url);
            DispatchError::Serialization(err.to_string())
        })?;
        let graphql = is_graphql_request(&body);

        let (auth_name, auth_value) = self.config.auth.header();
        let result = self
            .agent
            .post(&self.config.url)
            .set("content-type", "application/json")
            .set("accept", "application/json")
            .set("user-agent", USER_AGENT)
            .set(&auth_name, &auth_value)
            .send_string(&body.to_string());

        match result {
            Ok(response) => {
                let status = response.status();
                let text = response.into_string().unwrap_or_default();
                match errors_in_success(&text) {
                    Some(remote) => Err(self.report_remote(remote, graphql)),
                    None => {
                        debug!("filog: delivered payload to {} ({status})", self.config.url);
                        Ok(Delivery::Http { status })
                    }
                }
            }
            Err(ureq::Error::Status(status, response)) => {
                let text = response.into_string().unwrap_or_default();
                Err(self.report_remote(error_from_status(status, &text), graphql))
            }
            Err(ureq::Error::Transport(transport)) => Err(self.report_transport(&transport)),
        }
    }

    fn report_remote(&self, remote: RemoteError, graphql: bool) -> DispatchError {
        let kind = if graphql { "GraphQL request" } else { "request" };
        error!("filog: {kind} to {} failed: {remote}", self.config.url);
        if let Some(details) = &remote.details {
            debug!("filog: error details: {details}");
        }
        DispatchError::Remote(remote)
    }

    fn report_transport(&self, transport: &ureq::Transport) -> DispatchError {
        let reason = if is_connection_refused(transport) {
            error!(
                "filog: unable to reach {}: connection refused",
                self.config.url
            );
            "connection refused".to_owned()
        } else {
            error!("filog: unable to reach {}: {transport}", self.config.url);
            transport.to_string()
        };
        DispatchError::Connectivity {
            url: self.config.url.clone(),
            reason,
        }
    }
}

impl std::fmt::Debug for HttpSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSender")
            .field("url", &self.config.url)
            .field("connect_timeout", &self.config.connect_timeout)
            .field("request_timeout", &self.config.request_timeout)
            .finish()
    }
}

fn build_agent(config: &HttpSenderConfig) -> Agent {
    let mut builder = AgentBuilder::new()
        .timeout_connect(config.connect_timeout)
        .timeout(config.request_timeout);
    match TlsConnector::new() {
        Ok(connector) => builder = builder.tls_connector(Arc::new(connector)),
        Err(err) => warn!("filog: native TLS unavailable, using default connector: {err}"),
    }
    builder.build()
}

/// Walk the error chain looking for an I/O `ConnectionRefused`.
fn is_connection_refused(transport: &ureq::Transport) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = transport.source();
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>()
            && io_err.kind() == io::ErrorKind::ConnectionRefused
        {
            return true;
        }
        source = err.source();
    }
    transport.kind() == ureq::ErrorKind::ConnectionFailed
        && transport.to_string().to_ascii_lowercase().contains("refused")
}
