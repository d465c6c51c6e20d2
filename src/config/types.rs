//! Logger configuration shapes and their builder.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::normalise::PayloadDefaults;
use crate::payload::Source;
use crate::transport::{DestinationScheme, TransportDescriptor};

/// Transports plus optional payload defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    pub transports: Vec<TransportDescriptor>,
}

/// Configuration accepted by [`Logger::new`](crate::Logger::new).
///
/// The minimal form is a bare list of transports. The extended form adds a
/// `source` and `environment` that are copied into payloads lacking them.
/// Both deserialise from JSON: an array selects the minimal form, an object
/// the extended one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoggerConfig {
    Minimal(Vec<TransportDescriptor>),
    Extended(ExtendedConfig),
}

impl LoggerConfig {
    pub fn builder() -> LoggerConfigBuilder {
        LoggerConfigBuilder::default()
    }

    /// Transports in configuration order.
    pub fn transports(&self) -> &[TransportDescriptor] {
        match self {
            Self::Minimal(transports) => transports,
            Self::Extended(extended) => &extended.transports,
        }
    }

    /// Defaults backfilled into payloads. Empty for the minimal form.
    pub fn defaults(&self) -> PayloadDefaults {
        match self {
            Self::Minimal(_) => PayloadDefaults::default(),
            Self::Extended(extended) => PayloadDefaults {
                source: extended.source.clone(),
                environment: extended.environment.clone(),
            },
        }
    }

    /// Reject transports whose URL is neither HTTP(S) nor AMQP(S).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedScheme`] naming the first offending
    /// transport.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self
            .transports()
            .iter()
            .find(|t| t.scheme() == DestinationScheme::Unsupported)
        {
            Some(bad) => Err(ConfigError::UnsupportedScheme {
                client_id: bad.client_id.clone(),
                url: bad.url.clone(),
            }),
            None => Ok(()),
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<TransportDescriptor>, PayloadDefaults) {
        let defaults = self.defaults();
        let transports = match self {
            Self::Minimal(transports) => transports,
            Self::Extended(extended) => extended.transports,
        };
        (transports, defaults)
    }
}

impl From<Vec<TransportDescriptor>> for LoggerConfig {
    fn from(transports: Vec<TransportDescriptor>) -> Self {
        Self::Minimal(transports)
    }
}

impl From<ExtendedConfig> for LoggerConfig {
    fn from(extended: ExtendedConfig) -> Self {
        Self::Extended(extended)
    }
}

/// Builder for the extended configuration form.
#[derive(Clone, Debug, Default)]
pub struct LoggerConfigBuilder {
    source: Option<Source>,
    environment: Option<String>,
    transports: Vec<TransportDescriptor>,
}

impl LoggerConfigBuilder {
    #[must_use]
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Append a transport. Order decides selection precedence.
    #[must_use]
    pub fn with_transport(mut self, transport: TransportDescriptor) -> Self {
        self.transports.push(transport);
        self
    }

    /// Assemble and validate the configuration.
    ///
    /// # Errors
    ///
    /// See [`LoggerConfig::validate`].
    pub fn build(self) -> Result<LoggerConfig, ConfigError> {
        let config = LoggerConfig::Extended(ExtendedConfig {
            source: self.source,
            environment: self.environment,
            transports: self.transports,
        });
        config.validate()?;
        Ok(config)
    }
}
