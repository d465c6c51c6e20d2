//! Loading [`LoggerConfig`] from JSON and INI sources.
//!
//! INI layout:
//!
//! ```ini
//! [logger]
//! environment = production
//! app_name = shop
//! app_version = 1.2.0
//! package_name = shop-web
//!
//! [transport.errors]
//! client_id = shop-errors
//! url = https://collector.example/errors
//! log_type = ERROR
//! auth = cookie
//! auth_name = session
//! auth_value = abc123
//! ```
//!
//! Transport sections are taken in file order. The `[logger]` section is
//! optional; without it the minimal configuration form is produced.

use std::fs;
use std::path::Path;

use ini::{Ini, Properties};

use crate::error::ConfigError;
use crate::level::LogType;
use crate::payload::Source;
use crate::transport::{AuthScheme, TransportDescriptor};

use super::types::{ExtendedConfig, LoggerConfig};

const LOGGER_SECTION: &str = "logger";
const TRANSPORT_PREFIX: &str = "transport.";

impl LoggerConfig {
    /// Parse a JSON document: an array of transports or an object with
    /// `source`, `environment` and `transports`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed documents and
    /// [`ConfigError::UnsupportedScheme`] for unusable URLs.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = read_config(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Parse an INI document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Ini`] when the text cannot be parsed,
    /// [`ConfigError::MissingKey`] when a transport lacks a required key, and
    /// the log type, auth and scheme errors raised while building
    /// descriptors.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|err| ConfigError::Ini(err.to_string()))?;
        let config = config_from_ini(&ini)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_ini_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = read_config(path.as_ref())?;
        Self::from_ini_str(&text)
    }
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Err(ConfigError::Ini(format!("{} is an empty file", path.display())));
    }
    Ok(text)
}

fn config_from_ini(ini: &Ini) -> Result<LoggerConfig, ConfigError> {
    let mut transports = Vec::new();
    let mut logger_section = None;
    for (section, props) in ini.iter() {
        match section {
            Some(LOGGER_SECTION) => logger_section = Some(props),
            Some(name) if name.starts_with(TRANSPORT_PREFIX) => {
                transports.push(transport_from_section(name, props)?);
            }
            _ => {}
        }
    }

    Ok(match logger_section {
        Some(props) => LoggerConfig::Extended(ExtendedConfig {
            source: source_from_section(props),
            environment: props.get("environment").map(str::to_owned),
            transports,
        }),
        None => LoggerConfig::Minimal(transports),
    })
}

fn source_from_section(props: &Properties) -> Option<Source> {
    let keys = ["app_name", "app_version", "package_name"];
    if keys.iter().all(|key| props.get(key).is_none()) {
        return None;
    }
    let value = |key: &str| props.get(key).unwrap_or_default().to_owned();
    Some(Source::new(
        value("app_name"),
        value("app_version"),
        value("package_name"),
    ))
}

fn require<'a>(section: &str, props: &'a Properties, key: &str) -> Result<&'a str, ConfigError> {
    props.get(key).ok_or_else(|| ConfigError::MissingKey {
        section: section.to_owned(),
        key: key.to_owned(),
    })
}

fn transport_from_section(
    section: &str,
    props: &Properties,
) -> Result<TransportDescriptor, ConfigError> {
    let client_id = require(section, props, "client_id")?;
    let url = require(section, props, "url")?;
    let log_type_text = require(section, props, "log_type")?;
    let log_type: LogType = log_type_text
        .parse()
        .map_err(|_| ConfigError::InvalidLogType(log_type_text.to_owned()))?;

    let descriptor = TransportDescriptor::new(client_id, url, log_type);
    match auth_from_section(section, props)? {
        Some(auth) => Ok(descriptor.with_auth(auth)),
        None => Ok(descriptor),
    }
}

fn auth_from_section(section: &str, props: &Properties) -> Result<Option<AuthScheme>, ConfigError> {
    let Some(kind) = props.get("auth") else {
        return Ok(None);
    };
    let auth = match kind.trim().to_ascii_lowercase().as_str() {
        "api_key" => AuthScheme::ApiKey {
            name: require(section, props, "auth_name")?.to_owned(),
            value: require(section, props, "auth_value")?.to_owned(),
        },
        "cookie" => AuthScheme::Cookie {
            name: require(section, props, "auth_name")?.to_owned(),
            value: require(section, props, "auth_value")?.to_owned(),
        },
        "basic" => match props.get("auth_value") {
            Some(value) => AuthScheme::BasicAuth {
                value: value.to_owned(),
            },
            None => AuthScheme::basic(
                require(section, props, "auth_username")?,
                require(section, props, "auth_password")?,
            ),
        },
        _ => return Err(ConfigError::InvalidAuth(kind.to_owned())),
    };
    Ok(Some(auth))
}
