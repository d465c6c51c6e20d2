//! Unit tests for configuration forms and loaders.

use std::io::Write as _;

use rstest::{fixture, rstest};
use tempfile::NamedTempFile;

use super::*;
use crate::error::ConfigError;
use crate::level::{LogLevel, LogType};
use crate::payload::Source;
use crate::transport::{AuthScheme, TransportDescriptor};

const EXTENDED_INI: &str = "\
[logger]
environment = production
app_name = shop
app_version = 1.2.0
package_name = shop-web

[transport.errors]
client_id = shop-errors
url = https://collector.example/errors
log_type = ERROR
auth = cookie
auth_name = session
auth_value = abc123

[transport.fallback]
client_id = shop-any
url = amqp://broker.example/logs
log_type = any
";

#[fixture]
fn extended_json() -> String {
    serde_json::json!({
        "source": {"app_name": "shop", "app_version": "1.2.0", "package_name": "shop-web"},
        "environment": "production",
        "transports": [
            {
                "client_id": "shop-errors",
                "url": "https://collector.example/errors",
                "logType": "ERROR",
                "auth": {"kind": "cookie", "name": "session", "value": "abc123"}
            },
            {"client_id": "shop-any", "url": "amqp://broker.example/logs", "logType": "any"}
        ]
    })
    .to_string()
}

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

#[rstest]
fn json_array_is_minimal_form() {
    let text = r#"[{"client_id":"a","url":"https://e/log","logType":"WARNING"}]"#;
    let config = LoggerConfig::from_json_str(text).expect("valid config");
    assert_eq!(
        config,
        LoggerConfig::Minimal(vec![TransportDescriptor::new(
            "a",
            "https://e/log",
            LogLevel::Warning
        )])
    );
    assert_eq!(config.defaults().environment, None);
}

#[rstest]
fn json_object_is_extended_form(extended_json: String) {
    let config = LoggerConfig::from_json_str(&extended_json).expect("valid config");
    let LoggerConfig::Extended(extended) = &config else {
        panic!("expected extended form, got {config:?}");
    };
    assert_eq!(extended.environment.as_deref(), Some("production"));
    assert_eq!(extended.transports.len(), 2);
    assert_eq!(
        extended.transports[0].auth_scheme(),
        AuthScheme::Cookie {
            name: "session".into(),
            value: "abc123".into()
        }
    );
    assert_eq!(extended.transports[1].log_type, LogType::Any);
}

#[rstest]
fn ini_and_json_load_the_same_config(extended_json: String) {
    let from_ini = LoggerConfig::from_ini_str(EXTENDED_INI).expect("valid ini");
    let from_json = LoggerConfig::from_json_str(&extended_json).expect("valid json");
    assert_eq!(from_ini, from_json);
}

#[rstest]
fn ini_without_logger_section_is_minimal() {
    let text = "[transport.only]\nclient_id = c\nurl = http://h/log\nlog_type = DEBUG\n";
    let config = LoggerConfig::from_ini_str(text).expect("valid ini");
    assert!(matches!(config, LoggerConfig::Minimal(ref t) if t.len() == 1));
}

#[rstest]
fn ini_transports_keep_file_order() {
    let text = "\
[transport.b]
client_id = second
url = http://h/b
log_type = any

[transport.a]
client_id = first
url = http://h/a
log_type = any
";
    let config = LoggerConfig::from_ini_str(text).expect("valid ini");
    let ids: Vec<_> = config
        .transports()
        .iter()
        .map(|t| t.client_id.as_str())
        .collect();
    assert_eq!(ids, ["second", "first"]);
}

#[rstest]
#[case("auth = basic\nauth_value = Basic Zm9v\n", AuthScheme::BasicAuth { value: "Basic Zm9v".into() })]
#[case("auth = basic\nauth_username = user\nauth_password = pass\n", AuthScheme::basic("user", "pass"))]
#[case(
    "auth = api_key\nauth_name = x-api-key\nauth_value = k\n",
    AuthScheme::ApiKey { name: "x-api-key".into(), value: "k".into() }
)]
fn ini_auth_kinds(#[case] auth_lines: &str, #[case] expected: AuthScheme) {
    let text = format!(
        "[transport.t]\nclient_id = c\nurl = https://h/log\nlog_type = any\n{auth_lines}"
    );
    let config = LoggerConfig::from_ini_str(&text).expect("valid ini");
    assert_eq!(config.transports()[0].auth_scheme(), expected);
}

#[rstest]
fn ini_missing_key_names_section() {
    let text = "[transport.broken]\nclient_id = c\nlog_type = any\n";
    let err = LoggerConfig::from_ini_str(text).expect_err("missing url");
    assert!(matches!(
        err,
        ConfigError::MissingKey { ref section, ref key } if section == "transport.broken" && key == "url"
    ));
}

#[rstest]
#[case("log_type = FATAL\n", "invalid log type")]
#[case("log_type = any\nauth = oauth\n", "invalid auth kind")]
fn ini_rejects_unknown_values(#[case] extra: &str, #[case] message: &str) {
    let text = format!("[transport.t]\nclient_id = c\nurl = https://h/log\n{extra}");
    let err = LoggerConfig::from_ini_str(&text).expect_err("invalid value");
    assert!(err.to_string().contains(message), "unexpected error: {err}");
}

#[rstest]
#[case::json_array(r#"[{"client_id":"c","url":"ftp://h/log","logType":"any"}]"#)]
fn unsupported_scheme_is_rejected(#[case] text: &str) {
    let err = LoggerConfig::from_json_str(text).expect_err("unsupported scheme");
    assert!(matches!(
        err,
        ConfigError::UnsupportedScheme { ref client_id, ref url } if client_id == "c" && url == "ftp://h/log"
    ));
}

#[rstest]
fn builder_produces_extended_form() {
    let config = LoggerConfig::builder()
        .with_source(Source::new("shop", "1.2.0", "shop-web"))
        .with_environment("staging")
        .with_transport(TransportDescriptor::new("c", "https://h/log", LogType::Any))
        .build()
        .expect("valid config");
    let defaults = config.defaults();
    assert_eq!(defaults.environment.as_deref(), Some("staging"));
    assert_eq!(defaults.source.map(|s| s.app_name), Some("shop".to_owned()));
}

#[rstest]
fn builder_validates_schemes() {
    let result = LoggerConfig::builder()
        .with_transport(TransportDescriptor::new("c", "mailto:ops@example.com", LogType::Any))
        .build();
    assert!(matches!(result, Err(ConfigError::UnsupportedScheme { .. })));
}

#[rstest]
fn loads_config_files(extended_json: String) {
    let json = write_temp(&extended_json);
    let ini = write_temp(EXTENDED_INI);
    let from_json = LoggerConfig::from_json_file(json.path()).expect("json file");
    let from_ini = LoggerConfig::from_ini_file(ini.path()).expect("ini file");
    assert_eq!(from_json, from_ini);
}

#[rstest]
fn empty_file_is_rejected() {
    let file = write_temp("   \n");
    let err = LoggerConfig::from_ini_file(file.path()).expect_err("empty file");
    assert!(err.to_string().contains("empty file"));
}

#[rstest]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = LoggerConfig::from_json_file(dir.path().join("absent.json")).expect_err("missing");
    assert!(matches!(err, ConfigError::Io(_)));
}
