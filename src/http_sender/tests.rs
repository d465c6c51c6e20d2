//! Integration tests for the HTTP sender against a local mock server.

use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

use rstest::{fixture, rstest};
use serde_json::json;
use serial_test::serial;

use crate::error::DispatchError;
use crate::level::LogLevel;
use crate::payload::NormalisedPayload;
use crate::test_utils::mock_server::{self, MockResponse, closed_addr, spawn_mock_server};
use crate::transport::{AuthScheme, Delivery};

use super::{HttpSender, HttpSenderConfig, USER_AGENT};

#[fixture]
fn tcp_listener() -> TcpListener {
    mock_server::tcp_listener()
}

fn sender_for(addr: SocketAddr, auth: AuthScheme) -> HttpSender {
    let config = HttpSenderConfig::new(format!("http://{addr}/log"), auth)
        .with_connect_timeout(Duration::from_secs(2))
        .with_request_timeout(Duration::from_secs(5));
    HttpSender::with_config(config)
}

fn payload(description: &str) -> NormalisedPayload {
    NormalisedPayload {
        log_level: LogLevel::Error,
        log_ticket: Some("ticket-1".into()),
        event_code: Some("E42".into()),
        environment: Some("test".into()),
        source: None,
        error_description: description.into(),
    }
}

#[rstest]
fn posts_json_with_fixed_headers(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(tcp_listener, vec![MockResponse::ok()]);
    let sender = sender_for(addr, AuthScheme::client_id("client-a"));

    let delivery = sender.send(&payload("boom")).expect("delivered");
    assert_eq!(delivery, Delivery::Http { status: 200 });

    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.path, "/log");
    assert_eq!(captured.header("content-type"), Some("application/json"));
    assert_eq!(captured.header("accept"), Some("application/json"));
    assert_eq!(captured.header("user-agent"), Some(USER_AGENT));
    assert_eq!(captured.header("client-id"), Some("client-a"));

    let body = captured.json();
    assert_eq!(body["logLevel"], "ERROR");
    assert_eq!(body["errorDescription"], "boom");
    assert_eq!(body["eventCode"], "E42");
    assert!(body.get("source").is_none());
}

#[rstest]
#[case(AuthScheme::basic("user", "pass"), "authorization", "Basic dXNlcjpwYXNz")]
#[case(
    AuthScheme::Cookie { name: "sid".into(), value: "abc".into() },
    "cookie",
    "sid=abc"
)]
#[case(
    AuthScheme::ApiKey { name: "x-api-key".into(), value: "k-1".into() },
    "x-api-key",
    "k-1"
)]
fn injects_auth_header(
    tcp_listener: TcpListener,
    #[case] auth: AuthScheme,
    #[case] header: &str,
    #[case] expected: &str,
) {
    let (addr, rx) = spawn_mock_server(tcp_listener, vec![MockResponse::ok()]);
    let sender = sender_for(addr, auth);
    sender.send(&payload("auth")).expect("delivered");

    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    assert_eq!(captured.header(header), Some(expected));
}

#[rstest]
#[serial]
fn graphql_errors_on_success_are_reported(tcp_listener: TcpListener) {
    let body = json!({
        "errors": [{
            "message": "bad",
            "locations": [{"line": 1, "column": 1}],
            "extensions": {"code": "X", "stacktrace": ["at resolve (server.js:1:1)"]}
        }]
    });
    let (addr, _rx) = spawn_mock_server(
        tcp_listener,
        vec![MockResponse::with_body(200, body.to_string())],
    );
    let sender = sender_for(addr, AuthScheme::client_id("c"));
    let mut logger = crate::test_utils::capture_logs::start();
    while logger.pop().is_some() {}

    let err = sender.send(&payload("gql")).expect_err("remote error");
    let DispatchError::Remote(remote) = err else {
        panic!("expected remote error, got {err:?}");
    };
    assert_eq!(remote.code.as_deref(), Some("X"));
    assert_eq!(remote.message, "bad");
    let details = remote.details.expect("details");
    assert!(details["extensions"].get("stacktrace").is_none());
    assert!(details.get("locations").is_none());

    let mut reported = false;
    while let Some(record) = logger.pop() {
        if record.level() == log::Level::Error && record.args().contains("bad (X)") {
            assert!(!record.args().contains("stacktrace"));
            reported = true;
        }
    }
    assert!(reported, "remote error was not logged");
}

#[rstest]
fn error_status_uses_raw_body(tcp_listener: TcpListener) {
    let (addr, _rx) = spawn_mock_server(
        tcp_listener,
        vec![MockResponse::with_body(502, "upstream down")],
    );
    let sender = sender_for(addr, AuthScheme::client_id("c"));

    match sender.send(&payload("down")) {
        Err(DispatchError::Remote(remote)) => {
            assert_eq!(remote.status, Some(502));
            assert_eq!(remote.message, "upstream down");
            assert!(remote.code.is_none());
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[rstest]
fn graphql_request_failure_extracts_first_error(tcp_listener: TcpListener) {
    let body = json!({"errors": [{"message": "denied", "extensions": {"code": "FORBIDDEN"}}]});
    let (addr, rx) = spawn_mock_server(
        tcp_listener,
        vec![MockResponse::with_body(400, body.to_string())],
    );
    let sender = sender_for(addr, AuthScheme::client_id("c"));
    let request = json!({"query": "mutation Log($p: LogInput!) { log(p: $p) }", "variables": {}});

    let err = sender.send(&request).expect_err("remote error");
    assert!(matches!(
        err,
        DispatchError::Remote(ref remote) if remote.code.as_deref() == Some("FORBIDDEN")
    ));
    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    assert_eq!(captured.json()["variables"], json!({}));
}

#[rstest]
#[serial]
fn refused_connection_is_connectivity_error() {
    let addr = closed_addr();
    let sender = sender_for(addr, AuthScheme::client_id("c"));
    let mut logger = crate::test_utils::capture_logs::start();
    while logger.pop().is_some() {}

    let err = sender.send(&payload("nobody home")).expect_err("connectivity");
    let DispatchError::Connectivity { url, reason } = err else {
        panic!("expected connectivity error, got {err:?}");
    };
    assert_eq!(url, format!("http://{addr}/log"));
    assert_eq!(reason, "connection refused");

    let mut reported = false;
    while let Some(record) = logger.pop() {
        if record.args().contains("connection refused") && record.args().contains(&url) {
            reported = true;
        }
    }
    assert!(reported, "connectivity failure was not logged");
}
