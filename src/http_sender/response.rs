//! Interpretation of destination responses.
//!
//! Collection endpoints may speak GraphQL, in which case failures arrive as an
//! `errors` array even on 2xx responses. The first error's message and
//! `extensions.code` are lifted into a [`RemoteError`]; `locations` and
//! `extensions.stacktrace` are stripped before anything is reported.

use serde_json::Value;

use crate::error::RemoteError;

/// Fields removed from every reported error object.
const SENSITIVE_FIELDS: &[&str] = &["locations"];
/// Fields removed from an error's `extensions` object.
const SENSITIVE_EXTENSIONS: &[&str] = &["stacktrace"];

/// Return `true` when an outgoing body has the shape of a GraphQL request.
pub(crate) fn is_graphql_request(body: &Value) -> bool {
    body.get("query").is_some() && body.get("variables").is_some()
}

/// First element of a GraphQL `errors` array, if present and non-empty.
pub(crate) fn first_graphql_error(body: &Value) -> Option<&Value> {
    body.get("errors")?.as_array()?.first()
}

/// Copy `error` without `locations` or `extensions.stacktrace`.
pub(crate) fn sanitise(error: &Value) -> Value {
    let mut cleaned = error.clone();
    if let Some(object) = cleaned.as_object_mut() {
        for field in SENSITIVE_FIELDS {
            object.remove(*field);
        }
        if let Some(extensions) = object.get_mut("extensions").and_then(Value::as_object_mut) {
            for field in SENSITIVE_EXTENSIONS {
                extensions.remove(*field);
            }
        }
    }
    cleaned
}

fn from_graphql_error(status: Option<u16>, error: &Value) -> RemoteError {
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_owned();
    let code = error
        .get("extensions")
        .and_then(|ext| ext.get("code"))
        .and_then(Value::as_str)
        .map(str::to_owned);
    RemoteError {
        status,
        message,
        code,
        details: Some(sanitise(error)),
    }
}

/// Inspect a 2xx body for a GraphQL `errors` array.
pub(crate) fn errors_in_success(body: &str) -> Option<RemoteError> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    first_graphql_error(&parsed).map(|error| from_graphql_error(None, error))
}

/// Build the error reported for a non-2xx response.
///
/// A GraphQL `errors` array wins; otherwise the raw body becomes the message.
pub(crate) fn error_from_status(status: u16, body: &str) -> RemoteError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    if let Some(error) = parsed.as_ref().and_then(first_graphql_error) {
        return from_graphql_error(Some(status), error);
    }
    let trimmed = body.trim();
    RemoteError {
        status: Some(status),
        message: if trimmed.is_empty() {
            format!("HTTP {status}")
        } else {
            trimmed.to_owned()
        },
        code: None,
        details: parsed.as_ref().map(sanitise),
    }
}
