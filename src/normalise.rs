//! Payload normalisation.
//!
//! Turns a caller's [`LogPayload`] into the wire-ready [`NormalisedPayload`]:
//! defaults are backfilled, a ticket is assigned, and structured errors are
//! flattened into a header line plus one indented line per application frame.
//!
//! Application frames are chosen by
//! [`application_frames`](crate::frame_filter::application_frames). Frames
//! under `node_modules/`, the Cargo registry or the Rust toolchain are dropped
//! even when their file has a recognised source extension, so dependency
//! frames never appear in a flattened description.

use std::fmt::Write as _;

use crate::frame_filter::application_frames;
use crate::payload::{
    ErrorDescription, ErrorLike, LogPayload, NormalisedPayload, Source, new_log_ticket,
};
use crate::stack_parser::{StackFrame, parse_stack};

/// Logger-level values copied into payloads that lack them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PayloadDefaults {
    pub source: Option<Source>,
    pub environment: Option<String>,
}

/// Format one surviving frame as `  [method] file:line:col`.
pub fn format_frame(frame: &StackFrame) -> String {
    let method = frame.method_name.as_deref().unwrap_or("<anonymous>");
    let file = frame.file.as_deref().unwrap_or_default();
    let mut line = format!("  [{method}] {file}");
    if let Some(lineno) = frame.line_number {
        let _ = write!(line, ":{lineno}");
        if let Some(column) = frame.column {
            let _ = write!(line, ":{column}");
        }
    }
    line.push('\n');
    line
}

/// Flatten an error into `"<name>: <message>\n"` followed by its application
/// frames.
pub fn describe_error(error: &ErrorLike) -> String {
    let mut output = format!("{}: {}\n", error.name, error.message);
    if let Some(stack) = error.stack.as_deref() {
        for frame in application_frames(&parse_stack(stack)) {
            output.push_str(&format_frame(&frame));
        }
    }
    output
}

/// Render a description as wire text. Plain text passes through unchanged.
pub fn describe(description: &ErrorDescription) -> String {
    match description {
        ErrorDescription::Text(text) => text.clone(),
        ErrorDescription::Error(error) => describe_error(error),
    }
}

/// Normalise `payload` for transmission.
///
/// `original_error`, when supplied, replaces the payload's own description.
pub fn normalise_payload(
    payload: LogPayload,
    defaults: &PayloadDefaults,
    original_error: Option<&ErrorLike>,
) -> NormalisedPayload {
    let error_description = match original_error {
        Some(error) => describe_error(error),
        None => describe(&payload.error_description),
    };
    NormalisedPayload {
        log_level: payload.log_level,
        log_ticket: Some(payload.log_ticket.unwrap_or_else(new_log_ticket)),
        event_code: payload.event_code,
        environment: payload.environment.or_else(|| defaults.environment.clone()),
        source: payload.source.or_else(|| defaults.source.clone()),
        error_description,
    }
}
