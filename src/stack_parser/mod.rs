//! Textual stack trace parsing.
//!
//! Error values reach the logger with their stack as a single string. This
//! module turns that string into [`StackFrame`] values. Three layouts are
//! recognised:
//!
//! - V8: `    at method (file:line:col)` or `    at file:line:col`
//! - Gecko: `method@file:line:col`
//! - Rust `std::backtrace::Backtrace` display output, where a numbered symbol
//!   line is followed by an `at file:line:col` location line
//!
//! Lines that match none of these (headers, notes, blank lines) are skipped,
//! so malformed input degrades to fewer frames rather than an error.

use serde::{Deserialize, Serialize};


/// File name used by V8 for frames without a backing source file.
pub const ANONYMOUS_FILE: &str = "<anonymous>";

/// A single parsed frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl StackFrame {
    /// Create a frame with every field populated.
    pub fn new(
        file: impl Into<String>,
        method_name: impl Into<String>,
        line_number: u32,
        column: u32,
    ) -> Self {
        Self {
            file: Some(file.into()),
            method_name: Some(method_name.into()),
            line_number: Some(line_number),
            column: Some(column),
        }
    }

    fn with_method(method: &str) -> Self {
        Self {
            method_name: non_empty(method),
            ..Self::default()
        }
    }

    fn set_location(&mut self, location: &str) {
        let (file, line, column) = split_location(location);
        self.file = non_empty(file);
        self.line_number = line;
        self.column = column;
    }
}

/// Parse every recognisable frame out of `stack`, outermost last.
pub fn parse_stack(stack: &str) -> Vec<StackFrame> {
    let mut frames = Vec::new();
    // Rust backtraces spread a frame over two lines; the symbol line opens a
    // frame that the following `at` line completes.
    let mut pending: Option<StackFrame> = None;

    for line in stack.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(symbol) = backtrace_symbol(trimmed) {
            frames.extend(pending.take());
            pending = Some(StackFrame::with_method(symbol));
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("at ") {
            match pending.take() {
                Some(mut frame) => {
                    frame.set_location(rest.trim());
                    frames.push(frame);
                }
                None => frames.push(parse_v8_frame(rest.trim())),
            }
            continue;
        }

        frames.extend(pending.take());
        if let Some(frame) = parse_gecko_frame(trimmed) {
            frames.push(frame);
        }
    }

    frames.extend(pending);
    frames
}

/// Match `12: symbol::path` as printed by `std::backtrace::Backtrace`.
fn backtrace_symbol(line: &str) -> Option<&str> {
    let (index, symbol) = line.split_once(": ")?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(symbol.trim())
}

fn parse_v8_frame(rest: &str) -> StackFrame {
    let rest = rest.strip_prefix("async ").unwrap_or(rest);
    if let Some(body) = rest.strip_suffix(')')
        && let Some(open) = body.rfind(" (")
    {
        let mut frame = StackFrame::with_method(&body[..open]);
        frame.set_location(&body[open + 2..]);
        return frame;
    }
    let mut frame = StackFrame::default();
    frame.set_location(rest);
    frame
}

fn parse_gecko_frame(line: &str) -> Option<StackFrame> {
    let (method, location) = line.split_once('@')?;
    if location.is_empty() {
        return None;
    }
    let mut frame = StackFrame::with_method(method);
    frame.set_location(location);
    Some(frame)
}

/// Split `file:line:col` from the right so that URI schemes and drive letters
/// stay part of the file.
fn split_location(location: &str) -> (&str, Option<u32>, Option<u32>) {
    let mut parts = location.rsplitn(3, ':');
    let last = parts.next().unwrap_or_default();
    let middle = parts.next();
    let head = parts.next();

    match (head, middle.and_then(|m| m.parse().ok()), last.parse().ok()) {
        (Some(file), Some(line), Some(column)) => (file, Some(line), Some(column)),
        _ => match (middle, last.parse().ok()) {
            (Some(_), Some(line)) => {
                let file = &location[..location.len() - last.len() - 1];
                (file, Some(line), None)
            }
            _ => (location, None, None),
        },
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}
