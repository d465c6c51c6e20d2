//! Frame filtering for normalised error descriptions.
//!
//! Only frames that point into application source survive normalisation. A
//! frame qualifies when its file uses the `file:` URI scheme, ends in a
//! recognised source extension, or is the V8 anonymous-frame sentinel.
//! Frames from the Rust toolchain, dependency caches, the Node runtime and
//! this crate's own capture machinery are removed as well.
//!
//! # Example
//!
//! ```rust
//! use filog::frame_filter::application_frames;
//! use filog::stack_parser::StackFrame;
//!
//! let frames = vec![
//!     StackFrame::new("file:///srv/app/main.js", "run", 10, 2),
//!     StackFrame::new("node:internal/timers", "listOnTimeout", 569, 17),
//!     StackFrame::new("/srv/app/lib.so", "native", 1, 1),
//! ];
//!
//! let kept = application_frames(&frames);
//! assert_eq!(kept.len(), 1);
//! assert_eq!(kept[0].method_name.as_deref(), Some("run"));
//! ```

use crate::stack_parser::{ANONYMOUS_FILE, StackFrame};


/// Extensions recognised as application source files.
pub const SOURCE_EXTENSIONS: &[&str] = &[".rs", ".js", ".mjs", ".cjs", ".jsx", ".ts", ".tsx"];

/// URI scheme that marks a frame as application source regardless of
/// extension.
pub const FILE_URI_SCHEME: &str = "file:";

/// File patterns identifying toolchain and dependency frames.
pub const TOOLCHAIN_FILE_PATTERNS: &[&str] = &[
    "/rustc/",
    "/.cargo/registry/",
    "/.cargo/git/",
    "node_modules/",
    "node:internal",
];

/// Method patterns identifying the capture machinery itself.
pub const INFRASTRUCTURE_METHOD_PATTERNS: &[&str] =
    &["filog::", "std::backtrace", "std::panicking", "core::panicking"];

/// Filter frames using a predicate function.
pub fn filter_frames<F>(frames: &[StackFrame], predicate: F) -> Vec<StackFrame>
where
    F: Fn(&StackFrame) -> bool,
{
    frames.iter().filter(|f| predicate(f)).cloned().collect()
}

fn matches_any_pattern(value: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| value.contains(p))
}

/// Return `true` when `file` looks like application source.
///
/// # Examples
///
/// ```rust
/// use filog::frame_filter::is_source_file;
///
/// assert!(is_source_file("file:///srv/app/index"));
/// assert!(is_source_file("/srv/app/src/main.rs"));
/// assert!(is_source_file("<anonymous>"));
/// assert!(!is_source_file("libc.so.6"));
/// ```
pub fn is_source_file(file: &str) -> bool {
    file == ANONYMOUS_FILE
        || file.starts_with(FILE_URI_SCHEME)
        || SOURCE_EXTENSIONS.iter().any(|ext| file.ends_with(ext))
}

/// Exclude frames whose file contains any of `patterns`.
pub fn exclude_by_file(frames: &[StackFrame], patterns: &[&str]) -> Vec<StackFrame> {
    filter_frames(frames, |f| {
        !f.file
            .as_deref()
            .is_some_and(|file| matches_any_pattern(file, patterns))
    })
}

/// Exclude frames whose method name contains any of `patterns`.
pub fn exclude_by_method(frames: &[StackFrame], patterns: &[&str]) -> Vec<StackFrame> {
    filter_frames(frames, |f| {
        !f.method_name
            .as_deref()
            .is_some_and(|method| matches_any_pattern(method, patterns))
    })
}

/// Remove toolchain, dependency and capture-machinery frames.
pub fn exclude_infrastructure(frames: &[StackFrame]) -> Vec<StackFrame> {
    let frames = exclude_by_file(frames, TOOLCHAIN_FILE_PATTERNS);
    exclude_by_method(&frames, INFRASTRUCTURE_METHOD_PATTERNS)
}

/// Keep only frames that point into application source, in order.
///
/// A frame must have a file accepted by [`is_source_file`] and survive
/// [`exclude_infrastructure`].
pub fn application_frames(frames: &[StackFrame]) -> Vec<StackFrame> {
    let sources = filter_frames(frames, |f| f.file.as_deref().is_some_and(is_source_file));
    exclude_infrastructure(&sources)
}
