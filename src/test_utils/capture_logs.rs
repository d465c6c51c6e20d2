//! Process-wide `logtest` capture.
//!
//! `logtest::Logger::start` installs a global logger and panics if called
//! more than once per process, so tests obtain handles through here.

use std::sync::Once;

static START: Once = Once::new();

/// Install the `logtest` logger on first use and return a capture handle.
pub fn start() -> logtest::Logger {
    START.call_once(|| {
        let _ = logtest::Logger::start();
    });
    logtest::Logger
}
