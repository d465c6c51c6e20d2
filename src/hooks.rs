//! Process-level error hooks.
//!
//! The logger never installs hooks on its own. The host calls
//! [`Logger::error_listener`] once with a registry; [`ProcessHooks`] is the
//! registry for ordinary processes:
//!
//! - uncaught errors are panics, observed through a chained panic hook;
//! - unhandled rejections are errors the host reports explicitly through
//!   [`report_unhandled_rejection`], typically from a task supervisor.
//!
//! Registering twice installs two sets of handlers and reports every error
//! twice. That is a caller error and is not detected.
//!
//! Panics raised while the logger itself is running on a thread (inside a
//! write, an echo, or on the dispatch worker) are not reported. They would
//! otherwise re-enter the logger that raised them.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::Cell;
use std::panic::{self, PanicHookInfo};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::level::LogLevel;
use crate::logger::{EventOptions, Logger};
use crate::payload::ErrorLike;

/// Event code attached to reports of uncaught errors.
pub const UNCAUGHT_EXCEPTION: &str = "uncaughtException";
/// Event code attached to reports of unhandled rejections.
pub const UNHANDLED_REJECTION: &str = "unhandledRejection";
/// Error name used for panics.
pub const PANIC_ERROR_NAME: &str = "Panic";

/// Callback receiving a process-level error.
pub type ErrorHook = Box<dyn Fn(ErrorLike) + Send + Sync + 'static>;

/// Where process-level error handlers are registered.
pub trait ErrorHookRegistry {
    fn on_uncaught(&mut self, handler: ErrorHook);
    fn on_unhandled_rejection(&mut self, handler: ErrorHook);
}

static REJECTION_HANDLERS: Lazy<RwLock<Vec<Arc<ErrorHook>>>> =
    Lazy::new(|| RwLock::new(Vec::new()));

thread_local! {
    static REPORTS_SUPPRESSED: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as running logger code until dropped.
///
/// Process-level errors raised on the thread meanwhile are not reported.
pub(crate) struct SuppressReports {
    previous: bool,
}

impl SuppressReports {
    pub(crate) fn enter() -> Self {
        Self {
            previous: REPORTS_SUPPRESSED.replace(true),
        }
    }
}

impl Drop for SuppressReports {
    fn drop(&mut self) {
        REPORTS_SUPPRESSED.set(self.previous);
    }
}

fn reports_suppressed() -> bool {
    REPORTS_SUPPRESSED.get()
}

/// Registry backed by the panic hook and a process-wide rejection slot.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessHooks;

impl ErrorHookRegistry for ProcessHooks {
    /// Chain `handler` in front of the current panic hook.
    fn on_uncaught(&mut self, handler: ErrorHook) {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            handler(panic_error(info));
            previous(info);
        }));
    }

    fn on_unhandled_rejection(&mut self, handler: ErrorHook) {
        REJECTION_HANDLERS.write().push(Arc::new(handler));
    }
}

/// Hand `error` to every registered rejection handler.
///
/// Returns the number of handlers invoked.
pub fn report_unhandled_rejection(error: ErrorLike) -> usize {
    // Snapshot so handlers may register further handlers without deadlock.
    let handlers: Vec<_> = REJECTION_HANDLERS.read().clone();
    for handler in &handlers {
        handler(error.clone());
    }
    handlers.len()
}

/// Remove every rejection handler registered through [`ProcessHooks`].
pub fn clear_unhandled_rejection_handlers() {
    REJECTION_HANDLERS.write().clear();
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_owned()
    }
}

/// Describe a panic as an error value with the current backtrace.
pub fn panic_error(info: &PanicHookInfo<'_>) -> ErrorLike {
    let mut message = panic_message(info.payload());
    if let Some(location) = info.location() {
        message.push_str(&format!(
            " at {}:{}:{}",
            location.file(),
            location.line(),
            location.column()
        ));
    }
    ErrorLike::new(PANIC_ERROR_NAME, message).with_stack(Backtrace::force_capture().to_string())
}

impl Logger {
    /// Report uncaught errors and unhandled rejections through this logger.
    ///
    /// Both are written at `ERROR` with print-out enabled and the event codes
    /// [`UNCAUGHT_EXCEPTION`] and [`UNHANDLED_REJECTION`]. Uncaught errors are
    /// flushed before the handler returns so they survive an imminent exit.
    /// Termination is never prevented.
    pub fn error_listener(self: &Arc<Self>, registry: &mut dyn ErrorHookRegistry) {
        let logger = Arc::clone(self);
        registry.on_uncaught(Box::new(move |error| {
            if reports_suppressed() {
                return;
            }
            logger.report_process_error(error, UNCAUGHT_EXCEPTION);
            logger.flush();
        }));
        let logger = Arc::clone(self);
        registry.on_unhandled_rejection(Box::new(move |error| {
            if reports_suppressed() {
                return;
            }
            logger.report_process_error(error, UNHANDLED_REJECTION);
        }));
    }

    fn report_process_error(&self, error: ErrorLike, event_code: &str) {
        self.log_event(
            LogLevel::Error,
            error,
            EventOptions::default()
                .with_event_code(event_code)
                .print_out(true),
        );
    }
}
