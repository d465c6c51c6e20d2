//! HTTP delivery of normalised payloads.
//!
//! [`HttpSender`] issues exactly one POST per call. There are no retries: a
//! failed attempt is classified, logged locally and returned as a
//! [`DispatchError`](crate::DispatchError).
//!
//! # Failure classification
//!
//! - **Connection failures**: reported as connectivity errors naming the URL.
//! - **Non-2xx responses**: the first GraphQL error (message and code) when
//!   the body carries an `errors` array, otherwise the raw body.
//! - **2xx with `errors`**: treated as a remote error as well.

mod config;
mod response;
mod sender;

#[cfg(test)]
mod tests;

pub use config::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, HttpSenderConfig, USER_AGENT};
pub use sender::HttpSender;
