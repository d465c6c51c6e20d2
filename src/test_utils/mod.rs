//! Test-only helpers shared across crate unit tests.

pub mod mock_server;
pub mod recording_publisher;
pub mod shared_buffer;
pub mod capture_logs;
