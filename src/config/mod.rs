//! Logger configuration: typed forms, a builder and file loaders.

mod file;
mod types;

pub use types::{ExtendedConfig, LoggerConfig, LoggerConfigBuilder};

#[cfg(test)]
mod tests;
