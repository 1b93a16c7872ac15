//! Configuration utilities.

/// TOML configuration with hot-reload support.
pub mod toml_config;
