//! Configuration module for Tether runtime.
//!
//! Figment-based loading (TOML/YAML files, `TETHER_*` environment variables,
//! programmatic overrides) and validation of the [`TetherConfig`] schema.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEventConfig, TetherConfig};
pub use validation::validate_config;
