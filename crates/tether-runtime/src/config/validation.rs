//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogLevel, LogOutput, LoggingConfig, TetherConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &TetherConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_plugin_config(config)?;
    validate_service_configs(config)?;
    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    for (target, level) in &logging.filters {
        if target.trim().is_empty() {
            return Err(ConfigError::validation("Log filter target cannot be empty"));
        }
        if LogLevel::parse(level).is_none() {
            let valid: Vec<&str> = LogLevel::ALL.iter().map(|l| l.as_str()).collect();
            return Err(ConfigError::validation(format!(
                "Invalid log level for {target}: {level}. Valid values are: {valid:?}"
            )));
        }
    }

    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output = \"file\"",
        ));
    }

    Ok(())
}

fn validate_plugin_config(config: &TetherConfig) -> ConfigResult<()> {
    if !config.plugin.is_object() {
        return Err(ConfigError::validation("[plugin] must be a table"));
    }
    Ok(())
}

/// Validates the `[services.<handle>]` sections.
fn validate_service_configs(config: &TetherConfig) -> ConfigResult<()> {
    for (key, section) in &config.services {
        if key.is_empty() || key.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidServiceKey(key.clone()));
        }
        if !section.is_object() {
            return Err(ConfigError::validation(format!(
                "[services.{key}] must be a table"
            )));
        }
    }
    Ok(())
}
