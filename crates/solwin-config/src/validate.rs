//! Post-merge configuration validation.

use std::net::SocketAddr;

use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Upper bound on the readiness delay (one minute).
const MAX_READY_DELAY_MS: u64 = 60_000;

/// Upper bound on fetched rate history.
const MAX_HISTORY_LENGTH: u32 = 120;

/// Validate a merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_engine(config)?;
    validate_embed(config)?;
    validate_regional(config)?;
    validate_server(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_engine(config: &Config) -> ConfigResult<()> {
    let engine = &config.engine;
    if engine.ready_delay_ms > MAX_READY_DELAY_MS {
        return Err(invalid(
            "engine.ready_delay_ms",
            format!("must be at most {MAX_READY_DELAY_MS}"),
        ));
    }
    if engine.version.trim().is_empty() {
        return Err(invalid("engine.version", "must not be empty"));
    }
    if engine.capabilities.iter().any(|c| c.trim().is_empty()) {
        return Err(invalid(
            "engine.capabilities",
            "capability names must not be empty",
        ));
    }
    Ok(())
}

fn validate_embed(config: &Config) -> ConfigResult<()> {
    if config.embed.container_id.trim().is_empty() {
        return Err(invalid("embed.container_id", "must not be empty"));
    }
    Ok(())
}

fn validate_regional(config: &Config) -> ConfigResult<()> {
    let regional = &config.regional;
    for (field, raw) in [
        ("regional.eia_base_url", &regional.eia_base_url),
        ("regional.geocode_base_url", &regional.geocode_base_url),
    ] {
        let url = Url::parse(raw).map_err(|e| invalid(field, format!("invalid URL '{raw}': {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(field, "must be an http or https URL"));
        }
    }
    if regional.history_length == 0 || regional.history_length > MAX_HISTORY_LENGTH {
        return Err(invalid(
            "regional.history_length",
            format!("must be between 1 and {MAX_HISTORY_LENGTH}"),
        ));
    }
    if regional.timeout_secs == 0 {
        return Err(invalid("regional.timeout_secs", "must be positive"));
    }
    Ok(())
}

fn validate_server(config: &Config) -> ConfigResult<()> {
    config
        .server
        .bind
        .parse::<SocketAddr>()
        .map_err(|e| invalid("server.bind", format!("'{}': {e}", config.server.bind)))?;
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(invalid(
            "logging.level",
            format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        ));
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                valid_formats.join(", ")
            ),
        ));
    }
    Ok(())
}
