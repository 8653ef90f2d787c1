//! Bridge from `solwin_config::Config` to the domain types of each crate.

use std::sync::Arc;
use std::time::Duration;

use solwin_config::Config;
use solwin_embed::EmbedOptions;
use solwin_engine::EngineConfig;
use solwin_regional::{EiaClient, GoogleGeocoder, RegionalEnergyService};
use solwin_server::ServerOptions;
use solwin_telemetry::{LogConfig, LogFormat};

/// Convert the `[logging]` section.
pub(crate) fn to_log_config(cfg: &Config) -> LogConfig {
    let format = match cfg.logging.format.as_str() {
        "pretty" => LogFormat::Pretty,
        "json" => LogFormat::Json,
        "full" => LogFormat::Full,
        _ => LogFormat::Compact,
    };

    cfg.logging
        .directives
        .iter()
        .fold(LogConfig::new(&cfg.logging.level).with_format(format), |lc, d| {
            lc.with_directive(d)
        })
}

/// Convert the `[engine]` section.
pub(crate) fn to_engine_config(cfg: &Config) -> EngineConfig {
    EngineConfig {
        ready_delay: Duration::from_millis(cfg.engine.ready_delay_ms),
        version: cfg.engine.version.clone(),
        capabilities: cfg.engine.capabilities.clone(),
    }
}

/// Embed defaults from `[embed]`, with the maps key from `[regional]`.
pub(crate) fn to_embed_defaults(cfg: &Config) -> EmbedOptions {
    let mut options = EmbedOptions::new(&cfg.embed.container_id)
        .with_height(&cfg.embed.height)
        .with_width(&cfg.embed.width);
    if let Some(location) = &cfg.embed.default_location {
        options = options.with_default_location(location);
    }
    if let Some(key) = &cfg.regional.maps_api_key {
        options = options.with_api_key(key);
    }
    options
}

/// Convert the `[server]` section.
pub(crate) fn to_server_options(cfg: &Config) -> ServerOptions {
    ServerOptions {
        dev_mode: cfg.server.dev_mode,
        cache_max_age_secs: cfg.server.cache_max_age_secs,
    }
}

fn http_client(cfg: &Config) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.regional.timeout_secs))
        .build()
}

/// EIA client for the configured endpoint and key.
pub(crate) fn to_eia_client(cfg: &Config) -> reqwest::Result<EiaClient> {
    Ok(EiaClient::new(cfg.regional.eia_api_key.clone())
        .with_base_url(&cfg.regional.eia_base_url)
        .with_client(http_client(cfg)?))
}

/// Geocoder plus rate client assembled into the regional service.
pub(crate) fn to_regional_service(cfg: &Config) -> reqwest::Result<RegionalEnergyService> {
    let geocoder = GoogleGeocoder::new(cfg.regional.maps_api_key.clone())
        .with_base_url(&cfg.regional.geocode_base_url)
        .with_client(http_client(cfg)?);
    let history = usize::try_from(cfg.regional.history_length).unwrap_or(usize::MAX);
    Ok(
        RegionalEnergyService::new(Arc::new(geocoder), Arc::new(to_eia_client(cfg)?))
            .with_history_length(history),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_from_defaults() {
        let engine = to_engine_config(&Config::default());
        assert_eq!(engine.ready_delay, Duration::from_millis(1000));
        assert_eq!(engine.version, "1.0.0");
        assert_eq!(engine.capabilities, vec!["solar-analysis", "map-interaction"]);
    }

    #[test]
    fn test_embed_defaults_carry_maps_key() {
        let mut cfg = Config::default();
        cfg.regional.maps_api_key = Some("maps".into());
        cfg.embed.default_location = Some("Boulder".into());

        let options = to_embed_defaults(&cfg);
        assert_eq!(options.container_id(), Some("solar-window"));
        assert_eq!(options.api_key(), Some("maps"));
        assert_eq!(options.default_location(), Some("Boulder"));
        assert_eq!(options.effective_height(), "600px");
    }

    #[test]
    fn test_log_config_format_and_directives() {
        let mut cfg = Config::default();
        cfg.logging.format = "json".into();
        cfg.logging.directives = vec!["tower_http=debug".into()];

        let log = to_log_config(&cfg);
        assert_eq!(log.format, LogFormat::Json);
        assert_eq!(log.directives, vec!["tower_http=debug"]);
    }

    #[test]
    fn test_server_options() {
        let mut cfg = Config::default();
        cfg.server.dev_mode = true;
        let options = to_server_options(&cfg);
        assert!(options.dev_mode);
        assert_eq!(options.cache_max_age_secs, 3600);
    }
}
