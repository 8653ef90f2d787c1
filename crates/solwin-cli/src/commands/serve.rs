//! `solwin serve`.

use std::sync::Arc;

use anyhow::{Context, Result};
use solwin_config::Config;
use solwin_server::AppState;

use crate::config_bridge;
use crate::theme::Theme;

/// Serve the embed script and rate API until interrupted.
pub(crate) async fn run_serve(cfg: &Config, bind: Option<String>, dev: bool) -> Result<()> {
    let addr = bind.unwrap_or_else(|| cfg.server.bind.clone());
    let mut options = config_bridge::to_server_options(cfg);
    options.dev_mode |= dev;

    if cfg.regional.eia_api_key.is_none() {
        eprintln!(
            "{}",
            Theme::warning("no EIA API key configured, /api/rates will answer 503")
        );
    }

    let rates = config_bridge::to_eia_client(cfg).context("failed to build HTTP client")?;
    let state = AppState::new(Arc::new(rates), options);

    println!("{}", Theme::header("Solar Window server"));
    println!("  script  http://{addr}/lib/embed.js");
    println!("  rates   http://{addr}/api/rates/{{state}}");
    if options.dev_mode {
        println!("  {}", Theme::dimmed("dev mode: caching disabled"));
    }

    solwin_server::run(&addr, state)
        .await
        .with_context(|| format!("server on {addr} failed"))
}
