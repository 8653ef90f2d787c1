//! `solwin demo`: both protocol endpoints over the loopback browser.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use solwin_config::Config;
use solwin_core::{Command, EngineEnvelope, EngineWindow, Location, SolarEngineState};
use solwin_embed::{EmbedOptions, MessageFilter, embed};
use solwin_engine::{EngineChannel, Readiness};
use solwin_loopback::Browser;

use crate::config_bridge;
use crate::theme::{Direction, Theme};

/// Demo parameters.
#[derive(Debug, Clone)]
pub(crate) struct DemoArgs {
    pub(crate) origin: String,
    pub(crate) location: Option<String>,
    pub(crate) ready_delay_ms: Option<u64>,
}

fn print_inbound(envelope: &EngineEnvelope) {
    let body = serde_json::to_string(envelope).unwrap_or_else(|e| format!("<{e}>"));
    println!(
        "{}",
        Theme::message(Direction::ToHost, envelope.message_type().as_str(), &body)
    );
}

fn print_outbound(message_type: &str, body: &str) {
    println!("{}", Theme::message(Direction::ToEngine, message_type, body));
}

/// Boot an engine inside an embed and run one request/response exchange.
pub(crate) async fn run_demo(cfg: &Config, args: DemoArgs) -> Result<()> {
    let browser = Browser::new();
    let host = browser.open_document(&args.origin);

    let defaults = config_bridge::to_embed_defaults(cfg);
    let mut options = EmbedOptions::new(&cfg.embed.container_id).or(&defaults);
    if let Some(location) = &args.location {
        options = options.with_default_location(location);
    }
    host.add_element(&cfg.embed.container_id);

    let handle = embed(host.clone(), &options).context("embed failed")?;
    println!("{}", Theme::header("Solar Window loopback demo"));
    println!("  frame src  {}", handle.src());
    println!("  target     {}", handle.target_origin());
    println!("{}", Theme::separator());

    let _log = handle.on_message(MessageFilter::All, print_inbound);

    let content = handle
        .frame()
        .content_window()
        .ok_or_else(|| anyhow!("frame has no content window"))?;
    let engine_window = browser
        .window(content)
        .ok_or_else(|| anyhow!("frame content context missing"))?;

    let mut engine_config = config_bridge::to_engine_config(cfg);
    if let Some(ms) = args.ready_delay_ms {
        engine_config = engine_config.with_ready_delay(Duration::from_millis(ms));
    }
    let window: Arc<dyn EngineWindow> = engine_window.clone();
    let engine = EngineChannel::new(window, engine_config);

    match engine.initialize()? {
        Readiness::Scheduled(task) => task.await.context("readiness task failed")?,
        Readiness::Inert => {
            println!("{}", Theme::warning("engine is not embedded, nothing to do"));
            return Ok(());
        },
    }
    browser.flush();

    print_outbound("STATE_REQUEST", "{}");
    handle.request_state();
    browser.flush();

    let mut partial = SolarEngineState::new().with_location(Location::new(40.0, -105.27));
    if let Some(location) = options.default_location() {
        partial = partial.with_address(location);
    }
    engine.update_state(partial, true);
    engine.report_interaction("marker_placed", None);
    browser.flush();

    print_outbound("COMMAND", Command::Refresh.name());
    handle.send_command(Command::Refresh);
    browser.flush();

    println!("{}", Theme::separator());
    println!(
        "{}",
        Theme::success(&format!(
            "{} messages received by host, engine reloaded {} time(s)",
            handle.message_count(),
            engine_window.reload_count()
        ))
    );
    println!(
        "  {}",
        Theme::dimmed(&format!("engine pinned parent origin {}", engine.parent_origin()))
    );

    handle.destroy();
    Ok(())
}
