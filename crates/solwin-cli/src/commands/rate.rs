//! `solwin rate`.

use anyhow::{Context, Result};
use solwin_config::Config;
use solwin_regional::{RateProvider, RegionCode};

use crate::config_bridge;
use crate::theme::Theme;

/// Print the recent residential price history of a state.
pub(crate) async fn run_rate(cfg: &Config, state: &str, limit: Option<usize>, json: bool) -> Result<()> {
    let region = RegionCode::parse(state)?;
    let client = config_bridge::to_eia_client(cfg).context("failed to build HTTP client")?;
    let limit = limit.unwrap_or_else(|| usize::try_from(cfg.regional.history_length).unwrap_or(1));

    let records = client.fetch_price_history(&region, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", Theme::warning(&format!("no rate data for {region}")));
        return Ok(());
    }

    let name = records
        .first()
        .map_or_else(|| region.to_string(), |r| r.state_description.clone());
    println!("{}", Theme::header(&format!("Residential electricity rates: {name}")));
    println!("{}", Theme::separator());
    for record in &records {
        println!("  {:<8} {:>7.2}  {}", record.period, record.value, Theme::dimmed(&record.units));
    }
    Ok(())
}
