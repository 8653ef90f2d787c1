//! `solwin region`.

use anyhow::{Context, Result};
use solwin_config::Config;
use solwin_core::Location;

use crate::config_bridge;
use crate::theme::Theme;

/// Resolve a coordinate and summarize the region's energy data.
pub(crate) async fn run_region(cfg: &Config, lat: f64, lng: f64, json: bool) -> Result<()> {
    let service = config_bridge::to_regional_service(cfg).context("failed to build HTTP client")?;
    let data = service.regional_energy_data(Location::new(lat, lng)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!(
        "{}",
        Theme::header(&format!("{} ({})", data.state_name, data.state_code))
    );
    match (data.average_residential_rate, &data.residential_source_info) {
        (Some(rate), Some(source)) => {
            println!("  residential  {rate:.2}  {}", Theme::dimmed(source));
        },
        _ => println!("  {}", Theme::warning("no residential rate data")),
    }
    println!(
        "  {}",
        Theme::dimmed(&format!("updated {}", data.last_updated.to_rfc3339()))
    );
    Ok(())
}
