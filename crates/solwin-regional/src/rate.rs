//! Rate records and the EIA row format.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// One period's average retail electricity price for a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRecord {
    /// Reporting period, e.g. `2024-06`.
    pub period: String,
    /// Area the record covers.
    pub area_name: String,
    /// Human-readable region name.
    pub state_description: String,
    /// Average price.
    pub value: f64,
    /// Unit of `value`, e.g. `cents per kilowatt-hour`.
    pub units: String,
}

/// A number the API may send either as JSON number or as string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum FlexNumber {
    Number(f64),
    Text(String),
}

impl FlexNumber {
    fn to_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|n| n.is_finite())
    }
}

/// Row of an EIA `retail-sales` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EiaRow {
    period: String,
    #[serde(rename = "stateDescription", default)]
    state_description: Option<String>,
    #[serde(rename = "areaName", default)]
    area_name: Option<String>,
    #[serde(default)]
    price: Option<FlexNumber>,
    #[serde(default)]
    value: Option<FlexNumber>,
    #[serde(rename = "price-units", default)]
    price_units: Option<String>,
    #[serde(default)]
    units: Option<String>,
}

impl EiaRow {
    /// Convert to a record. Rows without a usable price are skipped.
    pub(crate) fn into_record(self) -> Option<RateRecord> {
        let Some(value) = self
            .price
            .as_ref()
            .or(self.value.as_ref())
            .and_then(FlexNumber::to_f64)
        else {
            debug!(period = %self.period, "Skipping EIA row without a price");
            return None;
        };

        let state_description = self.state_description.unwrap_or_default();
        Some(RateRecord {
            period: self.period,
            area_name: self.area_name.unwrap_or_else(|| state_description.clone()),
            state_description,
            value,
            units: self.price_units.or(self.units).unwrap_or_default(),
        })
    }
}

/// Envelope of an EIA v2 data response.
#[derive(Debug, Deserialize)]
pub(crate) struct EiaResponse {
    pub(crate) response: EiaResponseBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EiaResponseBody {
    #[serde(default)]
    pub(crate) data: Vec<EiaRow>,
}
