//! EIA retail electricity price client.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};

use crate::error::{RegionalError, RegionalResult};
use crate::provider::RateProvider;
use crate::rate::{EiaResponse, RateRecord};
use crate::region::RegionCode;

/// Public EIA v2 API root.
pub const DEFAULT_EIA_BASE_URL: &str = "https://api.eia.gov/v2";

/// Records fetched per region when no length is configured.
pub const DEFAULT_HISTORY_LENGTH: usize = 5;

const RETAIL_SALES_PATH: &str = "electricity/retail-sales/data";

/// Residential sector facet.
const RESIDENTIAL_SECTOR: &str = "RES";

/// Client for the EIA `electricity/retail-sales` dataset.
#[derive(Clone)]
pub struct EiaClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for EiaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EiaClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish_non_exhaustive()
    }
}

impl EiaClient {
    /// Client against the public API.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_EIA_BASE_URL.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// Use another API root, e.g. a proxy or a test server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a preconfigured HTTP client (timeouts, proxies).
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/{RETAIL_SALES_PATH}", self.base_url.trim_end_matches('/'))
    }

    /// Query parameters for the newest `limit` residential prices of `region`.
    fn query(api_key: &str, region: &RegionCode, limit: usize) -> Vec<(&'static str, String)> {
        vec![
            ("api_key", api_key.to_string()),
            ("frequency", "monthly".to_string()),
            ("data[0]", "price".to_string()),
            ("facets[sectorid][]", RESIDENTIAL_SECTOR.to_string()),
            ("facets[stateid][]", region.to_string()),
            ("sort[0][column]", "period".to_string()),
            ("sort[0][direction]", "desc".to_string()),
            ("offset", "0".to_string()),
            ("length", limit.to_string()),
        ]
    }
}

#[async_trait]
impl RateProvider for EiaClient {
    async fn fetch_price_history(
        &self,
        region: &RegionCode,
        limit: usize,
    ) -> RegionalResult<Vec<RateRecord>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| RegionalError::ApiKeyNotConfigured {
                provider: "eia".to_string(),
            })?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        debug!(%region, limit, "Fetching EIA price history");
        let response = self
            .client
            .get(self.endpoint())
            .query(&Self::query(api_key, region, limit))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, %region, body = %body, "EIA API error");
            return Err(RegionalError::ApiRequestFailed(format!(
                "HTTP {}: {body}",
                status.as_u16()
            )));
        }

        let parsed: EiaResponse = response
            .json()
            .await
            .map_err(|e| RegionalError::InvalidResponse(e.to_string()))?;

        let records: Vec<RateRecord> = parsed
            .response
            .data
            .into_iter()
            .filter_map(crate::rate::EiaRow::into_record)
            .take(limit)
            .collect();
        debug!(%region, count = records.len(), "EIA price history received");
        Ok(records)
    }
}
