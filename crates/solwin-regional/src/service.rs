//! Regional energy data aggregate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use solwin_core::Location;

use crate::eia::DEFAULT_HISTORY_LENGTH;
use crate::error::RegionalResult;
use crate::provider::{RateProvider, RegionResolver};
use crate::region::RegionCode;

/// Electricity price summary for the region around a location.
///
/// Only the residential sector is populated; the commercial and industrial
/// fields are always `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalEnergyData {
    /// Two-letter region code.
    pub state_code: RegionCode,
    /// Region name, empty when no rate data exists.
    pub state_name: String,
    /// Latest residential price.
    pub average_residential_rate: Option<f64>,
    /// Latest commercial price.
    pub average_commercial_rate: Option<f64>,
    /// Latest industrial price.
    pub average_industrial_rate: Option<f64>,
    /// Where the residential price came from.
    pub residential_source_info: Option<String>,
    /// Where the commercial price came from.
    pub commercial_source_info: Option<String>,
    /// Where the industrial price came from.
    pub industrial_source_info: Option<String>,
    /// When this summary was assembled.
    pub last_updated: DateTime<Utc>,
}

/// Combines a region resolver and a rate provider.
#[derive(Clone)]
pub struct RegionalEnergyService {
    resolver: Arc<dyn RegionResolver>,
    rates: Arc<dyn RateProvider>,
    history_length: usize,
}

impl std::fmt::Debug for RegionalEnergyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionalEnergyService")
            .field("history_length", &self.history_length)
            .finish_non_exhaustive()
    }
}

impl RegionalEnergyService {
    /// Create a service.
    #[must_use]
    pub fn new(resolver: Arc<dyn RegionResolver>, rates: Arc<dyn RateProvider>) -> Self {
        Self {
            resolver,
            rates,
            history_length: DEFAULT_HISTORY_LENGTH,
        }
    }

    /// Number of records requested per lookup.
    #[must_use]
    pub fn with_history_length(mut self, history_length: usize) -> Self {
        self.history_length = history_length.max(1);
        self
    }

    /// The rate provider.
    #[must_use]
    pub fn rates(&self) -> &Arc<dyn RateProvider> {
        &self.rates
    }

    /// Resolve `location` to a region and summarize its latest rates.
    ///
    /// # Errors
    ///
    /// Propagates resolver and provider failures. A region without rate
    /// data is not an error; its rate fields are `None`.
    pub async fn regional_energy_data(
        &self,
        location: Location,
    ) -> RegionalResult<RegionalEnergyData> {
        let state_code = self.resolver.resolve_region(location).await?;
        debug!(%state_code, "Resolved region");

        let history = self
            .rates
            .fetch_price_history(&state_code, self.history_length)
            .await?;
        let latest = history.first();

        let data = RegionalEnergyData {
            state_code,
            state_name: latest
                .map(|r| r.state_description.clone())
                .unwrap_or_default(),
            average_residential_rate: latest.map(|r| r.value),
            average_commercial_rate: None,
            average_industrial_rate: None,
            residential_source_info: latest.map(|r| format!("EIA data for {}", r.period)),
            commercial_source_info: None,
            industrial_source_info: None,
            last_updated: Utc::now(),
        };
        info!(
            state_code = %data.state_code,
            residential_rate = ?data.average_residential_rate,
            "Regional energy data assembled"
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegionalError;
    use crate::rate::RateRecord;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedResolver(Option<&'static str>);

    #[async_trait]
    impl RegionResolver for FixedResolver {
        async fn resolve_region(&self, _location: Location) -> RegionalResult<RegionCode> {
            match self.0 {
                Some(code) => RegionCode::parse(code),
                None => Err(RegionalError::NotFound("nothing here".into())),
            }
        }
    }

    #[derive(Default)]
    struct FixedRates {
        records: Vec<RateRecord>,
        requests: Mutex<Vec<(RegionCode, usize)>>,
    }

    #[async_trait]
    impl RateProvider for FixedRates {
        async fn fetch_price_history(
            &self,
            region: &RegionCode,
            limit: usize,
        ) -> RegionalResult<Vec<RateRecord>> {
            self.requests.lock().unwrap().push((*region, limit));
            Ok(self.records.iter().take(limit).cloned().collect())
        }
    }

    fn record(period: &str, value: f64) -> RateRecord {
        RateRecord {
            period: period.into(),
            area_name: "Colorado".into(),
            state_description: "Colorado".into(),
            value,
            units: "cents per kilowatt-hour".into(),
        }
    }

    #[tokio::test]
    async fn test_summary_from_latest_record() {
        let rates = Arc::new(FixedRates {
            records: vec![record("2024-06", 15.3), record("2024-05", 14.9)],
            ..FixedRates::default()
        });
        let service = RegionalEnergyService::new(Arc::new(FixedResolver(Some("co"))), rates.clone());

        let data = service
            .regional_energy_data(solwin_test::test_location())
            .await
            .unwrap();
        assert_eq!(data.state_code.as_str(), "CO");
        assert_eq!(data.state_name, "Colorado");
        assert_eq!(data.average_residential_rate, Some(15.3));
        assert_eq!(data.residential_source_info.as_deref(), Some("EIA data for 2024-06"));
        assert!(data.average_commercial_rate.is_none());
        assert!(data.industrial_source_info.is_none());

        let requests = rates.requests.lock().unwrap();
        assert_eq!(requests[0].1, DEFAULT_HISTORY_LENGTH);
    }

    #[tokio::test]
    async fn test_no_rate_data_yields_empty_fields() {
        let service = RegionalEnergyService::new(
            Arc::new(FixedResolver(Some("AK"))),
            Arc::new(FixedRates::default()),
        )
        .with_history_length(3);

        let data = service
            .regional_energy_data(Location::new(61.2, -149.9))
            .await
            .unwrap();
        assert_eq!(data.state_code.as_str(), "AK");
        assert_eq!(data.state_name, "");
        assert!(data.average_residential_rate.is_none());
        assert!(data.residential_source_info.is_none());
    }

    #[tokio::test]
    async fn test_resolver_error_propagates() {
        let service = RegionalEnergyService::new(
            Arc::new(FixedResolver(None)),
            Arc::new(FixedRates::default()),
        );
        let err = service
            .regional_energy_data(Location::new(0.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, RegionalError::NotFound(_)));
    }

    #[test]
    fn test_serializes_camel_case() {
        let data = RegionalEnergyData {
            state_code: RegionCode::parse("CO").unwrap(),
            state_name: "Colorado".into(),
            average_residential_rate: Some(15.0),
            average_commercial_rate: None,
            average_industrial_rate: None,
            residential_source_info: Some("EIA data for 2024-06".into()),
            commercial_source_info: None,
            industrial_source_info: None,
            last_updated: Utc::now(),
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["stateCode"], "CO");
        assert_eq!(value["averageResidentialRate"], 15.0);
        assert!(value["averageCommercialRate"].is_null());
        assert!(value.get("lastUpdated").is_some());
    }
}
