//! Collaborator traits.

use async_trait::async_trait;

use solwin_core::Location;

use crate::error::{RegionalError, RegionalResult};
use crate::rate::RateRecord;
use crate::region::RegionCode;

/// Turns a coordinate into the code of the region containing it.
#[async_trait]
pub trait RegionResolver: Send + Sync {
    /// Resolve `location` to a region code.
    async fn resolve_region(&self, location: Location) -> RegionalResult<RegionCode>;
}

/// Source of regional electricity rates.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Up to `limit` most recent records for `region`, newest first.
    async fn fetch_price_history(
        &self,
        region: &RegionCode,
        limit: usize,
    ) -> RegionalResult<Vec<RateRecord>>;

    /// The most recent record for `region`.
    ///
    /// Fails with [`RegionalError::NoData`] when there is none.
    async fn fetch_regional_rate(&self, region: &RegionCode) -> RegionalResult<RateRecord> {
        self.fetch_price_history(region, 1)
            .await?
            .into_iter()
            .next()
            .ok_or(RegionalError::NoData(*region))
    }

    /// The most recent national average.
    async fn national_average(&self) -> RegionalResult<RateRecord> {
        self.fetch_regional_rate(&RegionCode::national()).await
    }
}
