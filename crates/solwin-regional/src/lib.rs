//! Solwin Regional - electricity rate and geocoding collaborators.
//!
//! The frame protocol only needs two narrow interfaces from the outside
//! world:
//!
//! - [`RegionResolver`]: coordinate to [`RegionCode`], backed by
//!   [`GoogleGeocoder`].
//! - [`RateProvider`]: region code to [`RateRecord`], backed by
//!   [`EiaClient`].
//!
//! [`RegionalEnergyService`] combines both into the summary the dashboard
//! displays.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod eia;
mod error;
mod geocode;
mod provider;
mod rate;
mod region;
mod service;

#[cfg(test)]
mod test_support;

pub use eia::{DEFAULT_EIA_BASE_URL, DEFAULT_HISTORY_LENGTH, EiaClient};
pub use error::{RegionalError, RegionalResult};
pub use geocode::{DEFAULT_GEOCODE_BASE_URL, GoogleGeocoder};
pub use provider::{RateProvider, RegionResolver};
pub use rate::RateRecord;
pub use region::RegionCode;
pub use service::{RegionalEnergyData, RegionalEnergyService};
