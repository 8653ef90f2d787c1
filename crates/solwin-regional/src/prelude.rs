//! Prelude module - commonly used types for convenient import.
//!
//! Use `use solwin_regional::prelude::*;` to import all essential types.

pub use crate::{
    EiaClient, GoogleGeocoder, RateProvider, RateRecord, RegionCode, RegionResolver,
    RegionalEnergyData, RegionalEnergyService, RegionalError, RegionalResult,
};
