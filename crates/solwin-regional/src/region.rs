//! Region codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{RegionalError, RegionalResult};

/// A two-letter jurisdiction code such as `CO`, stored upper-case.
///
/// Only two-letter codes are representable. The rate data is keyed by US
/// postal codes, so geocoder names of any other shape resolve to
/// [`RegionalError::NotFound`] instead of being queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionCode([u8; 2]);

impl RegionCode {
    /// Code of the national aggregate.
    pub const NATIONAL: Self = Self(*b"US");

    /// Parse a code, accepting either case.
    ///
    /// # Errors
    ///
    /// Returns [`RegionalError::InvalidRegionCode`] unless `raw` is exactly
    /// two ASCII letters.
    pub fn parse(raw: &str) -> RegionalResult<Self> {
        match raw.trim().as_bytes() {
            [a, b] if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() => {
                Ok(Self([a.to_ascii_uppercase(), b.to_ascii_uppercase()]))
            },
            _ => Err(RegionalError::InvalidRegionCode(raw.to_string())),
        }
    }

    /// The national aggregate, `US`.
    #[must_use]
    pub fn national() -> Self {
        Self::NATIONAL
    }

    /// Whether this is the national aggregate.
    #[must_use]
    pub fn is_national(self) -> bool {
        self == Self::NATIONAL
    }

    /// The code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Both bytes are ASCII letters by construction.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionCode {
    type Err = RegionalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for RegionCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RegionCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uppercases() {
        let code = RegionCode::parse("co").unwrap();
        assert_eq!(code.as_str(), "CO");
        assert_eq!(code.to_string(), "CO");
        assert_eq!(" ca ".parse::<RegionCode>().unwrap().as_str(), "CA");
    }

    #[test]
    fn test_parse_rejects_bad_codes() {
        for raw in ["", "C", "COL", "C1", "é", "  "] {
            assert!(
                matches!(RegionCode::parse(raw), Err(RegionalError::InvalidRegionCode(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_national() {
        assert!(RegionCode::national().is_national());
        assert!(!RegionCode::parse("NY").unwrap().is_national());
    }

    #[test]
    fn test_serde_as_string() {
        let code: RegionCode = serde_json::from_str("\"tx\"").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"TX\"");
        assert!(serde_json::from_str::<RegionCode>("\"Texas\"").is_err());
    }
}
