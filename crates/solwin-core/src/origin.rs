//! Delivery target for posted messages.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Origin a posted message may be delivered to.
///
/// `Any` is the `"*"` wildcard: the receiving document's origin is not
/// checked. `Exact` only delivers when the receiver's origin matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TargetOrigin {
    /// Deliver regardless of the receiver's origin.
    #[default]
    Any,
    /// Deliver only to a document served from this origin.
    Exact(String),
}

impl TargetOrigin {
    /// The wildcard sentinel as it appears on the wire.
    pub const WILDCARD: &'static str = "*";

    /// Parse a target origin string. `"*"` is the wildcard.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw == Self::WILDCARD {
            Self::Any
        } else {
            Self::Exact(raw.to_owned())
        }
    }

    /// String form, `"*"` for the wildcard.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Any => Self::WILDCARD,
            Self::Exact(origin) => origin,
        }
    }

    /// Whether this is still the wildcard.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Whether a document served from `origin` may receive the message.
    #[must_use]
    pub fn admits(&self, origin: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => expected == origin,
        }
    }
}

impl fmt::Display for TargetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TargetOrigin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TargetOrigin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}
