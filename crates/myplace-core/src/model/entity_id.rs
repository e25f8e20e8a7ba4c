// ── Core identity types ──
//
// Aircon and zone ids are opaque strings taken from the map keys of the
// hub's full-data reply. They are distinct types so a zone id can never be
// handed to an aircon command by accident.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_owned()))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of an aircon unit (key of the `aircons` map).
    AirconId
);

string_id!(
    /// Identifier of a zone (key of the `zones` map).
    ZoneId
);

// ── EntityRef ───────────────────────────────────────────────────────

/// Anything a consumer can read state from or send an intent to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Aircon(AirconId),
    Zone(ZoneId),
}

impl EntityRef {
    pub fn aircon(id: impl Into<String>) -> Self {
        Self::Aircon(AirconId::new(id))
    }

    pub fn zone(id: impl Into<String>) -> Self {
        Self::Zone(ZoneId::new(id))
    }

    pub fn is_zone(&self) -> bool {
        matches!(self, Self::Zone(_))
    }

    /// The raw id, regardless of kind.
    pub fn id(&self) -> &str {
        match self {
            Self::Aircon(id) => id.as_str(),
            Self::Zone(id) => id.as_str(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Aircon(_) => "aircon",
            Self::Zone(_) => "zone",
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}
