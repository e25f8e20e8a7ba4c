// ── Operating modes ──
//
// `AirconMode` is what the hub reports in the `mode` field; it keeps
// unknown strings instead of failing the whole snapshot. `HvacMode` is the
// consumer-facing vocabulary shared by aircons and zones.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString};

use myplace_api::HubMode;

/// Aircon operating mode as reported by the hub.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AirconMode {
    Heat,
    Cool,
    Dry,
    Fan,
    /// A mode string this crate does not recognize, kept verbatim.
    Other(String),
}

impl AirconMode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Heat => "heat",
            Self::Cool => "cool",
            Self::Dry => "dry",
            Self::Fan => "fan",
            Self::Other(s) => s,
        }
    }

    /// The wire mode for commands, if this is one the hub accepts.
    pub fn to_hub_mode(&self) -> Option<HubMode> {
        match self {
            Self::Heat => Some(HubMode::Heat),
            Self::Cool => Some(HubMode::Cool),
            Self::Dry => Some(HubMode::Dry),
            Self::Fan => Some(HubMode::Fan),
            Self::Other(_) => None,
        }
    }
}

impl From<String> for AirconMode {
    fn from(s: String) -> Self {
        match s.as_str() {
            "heat" => Self::Heat,
            "cool" => Self::Cool,
            "dry" => Self::Dry,
            "fan" => Self::Fan,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for AirconMode {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<AirconMode> for String {
    fn from(mode: AirconMode) -> Self {
        match mode {
            AirconMode::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

impl From<HubMode> for AirconMode {
    fn from(mode: HubMode) -> Self {
        match mode {
            HubMode::Heat => Self::Heat,
            HubMode::Cool => Self::Cool,
            HubMode::Dry => Self::Dry,
            HubMode::Fan => Self::Fan,
        }
    }
}

impl fmt::Display for AirconMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consumer-facing HVAC mode.
///
/// Zones only ever report `Auto` or `Off`; aircons report `Off` or one of
/// the four operating modes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HvacMode {
    Off,
    Auto,
    Heat,
    Cool,
    Dry,
    #[strum(to_string = "fan_only", serialize = "fan")]
    FanOnly,
}

impl HvacMode {
    /// Modes a zone accepts.
    pub const ZONE_MODES: [Self; 2] = [Self::Auto, Self::Off];

    /// Modes an aircon accepts.
    pub const AIRCON_MODES: [Self; 5] =
        [Self::Heat, Self::Cool, Self::Dry, Self::FanOnly, Self::Off];

    /// The wire mode an aircon is switched to for this HVAC mode.
    pub fn to_hub_mode(self) -> Option<HubMode> {
        match self {
            Self::Heat => Some(HubMode::Heat),
            Self::Cool => Some(HubMode::Cool),
            Self::Dry => Some(HubMode::Dry),
            Self::FanOnly => Some(HubMode::Fan),
            Self::Off | Self::Auto => None,
        }
    }
}
