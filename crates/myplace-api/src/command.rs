//! Typed hub commands.
//!
//! The hub accepts a batch object `{"commands": [{"__type": ..., ...}]}`.
//! Every variant of [`HubCommand`] serializes to one entry of that list,
//! with the variant name as the `__type` tag and camelCase fields.

use serde::{Deserialize, Serialize};

/// Operating mode as the hub spells it on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HubMode {
    Heat,
    Cool,
    Dry,
    Fan,
}

impl HubMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heat => "heat",
            Self::Cool => "cool",
            Self::Dry => "dry",
            Self::Fan => "fan",
        }
    }
}

impl std::fmt::Display for HubMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single command understood by the hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "__type", rename_all_fields = "camelCase")]
pub enum HubCommand {
    /// Ask for the full aircon + zone state. Only command that gets a reply.
    GetFullDataEvent,
    SetZoneHeatTemperature { zone_id: String, temperature: i64 },
    SetZoneCoolTemperature { zone_id: String, temperature: i64 },
    SetAirconHeatTemperature { aircon_id: String, temperature: i64 },
    SetAirconCoolTemperature { aircon_id: String, temperature: i64 },
    SetZoneOpenClose { zone_id: String, is_open: bool },
    SetAirconOnOff { aircon_id: String, is_on: bool },
    SetAirconMode { aircon_id: String, mode: HubMode },
}

impl HubCommand {
    /// The `__type` tag this command serializes under.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetFullDataEvent => "GetFullDataEvent",
            Self::SetZoneHeatTemperature { .. } => "SetZoneHeatTemperature",
            Self::SetZoneCoolTemperature { .. } => "SetZoneCoolTemperature",
            Self::SetAirconHeatTemperature { .. } => "SetAirconHeatTemperature",
            Self::SetAirconCoolTemperature { .. } => "SetAirconCoolTemperature",
            Self::SetZoneOpenClose { .. } => "SetZoneOpenClose",
            Self::SetAirconOnOff { .. } => "SetAirconOnOff",
            Self::SetAirconMode { .. } => "SetAirconMode",
        }
    }
}

/// An ordered batch of commands delivered in one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandBatch {
    pub commands: Vec<HubCommand>,
}

impl CommandBatch {
    pub fn new(commands: Vec<HubCommand>) -> Self {
        Self { commands }
    }

    pub fn single(command: HubCommand) -> Self {
        Self {
            commands: vec![command],
        }
    }

    /// The batch that requests a full state dump.
    pub fn full_data() -> Self {
        Self::single(HubCommand::GetFullDataEvent)
    }

    /// Command names in order, for log lines.
    pub fn names(&self) -> Vec<&'static str> {
        self.commands.iter().map(HubCommand::name).collect()
    }
}

impl From<HubCommand> for CommandBatch {
    fn from(command: HubCommand) -> Self {
        Self::single(command)
    }
}
