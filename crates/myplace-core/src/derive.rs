// ── State derivation ──
//
// Pure functions from a snapshot plus an entity to user-facing values.
// Nothing in here holds state: the sticky on/off fallback is an explicit
// `LastKnownOn` value passed in and handed back.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::model::{Aircon, AirconId, AirconMode, EntityRef, HvacMode, Snapshot, Zone};

// ── Sticky on/off ───────────────────────────────────────────────────

/// Last explicit `isOn` observed for one entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastKnownOn {
    last: Option<bool>,
}

impl LastKnownOn {
    pub fn new(last: Option<bool>) -> Self {
        Self { last }
    }

    pub fn get(self) -> Option<bool> {
        self.last
    }
}

/// Prefer the explicit value; without one fall back to the last observed
/// value, then to `false`. Every explicit value is remembered.
pub fn resolve_is_on(explicit: Option<bool>, memo: LastKnownOn) -> (bool, LastKnownOn) {
    match explicit {
        Some(on) => (on, LastKnownOn::new(Some(on))),
        None => (memo.last.unwrap_or(false), memo),
    }
}

/// The `isOn` field exactly as the snapshot carries it.
pub fn explicit_is_on(snapshot: &Snapshot, entity: &EntityRef) -> Option<bool> {
    match entity {
        EntityRef::Aircon(id) => snapshot.aircon(id)?.is_on,
        EntityRef::Zone(id) => snapshot.zone(id)?.is_on,
    }
}

pub fn is_on(snapshot: &Snapshot, entity: &EntityRef, memo: LastKnownOn) -> (bool, LastKnownOn) {
    resolve_is_on(explicit_is_on(snapshot, entity), memo)
}

// ── Temperatures ────────────────────────────────────────────────────

pub fn current_temperature(snapshot: &Snapshot, entity: &EntityRef) -> Option<f64> {
    match entity {
        EntityRef::Aircon(id) => snapshot.aircon(id)?.actual_temperature,
        EntityRef::Zone(id) => snapshot.zone(id)?.temperature_sensor_value,
    }
}

/// Mode of the aircon governing `entity`, `heat` when unknown.
pub fn governing_mode(snapshot: &Snapshot, entity: &EntityRef) -> AirconMode {
    snapshot
        .governing_aircon(entity)
        .and_then(|aircon| aircon.mode.clone())
        .unwrap_or(AirconMode::Heat)
}

/// The setpoint selected by the governing aircon's mode: heat or cool.
/// Dry, fan and unrecognized modes have no setpoint.
pub fn target_temperature(snapshot: &Snapshot, entity: &EntityRef) -> Option<f64> {
    let (heat, cool) = match entity {
        EntityRef::Aircon(id) => {
            let aircon = snapshot.aircon(id)?;
            (aircon.target_temperature_heat, aircon.target_temperature_cool)
        }
        EntityRef::Zone(id) => {
            let zone = snapshot.zone(id)?;
            (zone.target_temperature_heat, zone.target_temperature_cool)
        }
    };

    match governing_mode(snapshot, entity) {
        AirconMode::Heat => heat,
        AirconMode::Cool => cool,
        _ => None,
    }
}

// ── Modes ───────────────────────────────────────────────────────────

pub fn hvac_mode(
    snapshot: &Snapshot,
    entity: &EntityRef,
    memo: LastKnownOn,
) -> (HvacMode, LastKnownOn) {
    let (on, memo) = is_on(snapshot, entity, memo);
    (hvac_mode_for(snapshot, entity, on), memo)
}

fn hvac_mode_for(snapshot: &Snapshot, entity: &EntityRef, on: bool) -> HvacMode {
    if !on {
        return HvacMode::Off;
    }
    match entity {
        EntityRef::Zone(_) => HvacMode::Auto,
        EntityRef::Aircon(id) => match snapshot.aircon(id).and_then(|a| a.mode.as_ref()) {
            Some(AirconMode::Heat) => HvacMode::Heat,
            Some(AirconMode::Cool) => HvacMode::Cool,
            Some(AirconMode::Dry) => HvacMode::Dry,
            Some(AirconMode::Fan) => HvacMode::FanOnly,
            Some(AirconMode::Other(_)) | None => HvacMode::Off,
        },
    }
}

/// Aircon mode sensor: `"off"`, the raw mode string, or `"unknown"`.
pub fn mode_state(snapshot: &Snapshot, id: &AirconId, memo: LastKnownOn) -> (String, LastKnownOn) {
    let entity = EntityRef::Aircon(id.clone());
    let (on, memo) = is_on(snapshot, &entity, memo);
    (mode_state_for(snapshot, id, on), memo)
}

fn mode_state_for(snapshot: &Snapshot, id: &AirconId, on: bool) -> String {
    if !on {
        return "off".to_owned();
    }
    snapshot
        .aircon(id)
        .and_then(|a| a.mode.as_ref())
        .map_or_else(|| "unknown".to_owned(), |m| m.as_str().to_owned())
}

/// `"on"` / `"off"` from the resolved `isOn`.
pub fn power_state(
    snapshot: &Snapshot,
    entity: &EntityRef,
    memo: LastKnownOn,
) -> (&'static str, LastKnownOn) {
    let (on, memo) = is_on(snapshot, entity, memo);
    (if on { "on" } else { "off" }, memo)
}

pub fn supported_hvac_modes(entity: &EntityRef) -> &'static [HvacMode] {
    match entity {
        EntityRef::Zone(_) => &HvacMode::ZONE_MODES,
        EntityRef::Aircon(_) => &HvacMode::AIRCON_MODES,
    }
}

pub fn display_name(snapshot: &Snapshot, entity: &EntityRef) -> String {
    snapshot.name_of(entity).map_or_else(
        || match entity {
            EntityRef::Aircon(_) => "Aircon".to_owned(),
            EntityRef::Zone(_) => "Zone".to_owned(),
        },
        str::to_owned,
    )
}

// ── Attributes ──────────────────────────────────────────────────────

/// Sensor-style attributes, each an independent optional lookup.
pub fn attributes(
    snapshot: &Snapshot,
    entity: &EntityRef,
    memo: LastKnownOn,
) -> (Map<String, Value>, LastKnownOn) {
    let (on, memo) = is_on(snapshot, entity, memo);
    (attributes_for(snapshot, entity, on), memo)
}

fn attributes_for(snapshot: &Snapshot, entity: &EntityRef, on: bool) -> Map<String, Value> {
    let mut attrs = Map::new();
    attrs.insert("is_on".into(), json!(on));

    match entity {
        EntityRef::Aircon(id) => {
            let aircon = snapshot.aircon(id);
            let field = |f: fn(&Aircon) -> Value| aircon.map_or(Value::Null, f);
            let raw = |f: fn(&Aircon) -> Option<&Value>| {
                aircon.and_then(f).cloned().unwrap_or(Value::Null)
            };

            attrs.insert("actual_temperature".into(), field(|a| json!(a.actual_temperature)));
            attrs.insert(
                "target_temperature_heat".into(),
                field(|a| json!(a.target_temperature_heat)),
            );
            attrs.insert(
                "target_temperature_cool".into(),
                field(|a| json!(a.target_temperature_cool)),
            );
            attrs.insert("fan_speed_heat".into(), raw(|a| a.fan_speed_heat.as_ref()));
            attrs.insert(
                "allowed_modes".into(),
                aircon
                    .and_then(|a| a.allowed_modes.clone())
                    .unwrap_or_else(|| json!([])),
            );
            attrs.insert("aircon_state".into(), raw(|a| a.aircon_state.as_ref()));
        }
        EntityRef::Zone(id) => {
            let zone = snapshot.zone(id);
            let field = |f: fn(&Zone) -> Value| zone.map_or(Value::Null, f);
            let raw = |f: fn(&Zone) -> Option<&Value>| {
                zone.and_then(f).cloned().unwrap_or(Value::Null)
            };

            attrs.insert("aircon_mode".into(), raw(|z| z.aircon_mode.as_ref()));
            attrs.insert(
                "target_temperature_heat".into(),
                field(|z| json!(z.target_temperature_heat)),
            );
            attrs.insert(
                "target_temperature_cool".into(),
                field(|z| json!(z.target_temperature_cool)),
            );
            attrs.insert("zone_type".into(), raw(|z| z.zone_type.as_ref()));
            attrs.insert("is_clickable".into(), raw(|z| z.is_clickable.as_ref()));
            attrs.insert("is_priority_zone".into(), raw(|z| z.is_priority_zone.as_ref()));
            attrs.insert(
                "is_priority_zone_active".into(),
                raw(|z| z.is_priority_zone_active.as_ref()),
            );
            attrs.insert("target_percent_cool".into(), raw(|z| z.target_percent_cool.as_ref()));
            attrs.insert("target_percent_heat".into(), raw(|z| z.target_percent_heat.as_ref()));
            attrs.insert("actual_percent".into(), raw(|z| z.actual_percent.as_ref()));
        }
    }

    attrs
}

// ── Aggregated view ─────────────────────────────────────────────────

/// Everything a consumer shows for one entity, derived in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
    pub entity: EntityRef,
    pub name: String,
    pub hvac_mode: HvacMode,
    pub is_on: bool,
    pub current_temperature: Option<f64>,
    pub target_temperature: Option<f64>,
    /// Aircons only.
    pub mode_state: Option<String>,
    pub supported_modes: Vec<HvacMode>,
    pub attributes: Map<String, Value>,
}

/// Derive the full view of `entity`, resolving `isOn` exactly once.
pub fn entity_state(
    snapshot: &Snapshot,
    entity: &EntityRef,
    memo: LastKnownOn,
) -> (EntityState, LastKnownOn) {
    let (on, memo) = is_on(snapshot, entity, memo);

    let state = EntityState {
        entity: entity.clone(),
        name: display_name(snapshot, entity),
        hvac_mode: hvac_mode_for(snapshot, entity, on),
        is_on: on,
        current_temperature: current_temperature(snapshot, entity),
        target_temperature: target_temperature(snapshot, entity),
        mode_state: match entity {
            EntityRef::Aircon(id) => Some(mode_state_for(snapshot, id, on)),
            EntityRef::Zone(_) => None,
        },
        supported_modes: supported_hvac_modes(entity).to_vec(),
        attributes: attributes_for(snapshot, entity, on),
    };

    (state, memo)
}
