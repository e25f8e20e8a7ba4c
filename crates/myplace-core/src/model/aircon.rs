// ── Aircon and zone domain types ──
//
// Field names follow the hub's camelCase wire names. Every field is
// optional because the hub omits whatever it has no value for; anything
// this crate does not model lands in `extra` and survives a round trip.
// Fields that are only ever shown as attributes stay opaque `Value`s, so
// an odd type there cannot fail the whole snapshot.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::entity_id::ZoneId;
use super::mode::AirconMode;

/// One ducted aircon unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aircon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<AirconMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_temperature_heat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_temperature_cool: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_modes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan_speed_heat: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aircon_state: Option<Value>,
    /// Zones served by this unit, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub zone_order: Vec<ZoneId>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A controllable zone, served by exactly one aircon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_sensor_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_temperature_heat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_temperature_cool: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aircon_mode: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_type: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_clickable: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_priority_zone: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_priority_zone_active: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_percent_cool: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_percent_heat: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_percent: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Zone {
    /// Hidden zones are never exposed to consumers.
    pub fn is_visible(&self) -> bool {
        self.is_visible.unwrap_or(false)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn aircon_keeps_unknown_fields() {
        let raw = json!({
            "name": "Ducted",
            "isOn": true,
            "mode": "cool",
            "zoneOrder": ["z01", "z02"],
            "firmware": "2.1.0"
        });
        let aircon: Aircon = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(aircon.is_on, Some(true));
        assert_eq!(aircon.mode, Some(AirconMode::Cool));
        assert_eq!(aircon.zone_order, vec![ZoneId::from("z01"), ZoneId::from("z02")]);
        assert_eq!(aircon.extra.get("firmware"), Some(&json!("2.1.0")));
        assert_eq!(serde_json::to_value(&aircon).unwrap(), raw);
    }

    #[test]
    fn attribute_fields_accept_any_shape() {
        let aircon: Aircon = serde_json::from_value(json!({
            "mode": "heat",
            "allowedModes": { "heat": true }
        }))
        .unwrap();
        assert_eq!(aircon.allowed_modes, Some(json!({ "heat": true })));
        assert_eq!(aircon.mode, Some(AirconMode::Heat));

        let zone: Zone = serde_json::from_value(json!({
            "isOn": true,
            "isClickable": 1,
            "airconMode": 3,
            "actualPercent": "50"
        }))
        .unwrap();
        assert_eq!(zone.is_on, Some(true));
        assert_eq!(zone.is_clickable, Some(json!(1)));
        assert_eq!(zone.aircon_mode, Some(json!(3)));
        assert_eq!(zone.actual_percent, Some(json!("50")));
    }

    #[test]
    fn zone_with_missing_fields() {
        let zone: Zone = serde_json::from_value(json!({ "name": "Study" })).unwrap();
        assert_eq!(zone.is_on, None);
        assert!(!zone.is_visible());
        assert!(zone.extra.is_empty());
    }
}
