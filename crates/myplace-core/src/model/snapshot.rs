// ── Full hub snapshot ──
//
// The complete aircon + zone state from one `GetFullDataEvent` reply.
// Zones are owned by the snapshot, not by their aircon; the aircon's
// `zoneOrder` is a back-reference resolved on demand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::aircon::{Aircon, Zone};
use super::entity_id::{AirconId, EntityRef, ZoneId};

/// The decoded `body` of a full-data reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub aircons: BTreeMap<AirconId, Aircon>,
    #[serde(default)]
    pub zones: BTreeMap<ZoneId, Zone>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Snapshot {
    /// Both maps present and non-empty; anything less is not a usable poll.
    pub fn is_complete(&self) -> bool {
        !self.aircons.is_empty() && !self.zones.is_empty()
    }

    pub fn aircon(&self, id: &AirconId) -> Option<&Aircon> {
        self.aircons.get(id)
    }

    pub fn zone(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.get(id)
    }

    /// The aircon whose `zoneOrder` lists `zone`.
    pub fn owner_of(&self, zone: &ZoneId) -> Option<&AirconId> {
        self.aircons
            .iter()
            .find(|(_, aircon)| aircon.zone_order.contains(zone))
            .map(|(id, _)| id)
    }

    /// The aircon governing `entity`: itself, or the owner of a zone.
    pub fn governing_aircon(&self, entity: &EntityRef) -> Option<&Aircon> {
        match entity {
            EntityRef::Aircon(id) => self.aircon(id),
            EntityRef::Zone(id) => self.owner_of(id).and_then(|owner| self.aircon(owner)),
        }
    }

    /// Whether `entity` is one of [`Self::exposed_entities`]. Hidden zones
    /// and zones no aircon lists are not.
    pub fn is_exposed(&self, entity: &EntityRef) -> bool {
        match entity {
            EntityRef::Aircon(id) => self.aircons.contains_key(id),
            EntityRef::Zone(id) => {
                self.zone(id).is_some_and(Zone::is_visible) && self.owner_of(id).is_some()
            }
        }
    }

    /// Entities a consumer may see: every aircon, then for each aircon the
    /// zones in its `zoneOrder` that exist and are visible.
    pub fn exposed_entities(&self) -> Vec<EntityRef> {
        let mut entities: Vec<EntityRef> = self
            .aircons
            .keys()
            .cloned()
            .map(EntityRef::Aircon)
            .collect();

        for aircon in self.aircons.values() {
            for zone_id in &aircon.zone_order {
                let visible = self.zone(zone_id).is_some_and(Zone::is_visible);
                let entity = EntityRef::Zone(zone_id.clone());
                if visible && !entities.contains(&entity) {
                    entities.push(entity);
                }
            }
        }

        entities
    }

    /// Find an exposed entity by exact id, or by case-insensitive name.
    pub fn resolve_target(&self, query: &str) -> Option<EntityRef> {
        let exposed = self.exposed_entities();

        if let Some(hit) = exposed.iter().find(|e| e.id() == query) {
            return Some(hit.clone());
        }

        exposed.into_iter().find(|entity| {
            self.name_of(entity)
                .is_some_and(|name| name.eq_ignore_ascii_case(query))
        })
    }

    /// The raw `name` field of an entity, if it has one.
    pub fn name_of(&self, entity: &EntityRef) -> Option<&str> {
        match entity {
            EntityRef::Aircon(id) => self.aircon(id)?.name.as_deref(),
            EntityRef::Zone(id) => self.zone(id)?.name.as_deref(),
        }
    }
}
