// ── Optimistic mutator ──
//
// Turns a control intent into hub commands plus a local patch. The patch
// is published before the command leaves, the command leaves before the
// reconciling poll is requested.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, warn};

use myplace_api::{CommandBatch, CommandTransport, HubCommand};

use crate::config::{MAX_SETPOINT, MIN_SETPOINT};
use crate::derive;
use crate::error::CoreError;
use crate::model::{AirconMode, EntityRef, HvacMode, Snapshot};
use crate::store::{LastKnownTable, Patch, SetpointKind, SnapshotStore};

// ── Intents and outcomes ────────────────────────────────────────────

/// A control request from a consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Change the active setpoint. `None` models a request that carried no
    /// temperature at all.
    SetTemperature {
        target: EntityRef,
        temperature: Option<f64>,
    },
    SetHvacMode { target: EntityRef, mode: HvacMode },
}

impl Intent {
    pub fn set_temperature(target: EntityRef, temperature: f64) -> Self {
        Self::SetTemperature {
            target,
            temperature: Some(temperature),
        }
    }

    pub fn set_hvac_mode(target: EntityRef, mode: HvacMode) -> Self {
        Self::SetHvacMode { target, mode }
    }

    pub fn target(&self) -> &EntityRef {
        match self {
            Self::SetTemperature { target, .. } | Self::SetHvacMode { target, .. } => target,
        }
    }
}

/// Why an intent was dropped without sending anything.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// No snapshot has been fetched yet.
    NoSnapshot,
    UnknownTarget(EntityRef),
    MissingTemperature,
    NonFiniteTemperature,
    OutOfRange { value: i64 },
    UnsupportedMode { target: EntityRef, mode: HvacMode },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSnapshot => f.write_str("no hub snapshot available yet"),
            Self::UnknownTarget(target) => write!(f, "unknown target {target}"),
            Self::MissingTemperature => f.write_str("no temperature given"),
            Self::NonFiniteTemperature => f.write_str("temperature is not a finite number"),
            Self::OutOfRange { value } => write!(
                f,
                "temperature {value} outside {MIN_SETPOINT}..={MAX_SETPOINT}"
            ),
            Self::UnsupportedMode { target, mode } => {
                write!(f, "{} does not support mode {mode}", target.kind())
            }
        }
    }
}

/// Result of [`Mutator::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// The batch was sent; `snapshot` is what was published optimistically.
    Applied {
        batch: CommandBatch,
        snapshot: Arc<Snapshot>,
    },
    /// Nothing was patched or sent.
    Rejected(RejectReason),
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

// ── Planning ────────────────────────────────────────────────────────

/// Commands and local effect computed for one intent.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub batch: CommandBatch,
    /// `None` when the intent has no visible local effect (a setpoint
    /// change while the aircon is in dry or fan mode).
    pub patch: Option<Patch>,
    /// On/off value the target is known to have after this intent.
    pub last_known_on: Option<bool>,
}

/// Validate `intent` against `snapshot` and compute what to send and patch.
///
/// Only exposed entities can be controlled; a hidden zone is an unknown
/// target.
pub fn plan(snapshot: &Snapshot, intent: &Intent) -> Result<Plan, RejectReason> {
    let target = intent.target();
    if !snapshot.is_exposed(target) {
        return Err(RejectReason::UnknownTarget(target.clone()));
    }

    match intent {
        Intent::SetTemperature { temperature, .. } => {
            plan_temperature(snapshot, target, *temperature)
        }
        Intent::SetHvacMode { mode, .. } => plan_mode(target, *mode),
    }
}

fn plan_temperature(
    snapshot: &Snapshot,
    target: &EntityRef,
    temperature: Option<f64>,
) -> Result<Plan, RejectReason> {
    let requested = temperature.ok_or(RejectReason::MissingTemperature)?;
    if !requested.is_finite() {
        return Err(RejectReason::NonFiniteTemperature);
    }

    // Truncate toward zero, as the hub only takes whole degrees. Saturates
    // for huge inputs, which the range check then rejects.
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    let value = requested.trunc() as i64;
    if !(MIN_SETPOINT..=MAX_SETPOINT).contains(&value) {
        return Err(RejectReason::OutOfRange { value });
    }

    // Only heat selects the heat setpoint command; every other mode,
    // including dry, fan and unrecognised ones, gets the cool variant.
    let mode = derive::governing_mode(snapshot, target);
    let heat = mode == AirconMode::Heat;

    let command = match (target, heat) {
        (EntityRef::Zone(id), true) => HubCommand::SetZoneHeatTemperature {
            zone_id: id.to_string(),
            temperature: value,
        },
        (EntityRef::Zone(id), false) => HubCommand::SetZoneCoolTemperature {
            zone_id: id.to_string(),
            temperature: value,
        },
        (EntityRef::Aircon(id), true) => HubCommand::SetAirconHeatTemperature {
            aircon_id: id.to_string(),
            temperature: value,
        },
        (EntityRef::Aircon(id), false) => HubCommand::SetAirconCoolTemperature {
            aircon_id: id.to_string(),
            temperature: value,
        },
    };

    let kind = match mode {
        AirconMode::Heat => Some(SetpointKind::Heat),
        AirconMode::Cool => Some(SetpointKind::Cool),
        _ => None,
    };

    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    let patch = kind.map(|kind| Patch::Setpoint {
        entity: target.clone(),
        kind,
        value: value as f64,
    });

    Ok(Plan {
        batch: CommandBatch::single(command),
        patch,
        last_known_on: None,
    })
}

fn plan_mode(target: &EntityRef, mode: HvacMode) -> Result<Plan, RejectReason> {
    match target {
        EntityRef::Zone(id) => {
            let open = match mode {
                HvacMode::Auto => true,
                HvacMode::Off => false,
                _ => {
                    return Err(RejectReason::UnsupportedMode {
                        target: target.clone(),
                        mode,
                    });
                }
            };
            Ok(Plan {
                batch: CommandBatch::single(HubCommand::SetZoneOpenClose {
                    zone_id: id.to_string(),
                    is_open: open,
                }),
                patch: Some(Patch::ZoneOpen {
                    zone: id.clone(),
                    open,
                }),
                last_known_on: Some(open),
            })
        }
        EntityRef::Aircon(id) => {
            if mode == HvacMode::Off {
                return Ok(Plan {
                    batch: CommandBatch::single(HubCommand::SetAirconOnOff {
                        aircon_id: id.to_string(),
                        is_on: false,
                    }),
                    patch: Some(Patch::AirconPower {
                        aircon: id.clone(),
                        on: false,
                        mode: None,
                    }),
                    last_known_on: Some(false),
                });
            }

            let Some(hub_mode) = mode.to_hub_mode() else {
                return Err(RejectReason::UnsupportedMode {
                    target: target.clone(),
                    mode,
                });
            };
            Ok(Plan {
                batch: CommandBatch::new(vec![
                    HubCommand::SetAirconOnOff {
                        aircon_id: id.to_string(),
                        is_on: true,
                    },
                    HubCommand::SetAirconMode {
                        aircon_id: id.to_string(),
                        mode: hub_mode,
                    },
                ]),
                patch: Some(Patch::AirconPower {
                    aircon: id.clone(),
                    on: true,
                    mode: Some(AirconMode::from(hub_mode)),
                }),
                last_known_on: Some(true),
            })
        }
    }
}

// ── Execution ───────────────────────────────────────────────────────

/// Applies intents: patch, publish, send, settle, request refresh.
#[derive(Clone)]
pub struct Mutator {
    transport: Arc<dyn CommandTransport>,
    store: SnapshotStore,
    last_known: LastKnownTable,
    refresh: Arc<Notify>,
    settle_delay: Duration,
}

impl Mutator {
    pub fn new(
        transport: Arc<dyn CommandTransport>,
        store: SnapshotStore,
        last_known: LastKnownTable,
        refresh: Arc<Notify>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            transport,
            store,
            last_known,
            refresh,
            settle_delay,
        }
    }

    /// Apply `intent`.
    ///
    /// Invalid intents come back as [`ApplyOutcome::Rejected`] with nothing
    /// patched or sent. Transport failures are returned as errors after the
    /// optimistic patch has been published; the next poll corrects it.
    pub async fn apply(&self, intent: Intent) -> Result<ApplyOutcome, CoreError> {
        let target = intent.target().clone();

        let Some(current) = self.store.snapshot() else {
            return Ok(reject(&target, RejectReason::NoSnapshot));
        };
        let plan = match plan(&current, &intent) {
            Ok(plan) => plan,
            Err(reason) => return Ok(reject(&target, reason)),
        };

        // 1. Patch and publish.
        let (published, pending) = match plan.patch {
            Some(patch) => match self.store.apply_optimistic(patch) {
                Some((snapshot, guard)) => (snapshot, Some(guard)),
                None => (current, None),
            },
            None => (current, None),
        };
        if let Some(on) = plan.last_known_on {
            self.last_known.record(&target, on);
        }
        debug!(
            entity = %target,
            commands = ?plan.batch.names(),
            version = self.store.version(),
            "optimistic update published"
        );

        // 2. Send. On failure the guard drops here and the patch is retired.
        if let Err(e) = self.transport.send(&plan.batch, false).await {
            self.refresh.notify_one();
            return Err(e.into());
        }

        // 3. Settle, then 4. retire and reconcile.
        tokio::time::sleep(self.settle_delay).await;
        drop(pending);
        self.refresh.notify_one();

        Ok(ApplyOutcome::Applied {
            batch: plan.batch,
            snapshot: published,
        })
    }
}

fn reject(target: &EntityRef, reason: RejectReason) -> ApplyOutcome {
    warn!(entity = %target, reason = %reason, "control intent rejected");
    ApplyOutcome::Rejected(reason)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::AirconId;
    use myplace_api::HubMode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn snapshot(mode: &str) -> Snapshot {
        serde_json::from_value(json!({
            "aircons": {
                "ac1": { "isOn": true, "mode": mode, "zoneOrder": ["z01", "z02"] }
            },
            "zones": {
                "z01": { "isOn": true, "isVisible": true },
                "z02": { "isOn": true, "isVisible": false }
            }
        }))
        .unwrap()
    }

    fn set_temp(target: EntityRef, value: f64) -> Intent {
        Intent::set_temperature(target, value)
    }

    #[test]
    fn zone_temperature_in_heat_mode() {
        let plan = plan(&snapshot("heat"), &set_temp(EntityRef::zone("z01"), 22.7)).unwrap();
        assert_eq!(
            plan.batch.commands,
            vec![HubCommand::SetZoneHeatTemperature {
                zone_id: "z01".into(),
                temperature: 22
            }]
        );
        assert_eq!(
            plan.patch,
            Some(Patch::Setpoint {
                entity: EntityRef::zone("z01"),
                kind: SetpointKind::Heat,
                value: 22.0
            })
        );
    }

    #[test]
    fn aircon_temperature_in_cool_mode() {
        let plan = plan(&snapshot("cool"), &set_temp(EntityRef::aircon("ac1"), 24.0)).unwrap();
        assert_eq!(
            plan.batch.commands,
            vec![HubCommand::SetAirconCoolTemperature {
                aircon_id: "ac1".into(),
                temperature: 24
            }]
        );
    }

    #[test]
    fn non_heat_modes_send_cool_variant_without_patch() {
        for mode in ["dry", "fan", "vent"] {
            let snap = snapshot(mode);

            let zone = plan(&snap, &set_temp(EntityRef::zone("z01"), 20.0)).unwrap();
            assert_eq!(zone.batch.names(), vec!["SetZoneCoolTemperature"], "{mode}");
            assert_eq!(zone.patch, None, "{mode}");

            let aircon = plan(&snap, &set_temp(EntityRef::aircon("ac1"), 20.0)).unwrap();
            assert_eq!(
                aircon.batch.commands,
                vec![HubCommand::SetAirconCoolTemperature {
                    aircon_id: "ac1".into(),
                    temperature: 20
                }],
                "{mode}"
            );
            assert_eq!(aircon.patch, None, "{mode}");
        }
    }

    #[test]
    fn hidden_zone_is_not_a_target() {
        let snap = snapshot("heat");
        let hidden = EntityRef::zone("z02");
        assert_eq!(
            plan(&snap, &set_temp(hidden.clone(), 20.0)).unwrap_err(),
            RejectReason::UnknownTarget(hidden.clone())
        );
        assert_eq!(
            plan(&snap, &Intent::set_hvac_mode(hidden.clone(), HvacMode::Off)).unwrap_err(),
            RejectReason::UnknownTarget(hidden)
        );
    }

    #[test]
    fn setpoint_boundaries() {
        let snap = snapshot("heat");
        let zone = EntityRef::zone("z01");
        assert!(plan(&snap, &Intent::set_temperature(zone.clone(), 16.0)).is_ok());
        assert!(plan(&snap, &Intent::set_temperature(zone.clone(), 30.0)).is_ok());
        assert!(plan(&snap, &Intent::set_temperature(zone.clone(), 30.9)).is_ok());
        assert_eq!(
            plan(&snap, &Intent::set_temperature(zone.clone(), 15.0)).unwrap_err(),
            RejectReason::OutOfRange { value: 15 }
        );
        assert_eq!(
            plan(&snap, &Intent::set_temperature(zone, 31.0)).unwrap_err(),
            RejectReason::OutOfRange { value: 31 }
        );
    }

    #[test]
    fn malformed_temperatures_are_rejected() {
        let snap = snapshot("heat");
        let missing = Intent::SetTemperature {
            target: EntityRef::zone("z01"),
            temperature: None,
        };
        assert_eq!(plan(&snap, &missing).unwrap_err(), RejectReason::MissingTemperature);
        assert_eq!(
            plan(&snap, &Intent::set_temperature(EntityRef::zone("z01"), f64::NAN)).unwrap_err(),
            RejectReason::NonFiniteTemperature
        );
        assert_eq!(
            plan(&snap, &Intent::set_temperature(EntityRef::zone("z42"), 20.0)).unwrap_err(),
            RejectReason::UnknownTarget(EntityRef::zone("z42"))
        );
    }

    #[test]
    fn zone_modes() {
        let snap = snapshot("heat");
        let zone = EntityRef::zone("z01");

        let off = plan(&snap, &Intent::set_hvac_mode(zone.clone(), HvacMode::Off)).unwrap();
        assert_eq!(
            off.batch.commands,
            vec![HubCommand::SetZoneOpenClose {
                zone_id: "z01".into(),
                is_open: false
            }]
        );
        assert_eq!(off.last_known_on, Some(false));

        let auto = plan(&snap, &Intent::set_hvac_mode(zone.clone(), HvacMode::Auto)).unwrap();
        assert_eq!(auto.last_known_on, Some(true));

        assert!(matches!(
            plan(&snap, &Intent::set_hvac_mode(zone, HvacMode::Heat)),
            Err(RejectReason::UnsupportedMode { .. })
        ));
    }

    #[test]
    fn aircon_on_with_mode_is_one_batch_of_two() {
        let snap = snapshot("heat");
        let intent = Intent::set_hvac_mode(EntityRef::aircon("ac1"), HvacMode::FanOnly);
        let plan = plan(&snap, &intent).unwrap();
        assert_eq!(
            plan.batch.commands,
            vec![
                HubCommand::SetAirconOnOff {
                    aircon_id: "ac1".into(),
                    is_on: true
                },
                HubCommand::SetAirconMode {
                    aircon_id: "ac1".into(),
                    mode: HubMode::Fan
                },
            ]
        );
        assert_eq!(
            plan.patch,
            Some(Patch::AirconPower {
                aircon: "ac1".into(),
                on: true,
                mode: Some(AirconMode::Fan)
            })
        );
    }

    #[test]
    fn aircon_off_twice_plans_the_same_single_command() {
        let mut snap = snapshot("cool");
        let off = Intent::set_hvac_mode(EntityRef::aircon("ac1"), HvacMode::Off);

        let first = plan(&snap, &off).unwrap();
        assert_eq!(
            first.batch.commands,
            vec![HubCommand::SetAirconOnOff {
                aircon_id: "ac1".into(),
                is_on: false
            }]
        );
        assert_eq!(
            first.patch,
            Some(Patch::AirconPower {
                aircon: "ac1".into(),
                on: false,
                mode: None
            })
        );
        assert_eq!(first.last_known_on, Some(false));

        // The aircon is already off the second time round.
        if let Some(aircon) = snap.aircons.get_mut(&AirconId::from("ac1")) {
            aircon.is_on = Some(false);
        }
        let second = plan(&snap, &off).unwrap();
        assert_eq!(second, first);
    }

    #[test]
    fn aircon_auto_is_rejected() {
        let snap = snapshot("heat");
        assert!(matches!(
            plan(&snap, &Intent::set_hvac_mode(EntityRef::aircon("ac1"), HvacMode::Auto)),
            Err(RejectReason::UnsupportedMode { .. })
        ));
    }

    #[test]
    fn reject_reasons_read_well() {
        assert_eq!(
            RejectReason::OutOfRange { value: 31 }.to_string(),
            "temperature 31 outside 16..=30"
        );
        assert_eq!(
            RejectReason::UnsupportedMode {
                target: EntityRef::zone("z01"),
                mode: HvacMode::Cool
            }
            .to_string(),
            "zone does not support mode cool"
        );
    }
}
