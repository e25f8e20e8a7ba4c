//! `myplace status`: one poll, then print the derived state.

use std::fmt::Write as _;

use tabled::Tabled;

use myplace_core::{Controller, CoreError, EntityState, HubConfig};

use crate::cli::{GlobalOpts, StatusArgs};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct StateRow {
    #[tabled(rename = "Entity")]
    entity: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Target")]
    target: String,
}

impl StateRow {
    fn new(state: &EntityState, color: bool) -> Self {
        Self {
            entity: state.entity.to_string(),
            name: state.name.clone(),
            mode: output::paint_mode(&state.hvac_mode.to_string(), color),
            current: fmt_temp(state.current_temperature),
            target: fmt_temp(state.target_temperature),
        }
    }
}

fn fmt_temp(value: Option<f64>) -> String {
    value.map(|t| format!("{t:.1}°C")).unwrap_or_default()
}

fn plain_line(state: &EntityState) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        state.entity,
        state.name,
        state.hvac_mode,
        state
            .target_temperature
            .map(|t| t.to_string())
            .unwrap_or_default()
    )
}

fn detail(state: &EntityState, with_attributes: bool, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", state.name, state.entity);
    let _ = writeln!(
        out,
        "  mode:     {}",
        output::paint_mode(&state.hvac_mode.to_string(), color)
    );
    let _ = writeln!(out, "  power:    {}", if state.is_on { "on" } else { "off" });
    if let Some(ref mode_state) = state.mode_state {
        let _ = writeln!(out, "  state:    {mode_state}");
    }
    let _ = writeln!(out, "  current:  {}", fmt_temp(state.current_temperature));
    let _ = write!(out, "  target:   {}", fmt_temp(state.target_temperature));
    if with_attributes {
        for (key, value) in &state.attributes {
            let _ = write!(out, "\n  {key}: {value}");
        }
    }
    out
}

/// Render a set of entity states in the selected output format.
pub(crate) fn render_states(
    states: &[EntityState],
    global: &GlobalOpts,
) -> Result<String, CliError> {
    let color = output::should_color(&global.color);
    output::render_list(
        &global.output,
        states,
        |s| StateRow::new(s, color),
        plain_line,
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(hub: HubConfig, args: StatusArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let target = args.target.clone();
    let states = Controller::oneshot(hub, |controller| async move {
        match target {
            None => Ok(controller.entity_states()),
            Some(query) => {
                let entity = controller
                    .resolve_target(&query)
                    .ok_or(CoreError::NotFound { entity: query })?;
                Ok(controller.entity_state(&entity).into_iter().collect())
            }
        }
    })
    .await?;

    let out = match (args.target, states.as_slice()) {
        (Some(_), [state]) => {
            let color = output::should_color(&global.color);
            output::render_single(
                &global.output,
                state,
                |s| detail(s, args.attributes, color),
                plain_line,
            )?
        }
        _ => render_states(&states, global)?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use myplace_core::{EntityRef, HvacMode};
    use serde_json::{Map, json};

    fn state() -> EntityState {
        let mut attributes = Map::new();
        attributes.insert("rssi".into(), json!(-60));
        EntityState {
            entity: EntityRef::zone("z01"),
            name: "Living".into(),
            hvac_mode: HvacMode::Auto,
            is_on: true,
            current_temperature: Some(20.4),
            target_temperature: Some(22.0),
            mode_state: None,
            supported_modes: HvacMode::ZONE_MODES.to_vec(),
            attributes,
        }
    }

    #[test]
    fn plain_line_is_tab_separated() {
        assert_eq!(plain_line(&state()), "zone:z01\tLiving\tauto\t22");
    }

    #[test]
    fn detail_lists_attributes_on_request() {
        let without = detail(&state(), false, false);
        assert!(without.contains("target:   22.0°C"), "{without}");
        assert!(!without.contains("rssi"));

        let with = detail(&state(), true, false);
        assert!(with.contains("rssi: -60"), "{with}");
    }
}
