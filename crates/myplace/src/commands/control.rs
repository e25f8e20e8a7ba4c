//! `myplace set-temp` and `myplace set-mode`.

use std::time::Duration;

use myplace_core::{ApplyOutcome, Controller, CoreError, EntityState, HubConfig, Intent};

use crate::cli::{GlobalOpts, SetModeArgs, SetTempArgs};
use crate::error::CliError;
use crate::output;

pub async fn set_temp(
    hub: HubConfig,
    args: SetTempArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !args.value.is_finite() {
        return Err(CliError::Validation {
            field: "value".into(),
            reason: format!("'{}' is not a temperature", args.value),
        });
    }
    let value = args.value;
    let state = apply(hub, args.target, move |entity| {
        Intent::set_temperature(entity, value)
    })
    .await?;

    report(&state, global, &format!("{} target set to {value}°C", state.name))
}

pub async fn set_mode(
    hub: HubConfig,
    args: SetModeArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mode = args.mode;
    let state = apply(hub, args.target, move |entity| Intent::set_hvac_mode(entity, mode)).await?;

    report(&state, global, &format!("{} switched to {mode}", state.name))
}

/// Resolve `target`, apply the intent built for it, and return the
/// entity's state as left in the cache.
///
/// A one-shot run has no reconciling poll to wait for, so the settle
/// delay is dropped.
async fn apply(
    hub: HubConfig,
    target: String,
    build: impl FnOnce(myplace_core::EntityRef) -> Intent,
) -> Result<EntityState, CliError> {
    let hub = hub.with_settle_delay(Duration::ZERO);

    let (outcome, state) = Controller::oneshot(hub, |controller| async move {
        let entity = controller
            .resolve_target(&target)
            .ok_or(CoreError::NotFound { entity: target })?;
        let outcome = controller.apply_intent(build(entity.clone())).await?;
        Ok((outcome, controller.entity_state(&entity)))
    })
    .await?;

    match outcome {
        ApplyOutcome::Rejected(reason) => Err(reason.into()),
        ApplyOutcome::Applied { batch, .. } => {
            tracing::debug!(commands = ?batch.names(), "intent applied");
            state.ok_or_else(|| CliError::Internal("entity vanished from cache".into()))
        }
    }
}

fn report(state: &EntityState, global: &GlobalOpts, message: &str) -> Result<(), CliError> {
    let out = output::render_single(
        &global.output,
        state,
        |_| message.to_owned(),
        |s| s.entity.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
