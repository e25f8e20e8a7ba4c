//! `myplace watch`: keep polling and print every published change.

use std::time::Duration;

use myplace_core::{Controller, HubConfig};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::status;

pub async fn handle(hub: HubConfig, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.interval == 0 {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let controller = Controller::new(hub.with_poll_interval(Duration::from_secs(args.interval)))?;
    controller.start().await?;

    let result = watch_loop(&controller, &args, global).await;
    controller.shutdown().await;
    result
}

async fn watch_loop(
    controller: &Controller,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut rx = controller.subscribe();
    let mut printed = 0usize;

    loop {
        let state = rx.borrow_and_update().clone();

        if matches!(global.output, OutputFormat::Table) && !global.quiet {
            let stamp = state
                .last_refresh
                .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "--:--:--".into());
            eprintln!("── {stamp} (v{}) ──", state.version);
        }
        if !state.is_available() {
            tracing::warn!("hub unavailable: no snapshot yet");
        }

        let out = status::render_states(&controller.entity_states(), global)?;
        output::print_output(&out, global.quiet);

        printed += 1;
        if args.count.is_some_and(|n| printed >= n) {
            return Ok(());
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
            }
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}
