//! Command handlers that talk to the hub.

pub mod config_cmd;
pub mod control;
pub mod status;
pub mod watch;

use myplace_core::HubConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a hub command to its handler.
pub async fn dispatch(cmd: Command, hub: HubConfig, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Status(args) => status::handle(hub, args, global).await,
        Command::Watch(args) => watch::handle(hub, args, global).await,
        Command::SetTemp(args) => control::set_temp(hub, args, global).await,
        Command::SetMode(args) => control::set_mode(hub, args, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "local command routed to the hub dispatcher".into(),
        )),
    }
}
