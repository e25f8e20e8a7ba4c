//! CLI configuration: thin wrapper around `myplace_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--host, --port, --secret, ...).

use std::time::Duration;

use secrecy::SecretString;

use myplace_core::HubConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use myplace_config::{
    Config, KEYRING_SERVICE, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Build a `HubConfig` from the config file, profile, and CLI overrides.
///
/// Without a matching profile the flags alone must name a host and a
/// secret.
pub fn build_hub_config(global: &GlobalOpts, cfg: &Config) -> Result<HubConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let hub = match cfg.profiles.get(&profile_name) {
        Some(profile) => resolve_profile(profile, &profile_name, global, cfg)?,
        None => {
            if global.profile.is_some() {
                let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
                available.sort();
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: available.join(", "),
                });
            }
            let host = global.host.clone().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            let secret = global
                .secret
                .clone()
                .map(SecretString::from)
                .ok_or(CliError::NoCredentials {
                    profile: profile_name,
                })?;
            let profile = Profile::new(host);
            let mut hub = myplace_config::build_hub_config(&profile, secret, &cfg.defaults)?;
            apply_overrides(&mut hub, global);
            hub
        }
    };
    Ok(hub)
}

/// Translate a `Profile` + global flags into a `HubConfig`.
///
/// CLI flag overrides take priority over profile values.
fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<HubConfig, CliError> {
    // CLI flag takes priority over env/keyring/plaintext
    let secret = match global.secret {
        Some(ref secret) => SecretString::from(secret.clone()),
        None => myplace_config::resolve_secret(profile, profile_name)?,
    };

    let mut hub = myplace_config::build_hub_config(profile, secret, &cfg.defaults)?;
    apply_overrides(&mut hub, global);
    Ok(hub)
}

fn apply_overrides(hub: &mut HubConfig, global: &GlobalOpts) {
    if let Some(ref host) = global.host {
        hub.host.clone_from(host);
    }
    if let Some(port) = global.port {
        hub.port = port;
    }
    if let Some(ref client_id) = global.client_id {
        hub.client_id.clone_from(client_id);
    }
    if let Some(timeout) = global.timeout {
        hub.transport = hub
            .transport
            .clone()
            .with_timeout(Duration::from_secs(timeout.max(1)));
    }
}
