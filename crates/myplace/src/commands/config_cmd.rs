//! Config subcommand handlers. These never contact the hub.

use std::fmt::Write as _;

use crate::cli::{ConfigArgs, ConfigCommand, ConfigInitArgs, GlobalOpts};
use crate::config::{self, Config, KEYRING_SERVICE, Profile};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of `cfg` with plaintext secrets masked.
fn redacted(cfg: &Config) -> Config {
    let mut out = cfg.clone();
    for profile in out.profiles.values_mut() {
        if profile.client_secret.is_some() {
            profile.client_secret = Some(MASK.into());
        }
    }
    out
}

/// Format config for display. Expects an already redacted config.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = write!(out, "poll_interval = {}", cfg.defaults.poll_interval);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let Some(p) = cfg.profiles.get(name) else {
            continue;
        };
        let _ = writeln!(out, "\n");
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "host = \"{}\"", p.host);
        let _ = writeln!(out, "port = {}", p.port);
        let _ = write!(out, "client_id = \"{}\"", p.client_id);
        if let Some(ref secret) = p.client_secret {
            let _ = write!(out, "\nclient_secret = \"{secret}\"");
        }
        if let Some(ref env) = p.client_secret_env {
            let _ = write!(out, "\nclient_secret_env = \"{env}\"");
        }
        if let Some(poll) = p.poll_interval {
            let _ = write!(out, "\npoll_interval = {poll}");
        }
        if let Some(timeout) = p.timeout {
            let _ = write!(out, "\ntimeout = {timeout}");
        }
    }

    out
}

fn store_in_keyring(profile_name: &str, secret: &str) -> Result<(), CliError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/client-secret"))?;
    entry.set_password(secret)?;
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init(init_args) => init(&init_args, global),

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config, |c| {
                c.active_profile_name().to_owned()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}

fn init(args: &ConfigInitArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let host = global.host.clone().ok_or_else(|| CliError::Validation {
        field: "host".into(),
        reason: "pass the hub address with --host".into(),
    })?;

    let mut cfg = config::load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);

    if cfg.profiles.contains_key(&profile_name) && !args.force {
        return Err(CliError::Validation {
            field: "profile".into(),
            reason: format!("profile '{profile_name}' already exists (use --force to replace it)"),
        });
    }

    let mut profile = Profile::new(host);
    if let Some(port) = global.port {
        profile.port = port;
    }
    if let Some(ref client_id) = global.client_id {
        profile.client_id.clone_from(client_id);
    }
    profile.timeout = global.timeout;

    match (&args.secret_env, &global.secret) {
        (Some(var), _) => profile.client_secret_env = Some(var.clone()),
        (None, Some(secret)) if args.keyring => {
            store_in_keyring(&profile_name, secret)?;
            eprintln!("   ✓ client secret stored in system keyring");
        }
        (None, Some(secret)) => profile.client_secret = Some(secret.clone()),
        (None, None) if args.keyring => {
            return Err(CliError::Validation {
                field: "keyring".into(),
                reason: "--keyring needs a secret from --secret or MYPLACE_SECRET".into(),
            });
        }
        (None, None) => {}
    }

    if args.set_default || cfg.profiles.is_empty() {
        cfg.default_profile = Some(profile_name.clone());
    }
    cfg.profiles.insert(profile_name.clone(), profile);

    let path = config::save_config(&cfg)?;
    if !global.quiet {
        eprintln!("✓ Profile '{profile_name}' written to {}", path.display());
        eprintln!("  Test it: myplace status --profile {profile_name}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_masks_plaintext_secret() {
        let mut cfg = Config::default();
        let mut profile = Profile::new("10.0.0.9");
        profile.client_secret = Some("hunter2".into());
        cfg.profiles.insert("default".into(), profile);

        let text = format_config(&redacted(&cfg));
        assert!(!text.contains("hunter2"), "{text}");
        assert!(text.contains("client_secret = \"****\""), "{text}");
        assert!(text.contains("host = \"10.0.0.9\""), "{text}");
    }
}
