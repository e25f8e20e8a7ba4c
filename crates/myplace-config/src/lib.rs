//! Shared configuration for MyPlace tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `myplace_core::HubConfig`. The CLI layers its
//! `GlobalOpts` overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use myplace_api::TransportConfig;
use myplace_core::HubConfig;

/// Keyring service name; entries are keyed `{profile}/client-secret`.
pub const KEYRING_SERVICE: &str = "myplace";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("no client secret configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named hub profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given explicitly.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    /// Look up a profile, or the default one when `name` is `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name.unwrap_or_else(|| self.active_profile_name());
        self.profiles
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Seconds to wait for a hub reply.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between background polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_poll_interval() -> u64 {
    30
}

/// A named hub profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Hub host name or IP address.
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Sent to the hub as `client_id`.
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Client secret (plaintext, prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Environment variable name containing the client secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret_env: Option<String>,

    /// Override poll interval, seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<u64>,

    /// Override reply timeout, seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Profile {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            client_id: default_client_id(),
            client_secret: None,
            client_secret_env: None,
            poll_interval: None,
            timeout: None,
        }
    }
}

fn default_port() -> u16 {
    2025
}
fn default_client_id() -> String {
    "myplace".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "myplace", "myplace").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("myplace");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, layered over defaults and under
/// `MYPLACE_`-prefixed environment variables (`__` separates nesting).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("MYPLACE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the client secret: env var, then system keyring, then plaintext.
pub fn resolve_secret(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_secret_with(profile, profile_name, keyring_secret)
}

fn keyring_secret(profile_name: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/client-secret"))
        .ok()?
        .get_password()
        .ok()
}

fn resolve_secret_with(
    profile: &Profile,
    profile_name: &str,
    keyring_lookup: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's client_secret_env → env var lookup
    if let Some(val) = profile
        .client_secret_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok())
    {
        return Ok(SecretString::from(val));
    }

    // 2. System keyring
    if let Some(secret) = keyring_lookup(profile_name) {
        return Ok(SecretString::from(secret));
    }

    // 3. Plaintext in config
    if let Some(ref secret) = profile.client_secret {
        return Ok(SecretString::from(secret.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `HubConfig` from a profile, with no CLI flag overrides.
pub fn profile_to_hub_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<HubConfig, ConfigError> {
    let secret = resolve_secret(profile, profile_name)?;
    build_hub_config(profile, secret, defaults)
}

/// Validate a profile and combine it with an already-resolved secret.
pub fn build_hub_config(
    profile: &Profile,
    secret: SecretString,
    defaults: &Defaults,
) -> Result<HubConfig, ConfigError> {
    if profile.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: "must not be empty".into(),
        });
    }
    if profile.port == 0 {
        return Err(ConfigError::Validation {
            field: "port".into(),
            reason: "must be between 1 and 65535".into(),
        });
    }

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    let poll_interval =
        Duration::from_secs(profile.poll_interval.unwrap_or(defaults.poll_interval));

    Ok(HubConfig::new(
        profile.host.trim(),
        profile.port,
        profile.client_id.clone(),
        secret,
    )
    .with_poll_interval(poll_interval)
    .with_transport(TransportConfig::default().with_timeout(timeout)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_profiles_over_defaults() {
        let file = write_config(
            r#"
            default_profile = "home"

            [defaults]
            output = "json"

            [profiles.home]
            host = "192.168.1.50"
            client_secret = "s3cret"
            poll_interval = 15
            "#,
        );

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.defaults.output, "json");
        assert_eq!(config.defaults.timeout, 10);

        let (name, profile) = config.profile(None).unwrap();
        assert_eq!(name, "home");
        assert_eq!(profile.port, 2025);
        assert_eq!(profile.client_id, "myplace");
        assert_eq!(profile.poll_interval, Some(15));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.active_profile_name(), "default");
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let config = Config::default();
        let err = config.profile(Some("attic")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { ref name } if name == "attic"));
    }

    #[test]
    fn save_then_load_keeps_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        let mut profile = Profile::new("hub.local");
        profile.client_secret_env = Some("HUB_SECRET".into());
        config.profiles.insert("default".into(), profile);
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let (_, profile) = loaded.profile(None).unwrap();
        assert_eq!(profile.host, "hub.local");
        assert_eq!(profile.client_secret_env.as_deref(), Some("HUB_SECRET"));
        assert!(profile.client_secret.is_none());
    }

    #[test]
    fn keyring_wins_over_plaintext() {
        let mut profile = Profile::new("hub");
        profile.client_secret = Some("plain".into());

        let secret = resolve_secret_with(&profile, "home", |name| {
            assert_eq!(name, "home");
            Some("from-keyring".into())
        })
        .unwrap();
        assert_eq!(secret.expose_secret(), "from-keyring");

        let secret = resolve_secret_with(&profile, "home", |_| None).unwrap();
        assert_eq!(secret.expose_secret(), "plain");
    }

    #[test]
    fn unset_env_var_falls_through() {
        let mut profile = Profile::new("hub");
        profile.client_secret_env = Some("MYPLACE_TEST_SECRET_THAT_IS_NEVER_SET".into());
        let err = resolve_secret_with(&profile, "home", |_| None).unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { .. }));
    }

    #[test]
    fn translates_profile_into_hub_config() {
        let mut profile = Profile::new(" 10.0.0.7 ");
        profile.port = 2026;
        profile.client_id = "ha".into();
        profile.timeout = Some(4);

        let defaults = Defaults::default();
        let hub = build_hub_config(&profile, SecretString::from("pw".to_owned()), &defaults)
            .unwrap();

        assert_eq!(hub.host, "10.0.0.7");
        assert_eq!(hub.port, 2026);
        assert_eq!(hub.client_id, "ha");
        assert_eq!(hub.poll_interval, Duration::from_secs(30));
        assert_eq!(hub.transport.reply_timeout, Duration::from_secs(4));
        assert_eq!(hub.client_secret.expose_secret(), "pw");
    }

    #[test]
    fn rejects_empty_host_and_zero_port() {
        let defaults = Defaults::default();
        let secret = || SecretString::from("pw".to_owned());

        let err = build_hub_config(&Profile::new("  "), secret(), &defaults).unwrap_err();
        assert!(err.to_string().contains("host"), "{err}");

        let mut profile = Profile::new("hub");
        profile.port = 0;
        let err = build_hub_config(&profile, secret(), &defaults).unwrap_err();
        assert!(err.to_string().contains("port"), "{err}");
    }
}
