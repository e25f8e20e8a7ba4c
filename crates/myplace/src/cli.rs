//! Clap derive structures for the `myplace` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use myplace_core::HvacMode;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// myplace -- control a MyPlace climate hub from the command line
#[derive(Debug, Parser)]
#[command(
    name = "myplace",
    version,
    about = "Monitor and control a MyPlace climate hub",
    long_about = "Reads the full aircon and zone state from a MyPlace hub over its\n\
        local WebSocket API and sends setpoint and mode changes.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Hub profile to use
    #[arg(long, short = 'p', env = "MYPLACE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Hub host name or IP (overrides profile)
    #[arg(long, short = 'H', env = "MYPLACE_HOST", global = true)]
    pub host: Option<String>,

    /// Hub WebSocket port (overrides profile)
    #[arg(long, env = "MYPLACE_PORT", global = true)]
    pub port: Option<u16>,

    /// Client id sent to the hub (overrides profile)
    #[arg(long, env = "MYPLACE_CLIENT_ID", global = true)]
    pub client_id: Option<String>,

    /// Client secret sent to the hub
    #[arg(long, env = "MYPLACE_SECRET", global = true, hide_env_values = true)]
    pub secret: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "MYPLACE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Reply timeout in seconds (overrides profile)
    #[arg(long, env = "MYPLACE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the state of aircons and zones
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Poll the hub and print state on every change
    Watch(WatchArgs),

    /// Set the target temperature of an aircon or zone
    #[command(alias = "temp")]
    SetTemp(SetTempArgs),

    /// Switch an aircon or zone to another HVAC mode
    #[command(alias = "mode")]
    SetMode(SetModeArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Hub commands ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Only show this entity (id or name)
    pub target: Option<String>,

    /// Include the full attribute map
    #[arg(long, short = 'a')]
    pub attributes: bool,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between polls
    #[arg(long, short = 'i', default_value = "30")]
    pub interval: u64,

    /// Exit after this many updates
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

#[derive(Debug, Args)]
pub struct SetTempArgs {
    /// Aircon or zone (id or name)
    pub target: String,

    /// Target temperature in degrees Celsius
    #[arg(allow_negative_numbers = true)]
    pub value: f64,
}

#[derive(Debug, Args)]
pub struct SetModeArgs {
    /// Aircon or zone (id or name)
    pub target: String,

    /// off, auto, heat, cool, dry, fan_only
    #[arg(value_parser = parse_hvac_mode)]
    pub mode: HvacMode,
}

fn parse_hvac_mode(value: &str) -> Result<HvacMode, String> {
    value.parse().map_err(|_| {
        format!("unknown mode '{value}' (expected off, auto, heat, cool, dry, fan_only)")
    })
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or update a profile
    Init(ConfigInitArgs),

    /// Display current configuration (secrets masked)
    Show,

    /// Print the config file location
    Path,
}

/// Hub address and credentials come from the global `--host`, `--port`,
/// `--client-id` and `--secret` flags.
#[derive(Debug, Args)]
pub struct ConfigInitArgs {
    /// Read the client secret from this environment variable at runtime
    #[arg(long, value_name = "VAR", conflicts_with = "keyring")]
    pub secret_env: Option<String>,

    /// Store `--secret` in the system keyring instead of the config file
    #[arg(long)]
    pub keyring: bool,

    /// Make this profile the default
    #[arg(long)]
    pub set_default: bool,

    /// Replace an existing profile of the same name
    #[arg(long, short = 'f')]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_set_mode_aliases() {
        let cli = Cli::try_parse_from(["myplace", "set-mode", "Living", "fan"]).unwrap();
        let Command::SetMode(args) = cli.command else {
            panic!("expected set-mode");
        };
        assert_eq!(args.target, "Living");
        assert_eq!(args.mode, HvacMode::FanOnly);
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = Cli::try_parse_from(["myplace", "set-mode", "z01", "turbo"]).unwrap_err();
        assert!(err.to_string().contains("turbo"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "myplace", "set-temp", "z01", "22.5", "--host", "10.0.0.2", "-o", "json",
        ])
        .unwrap();
        assert_eq!(cli.global.host.as_deref(), Some("10.0.0.2"));
        assert!(matches!(cli.global.output, OutputFormat::Json));
        let Command::SetTemp(args) = cli.command else {
            panic!("expected set-temp");
        };
        assert!((args.value - 22.5).abs() < f64::EPSILON);
    }
}
