//! Clap derive structures for the `portsplit` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// portsplit -- move reconciled CVP interfaces into automation configlets
#[derive(Debug, Parser)]
#[command(
    name = "portsplit",
    version,
    about = "Split CloudVision reconcile configlets into tap, tool, and shutdown automation configlets",
    long_about = "Reads a device's reconcile configlet from CloudVision Portal, classifies each\n\
        interface by role, replaces the <device>-tapports-automation,\n\
        <device>-toolports-automation and <device>-shutdownports-automation\n\
        configlets, and writes the remaining configuration back.",
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
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "PORTSPLIT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// CVP server address (overrides profile)
    #[arg(
        long,
        short = 's',
        visible_alias = "cvp",
        env = "PORTSPLIT_SERVER",
        global = true
    )]
    pub server: Option<String>,

    /// CVP username
    #[arg(long, short = 'u', env = "PORTSPLIT_USERNAME", global = true)]
    pub user: Option<String>,

    /// CVP password
    #[arg(
        long,
        visible_alias = "passw",
        env = "PORTSPLIT_PASSWORD",
        hide_env_values = true,
        global = true
    )]
    pub password: Option<String>,

    /// Service account token (instead of username/password)
    #[arg(long, env = "PORTSPLIT_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// CA certificate (PEM) used to verify the server
    #[arg(long, global = true)]
    pub ca_cert: Option<PathBuf>,

    /// Verify the server certificate against the system store
    #[arg(long, global = true)]
    pub verify_tls: bool,

    /// Request timeout in seconds [default: 30]
    #[arg(long, env = "PORTSPLIT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PORTSPLIT_OUTPUT",
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
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one record per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Move a device's reconciled interfaces into its automation configlets
    #[command(alias = "rec")]
    Reconcile(ReconcileArgs),

    /// Split and classify a local reconcile configlet without contacting CVP
    Preview(PreviewArgs),

    /// Inspect configuration and store credentials
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Device FQDN as registered in CVP
    pub device: String,

    /// Resolve and render everything, but write nothing
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Keep excluded and unclassified interfaces in the reconcile configlet
    #[arg(long)]
    pub retain_unmatched: bool,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Reconcile configlet text to read ("-" for stdin)
    #[arg(long, short = 'f', default_value = "-")]
    pub file: PathBuf,

    /// Keep excluded and unclassified interfaces in the residual configuration
    #[arg(long)]
    pub retain_unmatched: bool,

    /// Print one rendered body instead of the classification table
    #[arg(long)]
    pub show: Option<Section>,
}

/// A rendered body of a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Section {
    Tap,
    Tool,
    Shutdown,
    /// What stays in the reconcile configlet
    Residual,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the current configuration (secrets redacted)
    Show,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a secret for the active profile in the system keyring
    SetPassword {
        /// Which secret to store
        #[arg(default_value = "password")]
        kind: SecretKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SecretKind {
    /// Session login password
    Password,
    /// Service account token
    Token,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
