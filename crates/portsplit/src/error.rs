//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use portsplit_config::ConfigError;
use portsplit_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to CVP at {url}")]
    #[diagnostic(
        code(portsplit::connection_failed),
        help(
            "Check that CVP is running and reachable.\n\
             CVP uses a self-signed certificate by default; with --verify-tls or\n\
             --ca-cert the certificate must validate."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(portsplit::timeout),
        help("Increase the timeout with --timeout or check CVP responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(portsplit::auth_failed),
        help(
            "Verify the username/password or service account token.\n\
             Store a password with: portsplit config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(portsplit::no_credentials),
        help(
            "Pass --user and --password (or --token), set PORTSPLIT_PASSWORD,\n\
             or run: portsplit config set-password"
        )
    )]
    NoCredentials { profile: String },

    // ── Lookups ──────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(portsplit::not_found))]
    NotFound {
        resource_type: String,
        identifier: String,
        #[help]
        hint: Option<String>,
    },

    // ── Updates ──────────────────────────────────────────────────────
    #[error("Failed to update configlet '{configlet}': {reason}")]
    #[diagnostic(
        code(portsplit::update_failed),
        help(
            "Configlets updated earlier in this run are not rolled back.\n\
             Review the automation and reconcile configlets in CVP before re-running."
        )
    )]
    UpdateFailed { configlet: String, reason: String },

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(portsplit::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(portsplit::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(portsplit::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No CVP server configured")]
    #[diagnostic(
        code(portsplit::no_config),
        help(
            "Pass --server (or set PORTSPLIT_SERVER), or add a profile to\n\
             {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Invalid configuration")]
    #[diagnostic(
        code(portsplit::invalid_config),
        help("{reason}\nFix the file or run `portsplit config path` to locate it.")
    )]
    InvalidConfig { reason: String },

    #[error(transparent)]
    #[diagnostic(code(portsplit::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(portsplit::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error("Cannot read {path}")]
    #[diagnostic(code(portsplit::input))]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    #[diagnostic(code(portsplit::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    #[diagnostic(code(portsplit::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(portsplit::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::InvalidConfig { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Timeout => CliError::Timeout,

            CoreError::DeviceNotFound { fqdn } => CliError::NotFound {
                resource_type: "Device".into(),
                identifier: fqdn,
                hint: Some("The device must be registered in CVP under its exact FQDN.".into()),
            },

            CoreError::NoConfiglets { device } => CliError::NotFound {
                resource_type: "Configlets for device".into(),
                identifier: device,
                hint: None,
            },

            CoreError::NoReconcileConfiglet { device } => CliError::NotFound {
                resource_type: "Reconcile configlet for device".into(),
                identifier: device,
                hint: Some("Run a reconcile on the device in CVP first.".into()),
            },

            CoreError::ConfigletNotFound { name } => CliError::NotFound {
                hint: Some(format!(
                    "Create the '{name}' configlet in CVP and assign it to the device."
                )),
                resource_type: "Configlet".into(),
                identifier: name,
            },

            CoreError::UpdateFailed { configlet, reason } => {
                CliError::UpdateFailed { configlet, reason }
            }

            CoreError::Api { message, code, .. } => CliError::ApiError {
                code: code.unwrap_or_else(|| "unknown".into()),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "server".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Figment(err) => CliError::InvalidConfig {
                reason: err.to_string(),
            },
            other => CliError::Config(Box::new(other)),
        }
    }
}
