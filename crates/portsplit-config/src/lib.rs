//! Shared configuration for portsplit.
//!
//! TOML profiles, credential resolution (env + plaintext + keyring),
//! and translation to `portsplit_core::ConnectionConfig`. The CLI adds
//! flag-aware wrappers on top.

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
use url::Url;

use portsplit_core::{AuthCredentials, ConnectionConfig, TlsVerification};

/// Keyring service name; entries are keyed `{profile}/password` and `{profile}/token`.
pub const KEYRING_SERVICE: &str = "portsplit";

/// Prefix for environment overrides (`PORTSPLIT_PASSWORD`, ...).
pub const ENV_PREFIX: &str = "PORTSPLIT_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
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
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named CVP profiles.
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

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub verify_tls: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            verify_tls: false,
            timeout: default_timeout(),
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
    30
}

/// A named CVP profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// CVP address: bare host/IP (`10.0.0.5`) or URL (`https://cvp.example.com`).
    pub server: String,

    /// Username for session login.
    pub username: Option<String>,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Service account token (plaintext; prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the service account token.
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Verify the server certificate against the system store.
    pub verify_tls: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "portsplit", "portsplit").map_or_else(
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
    p.push("portsplit");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
///
/// A missing file yields the defaults; a malformed one is an error.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Server address ──────────────────────────────────────────────────

/// Parse a CVP address. Bare hosts get an `https://` scheme.
pub fn server_url(server: &str) -> Result<Url, ConfigError> {
    let server = server.trim();
    let candidate = if server.contains("://") {
        server.to_owned()
    } else {
        format!("https://{server}")
    };
    let url: Url = candidate.parse().map_err(|e| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid address '{server}': {e}"),
    })?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::Validation {
            field: "server".into(),
            reason: format!("no host in '{server}'"),
        });
    }
    Ok(url)
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Walk one secret's lookup chain: the profile's named env var, the
/// global `PORTSPLIT_*` env var, plaintext in the profile, then the keyring.
fn resolve_secret(
    named_env: Option<&str>,
    global_env: &str,
    plaintext: Option<&str>,
    keyring_key: &str,
) -> Option<SecretString> {
    if let Some(val) = named_env.and_then(|name| std::env::var(name).ok()) {
        return Some(SecretString::from(val));
    }

    if let Ok(val) = std::env::var(global_env) {
        return Some(SecretString::from(val));
    }

    if let Some(val) = plaintext {
        return Some(SecretString::from(val.to_owned()));
    }

    keyring::Entry::new(KEYRING_SERVICE, keyring_key)
        .and_then(|entry| entry.get_password())
        .ok()
        .map(SecretString::from)
}

/// Resolve the session password for a profile.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_secret(
        profile.password_env.as_deref(),
        "PORTSPLIT_PASSWORD",
        profile.password.as_deref(),
        &format!("{profile_name}/password"),
    )
    .ok_or_else(|| ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve a service account token for a profile, if one is configured.
///
/// A profile uses token auth when it has a `token` / `token_env` entry or
/// no username. Password profiles never touch the token keyring.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    let wants_token =
        profile.token.is_some() || profile.token_env.is_some() || profile.username.is_none();
    if !wants_token {
        return None;
    }
    resolve_secret(
        profile.token_env.as_deref(),
        "PORTSPLIT_TOKEN",
        profile.token.as_deref(),
        &format!("{profile_name}/token"),
    )
}

/// Resolve `AuthCredentials` for a profile: token auth when configured,
/// otherwise username + password.
pub fn resolve_auth(profile: &Profile, profile_name: &str) -> Result<AuthCredentials, ConfigError> {
    if let Some(token) = resolve_token(profile, profile_name) {
        return Ok(AuthCredentials::Token(token));
    }

    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("PORTSPLIT_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;
    let password = resolve_password(profile, profile_name)?;
    Ok(AuthCredentials::Password { username, password })
}

/// TLS strategy for a profile. A CA file implies verification.
pub fn resolve_tls(profile: &Profile, defaults: &Defaults) -> TlsVerification {
    if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else if profile.verify_tls.unwrap_or(defaults.verify_tls) {
        TlsVerification::SystemDefaults
    } else {
        TlsVerification::DangerAcceptInvalid
    }
}

/// Build a `ConnectionConfig` from a profile, without CLI flag overrides.
pub fn profile_to_connection_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ConnectionConfig, ConfigError> {
    Ok(ConnectionConfig {
        url: server_url(&profile.server)?,
        auth: resolve_auth(profile, profile_name)?,
        tls: resolve_tls(profile, defaults),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
    })
}
