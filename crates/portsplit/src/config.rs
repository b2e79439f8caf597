//! Flag-aware configuration: merges CLI flags over the TOML profile and
//! produces a `portsplit_core::ConnectionConfig`.

use std::io::IsTerminal;
use std::time::Duration;

use secrecy::SecretString;

use portsplit_config::{Config, Defaults, Profile};
use portsplit_core::{AuthCredentials, ConnectionConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use portsplit_config::config_path;

/// Load the config file. A missing file yields the defaults.
pub fn load_config() -> Result<Config, CliError> {
    Ok(portsplit_config::load_config()?)
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Available profile names for error help text.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// Build the connection config for the active profile.
///
/// An explicit `--profile` must exist. Without one, a missing default
/// profile is fine as long as flags supply the server and credentials.
pub fn connection_config(global: &GlobalOpts) -> Result<ConnectionConfig, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);
    let profile = cfg.profiles.get(&profile_name);

    if profile.is_none() && global.profile.is_some() {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available_profiles(&cfg),
        });
    }

    resolve(global, profile, &profile_name, &cfg.defaults)
}

/// Flags win over the profile, the profile wins over `[defaults]`.
pub fn resolve(
    global: &GlobalOpts,
    profile: Option<&Profile>,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ConnectionConfig, CliError> {
    if let (Some(profile), false) = (profile, has_connection_flags(global)) {
        return Ok(portsplit_config::profile_to_connection_config(
            profile,
            profile_name,
            defaults,
        )?);
    }

    let server = global
        .server
        .as_deref()
        .or_else(|| profile.map(|p| p.server.as_str()))
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;
    let url = portsplit_config::server_url(server)?;

    let auth = resolve_auth(global, profile, profile_name)?;

    let tls = if let Some(ref ca) = global.ca_cert {
        TlsVerification::CustomCa(ca.clone())
    } else if global.verify_tls {
        TlsVerification::SystemDefaults
    } else if let Some(profile) = profile {
        portsplit_config::resolve_tls(profile, defaults)
    } else if defaults.verify_tls {
        TlsVerification::SystemDefaults
    } else {
        TlsVerification::DangerAcceptInvalid
    };

    let timeout = global
        .timeout
        .or_else(|| profile.and_then(|p| p.timeout))
        .unwrap_or(defaults.timeout);

    Ok(ConnectionConfig {
        url,
        auth,
        tls,
        timeout: Duration::from_secs(timeout),
    })
}

fn has_connection_flags(global: &GlobalOpts) -> bool {
    global.server.is_some()
        || global.user.is_some()
        || global.password.is_some()
        || global.token.is_some()
        || global.ca_cert.is_some()
        || global.verify_tls
        || global.timeout.is_some()
}

fn resolve_auth(
    global: &GlobalOpts,
    profile: Option<&Profile>,
    profile_name: &str,
) -> Result<AuthCredentials, CliError> {
    if let Some(ref token) = global.token {
        return Ok(AuthCredentials::Token(SecretString::from(token.clone())));
    }

    let explicit = global.user.is_some() || global.password.is_some();
    if let (Some(profile), false) = (profile, explicit) {
        return Ok(portsplit_config::resolve_auth(profile, profile_name)?);
    }

    let username = global
        .user
        .clone()
        .or_else(|| profile.and_then(|p| p.username.clone()))
        .ok_or_else(|| CliError::NoCredentials {
            profile: profile_name.into(),
        })?;

    let password = match (&global.password, profile) {
        (Some(password), _) => SecretString::from(password.clone()),
        (None, Some(profile)) => portsplit_config::resolve_password(profile, profile_name)?,
        (None, None) => prompt_password(&username, profile_name)?,
    };

    Ok(AuthCredentials::Password { username, password })
}

fn prompt_password(username: &str, profile_name: &str) -> Result<SecretString, CliError> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NoCredentials {
            profile: profile_name.into(),
        });
    }
    let password = rpassword::prompt_password(format!("CVP password for {username}: "))?;
    Ok(SecretString::from(password))
}
