// ── Runtime connection configuration ──
//
// These types describe *how* to connect to a CVP server. They carry
// credential data and connection tuning, but never touch disk.
// The CLI constructs a `ConnectionConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use portsplit_api::{Credentials, TlsMode, TransportConfig};

/// How to authenticate with CVP.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// Username/password session login.
    Password {
        username: String,
        password: SecretString,
    },
    /// Service account bearer token.
    Token(SecretString),
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. Default, since CVP ships a self-signed certificate.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for connecting to one CVP server.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Server URL (e.g., `https://cvp.example.com`).
    pub url: Url,
    /// Authentication method and credentials.
    pub auth: AuthCredentials,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

impl ConnectionConfig {
    pub(crate) fn credentials(&self) -> Credentials {
        match &self.auth {
            AuthCredentials::Password { username, password } => Credentials::Session {
                username: username.clone(),
                password: password.clone(),
            },
            AuthCredentials::Token(token) => Credentials::ApiToken {
                token: token.clone(),
            },
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
            cookie_jar: None,
        }
    }
}
