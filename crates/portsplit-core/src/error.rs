// ── Core error types ──
//
// User-facing errors from portsplit-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<portsplit_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to CVP at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("CVP request timed out")]
    Timeout,

    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Device not found: {fqdn}")]
    DeviceNotFound { fqdn: String },

    #[error("No configlets found for device {device}")]
    NoConfiglets { device: String },

    #[error("No reconcile configlet for device {device}")]
    NoReconcileConfiglet { device: String },

    #[error("Configlet not found: {name}")]
    ConfigletNotFound { name: String },

    // ── Update errors ────────────────────────────────────────────────
    #[error("Failed to update configlet {configlet}: {reason}")]
    UpdateFailed { configlet: String, reason: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// The CVP error code (e.g. "132801").
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<portsplit_api::Error> for CoreError {
    fn from(err: portsplit_api::Error) -> Self {
        match err {
            portsplit_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            portsplit_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            portsplit_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            portsplit_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            portsplit_api::Error::Api {
                message,
                code,
                status,
            } => CoreError::Api {
                message,
                code,
                status,
            },
            portsplit_api::Error::EmptyResponse { endpoint } => CoreError::Api {
                message: format!("no response from {endpoint}"),
                code: None,
                status: None,
            },
            portsplit_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
