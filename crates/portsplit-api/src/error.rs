use thiserror::Error;

/// CVP error codes that mean the session is gone or was never valid.
const UNAUTHORIZED_CODES: &[&str] = &["112498", "112504"];

/// CVP error code returned when a named entity (configlet, device) is absent.
const ENTITY_MISSING_CODE: &str = "132801";

/// Top-level error type for the `portsplit-api` crate.
///
/// Covers every failure mode of the CVP REST surface: authentication,
/// transport, the `{errorCode, errorMessage}` envelope, and payload decoding.
/// `portsplit-core` maps these into domain diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, locked account, expired session).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── CVP API ─────────────────────────────────────────────────────
    /// Error reported by CVP, either as a non-2xx status or as an
    /// `{"errorCode": "...", "errorMessage": "..."}` body.
    #[error("CVP API error: {message}")]
    Api {
        message: String,
        code: Option<String>,
        status: Option<u16>,
    },

    /// The endpoint answered with an empty or `null` body.
    #[error("Empty response from {endpoint}")]
    EmptyResponse { endpoint: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Build an error from a CVP error envelope.
    pub(crate) fn from_cvp(code: Option<String>, message: Option<String>) -> Self {
        let message = message.unwrap_or_default();
        let unauthorized = code
            .as_deref()
            .is_some_and(|c| UNAUTHORIZED_CODES.contains(&c))
            || message.contains("Unauthorized");
        if unauthorized {
            return Self::Authentication { message };
        }
        Self::Api {
            message: match code.as_deref() {
                Some(c) => format!("{message} (code {c})"),
                None => message,
            },
            code,
            status: None,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: Some(404), .. } => true,
            Self::Api { code, message, .. } => {
                code.as_deref() == Some(ENTITY_MISSING_CODE) || message.contains("does not exist")
            }
            _ => false,
        }
    }
}
