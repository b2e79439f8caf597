use secrecy::SecretString;

/// Credentials for authenticating with a CloudVision Portal server.
///
/// Each variant carries the secret material needed for its auth flow.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Username/password session login. CVP answers with a session
    /// cookie that the client's jar replays on every later request.
    Session {
        username: String,
        password: SecretString,
    },

    /// Service account token, sent as `Authorization: Bearer <token>`.
    /// Generated at: Settings > Access Control > Service Accounts.
    ApiToken { token: SecretString },
}

impl Credentials {
    /// Human-readable name of the auth flow, for logs and diagnostics.
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::Session { .. } => "session",
            Self::ApiToken { .. } => "api-token",
        }
    }
}
