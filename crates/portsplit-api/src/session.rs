// CVP session management
//
// Username/password login against `login/authenticate.do`. CVP sets a
// `session_id` cookie on success; the client's jar replays it on every
// subsequent request. Token auth skips login entirely.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::auth::Credentials;
use crate::client::CvpClient;
use crate::error::Error;
use crate::transport::TransportConfig;

impl CvpClient {
    /// Build a client for `credentials` and authenticate it.
    ///
    /// Session credentials get a cookie-jar client followed by
    /// [`login`](Self::login). Token credentials get a client whose default
    /// headers carry the bearer token.
    pub async fn connect(
        base_url: Url,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        debug!(strategy = credentials.strategy(), %base_url, "connecting to CVP");
        match credentials {
            Credentials::Session { username, password } => {
                let client = Self::new(base_url, transport)?;
                client.login(username, password).await?;
                Ok(client)
            }
            Credentials::ApiToken { token } => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                    .map_err(|_| Error::Authentication {
                        message: "API token contains characters not allowed in a header".into(),
                    })?;
                value.set_sensitive(true);
                let mut headers = HeaderMap::new();
                headers.insert(AUTHORIZATION, value);
                let http = transport.build_client_with_headers(headers)?;
                Ok(Self::with_client(http, base_url))
            }
        }
    }

    /// Authenticate with username/password.
    ///
    /// `POST /cvpservice/login/authenticate.do` with `{userId, password}`.
    /// CVP answers bad credentials with either a 4xx status or an
    /// `errorCode` body; both surface as [`Error::Authentication`].
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.service_url("login/authenticate.do", &[])?;

        debug!("logging in at {}", url);

        let body = json!({
            "userId": username,
            "password": password.expose_secret(),
        });

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        match Self::parse_response::<serde_json::Value>(resp).await {
            Ok(_) => {}
            Err(Error::Api { message, .. }) => return Err(Error::Authentication { message }),
            Err(e) => return Err(e),
        }

        debug!(session_cookie = self.has_session_cookie(), "login successful");
        Ok(())
    }

    /// End the current session.
    ///
    /// `POST /cvpservice/login/logout.do`
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.service_url("login/logout.do", &[])?;

        debug!("logging out at {}", url);

        let _resp = self
            .http()
            .post(url)
            .send()
            .await
            .map_err(Error::Transport)?;

        debug!("logout complete");
        Ok(())
    }
}
