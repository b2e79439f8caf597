// CVP HTTP client
//
// Wraps `reqwest::Client` with `/cvpservice` URL construction and CVP error
// envelope handling. Endpoint groups (session, inventory, configlets) are
// implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::CvpErrorBody;
use crate::transport::TransportConfig;

/// Every REST endpoint lives under this prefix.
const SERVICE_PREFIX: &str = "/cvpservice";

/// Longest body excerpt carried in error messages.
const PREVIEW_CHARS: usize = 200;

/// Raw HTTP client for the CloudVision Portal REST API.
///
/// Strips the CVP error envelope before the caller sees a payload: any
/// `{"errorCode", "errorMessage"}` body becomes an [`Error`], and an empty
/// or `null` body becomes [`Error::EmptyResponse`].
#[derive(Debug)]
pub struct CvpClient {
    http: reqwest::Client,
    base_url: Url,
    /// Cookie jar reference, kept so the session cookie can be inspected.
    cookie_jar: Option<Arc<Jar>>,
}

impl CvpClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (session auth requires cookies). `base_url` is the
    /// server root, e.g. `https://cvp.example.com`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config.cookie_jar.clone();
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            cookie_jar,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            cookie_jar: None,
        }
    }

    /// The underlying HTTP client (for auth flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Whether the jar currently holds a cookie for the server.
    pub fn has_session_cookie(&self) -> bool {
        self.cookie_jar
            .as_ref()
            .and_then(|jar| jar.cookies(&self.base_url))
            .is_some()
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/cvpservice/{path}?{query}`.
    pub(crate) fn service_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}{SERVICE_PREFIX}/{path}"))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the payload.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

        Self::parse_response(resp).await
    }

    /// Send a POST request with JSON body and decode the payload.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_response(resp).await
    }

    /// Check the status, unwrap the CVP error envelope, and decode `T`.
    pub(crate) async fn parse_response<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        let endpoint = resp.url().path().to_owned();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session expired or invalid credentials".into(),
            });
        }

        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::Api {
                message: "insufficient permissions (HTTP 403)".into(),
                code: None,
                status: Some(403),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                message: format!("HTTP {status}: {}", preview(&body)),
                code: None,
                status: Some(status.as_u16()),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(endpoint = %endpoint, bytes = body.len(), "response body received");

        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Err(Error::EmptyResponse { endpoint });
        }

        if let Ok(wrapper) = serde_json::from_str::<CvpErrorBody>(trimmed) {
            if let Some((code, message)) = wrapper.into_parts() {
                return Err(Error::from_cvp(code, message));
            }
        }

        serde_json::from_str(trimmed).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })
    }
}

fn preview(body: &str) -> String {
    body.chars().take(PREVIEW_CHARS).collect()
}
