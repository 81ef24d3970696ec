//! HTTP client for the userdash backend.
//!
//! # Endpoints
//!
//! | Operation | Method | Path | Body | Response |
//! |-----------|--------|------|------|----------|
//! | [`BackendClient::status`] | GET | `/api/status` | none | [`ApiStatus`] |
//! | [`BackendClient::list_users`] | GET | `/api/users` | none | `Vec<User>` |
//! | [`BackendClient::create_user`] | POST | `/api/users` | [`NewUser`] | [`User`] |
//!
//! # Error Handling
//!
//! Every call returns [`ClientError`]. Transport failures, non-2xx statuses and
//! bodies that do not decode into the expected shape are kept apart here so
//! they can be logged precisely; callers are free to collapse them.
//!
//! The client never retries. A failed call is reported once and the caller
//! decides whether to try again.

use std::fmt;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

pub use userdash_types;
use userdash_types::{ApiStatus, NewUser, User};

/// Backend used when neither config nor environment names one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

const CONNECT_TIMEOUT_SECS: u64 = 30;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_MAX_IDLE_PER_HOST: usize = 8;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// The three backend operations the dashboard uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Status,
    ListUsers,
    CreateUser,
}

impl Endpoint {
    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Endpoint::Status | Endpoint::ListUsers => Method::GET,
            Endpoint::CreateUser => Method::POST,
        }
    }

    /// Path relative to the base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Endpoint::Status => "api/status",
            Endpoint::ListUsers | Endpoint::CreateUser => "api/users",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} /{}", self.method(), self.path())
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid backend URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("{endpoint} failed: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: Endpoint,
        status: StatusCode,
        body: String,
    },
    #[error("{endpoint} returned an unexpected body: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// The operation that failed, when the error came from a request.
    #[must_use]
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            ClientError::InvalidBaseUrl { .. } => None,
            ClientError::Transport { endpoint, .. }
            | ClientError::Status { endpoint, .. }
            | ClientError::Decode { endpoint, .. } => Some(*endpoint),
        }
    }
}

fn base_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
}

/// Parse and normalize a base URL so relative endpoint paths join under it.
fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let invalid = |reason: String| ClientError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base".to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Client for the dashboard backend. Cheap to clone; clones share one
/// connection pool.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base: Url,
}

impl BackendClient {
    /// Build a client for `base_url`.
    ///
    /// `timeout` bounds each whole request. `None` means requests may wait
    /// indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let base = parse_base_url(base_url)?;
        let mut builder = base_client_builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: format!("failed to build HTTP client: {e}"),
        })?;
        Ok(Self { http, base })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Full URL of an endpoint under the configured base.
    #[must_use]
    pub fn endpoint_url(&self, endpoint: Endpoint) -> Url {
        let mut url = self.base.clone();
        let path = format!("{}{}", self.base.path(), endpoint.path());
        url.set_path(&path);
        url
    }

    /// `GET /api/status`
    pub async fn status(&self) -> Result<ApiStatus, ClientError> {
        let request = self.request(Endpoint::Status);
        self.send_json(Endpoint::Status, request).await
    }

    /// `GET /api/users`
    pub async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        let request = self.request(Endpoint::ListUsers);
        self.send_json(Endpoint::ListUsers, request).await
    }

    /// `POST /api/users`. Returns the stored record with its server-assigned id.
    pub async fn create_user(&self, user: &NewUser) -> Result<User, ClientError> {
        let request = self.request(Endpoint::CreateUser).json(user);
        self.send_json(Endpoint::CreateUser, request).await
    }

    fn request(&self, endpoint: Endpoint) -> reqwest::RequestBuilder {
        self.http
            .request(endpoint.method(), self.endpoint_url(endpoint))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send_json<T>(
        &self,
        endpoint: Endpoint,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        tracing::debug!(%endpoint, "Sending backend request");

        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Transport { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = read_capped_error_body(response).await;
            return Err(ClientError::Status {
                endpoint,
                status,
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport { endpoint, source })?;

        let value = serde_json::from_slice(&bytes)
            .map_err(|source| ClientError::Decode { endpoint, source })?;
        tracing::debug!(%endpoint, %status, bytes = bytes.len(), "Backend request succeeded");
        Ok(value)
    }
}

/// Read at most [`MAX_ERROR_BODY_BYTES`] of an error response for diagnostics.
async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;

    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
