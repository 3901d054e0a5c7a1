//! HTTP gateway: one method per backend endpoint, grouped into per-resource
//! service traits so view-models can be driven by fakes.

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::ApiError;
use crate::session::Session;

mod agency;
mod auth;
mod caregivers;
mod documents;
mod facilities;
mod shifts;
pub mod upload;

pub use agency::AgencyService;
pub use auth::AuthService;
pub use caregivers::CaregiverService;
pub use documents::DocumentService;
pub use facilities::FacilityService;
pub use shifts::ShiftService;
pub use upload::{FilePart, MultipartPayload};

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Which configured host an endpoint lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    Api,
    /// Caregiver listings are served next to the auth service.
    Auth,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    auth_base_url: Url,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("auth_base_url", &self.auth_base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, auth_base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("omni-agency/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(ApiError::Network)?;
        Ok(Self {
            http,
            base_url: parse_base(base_url)?,
            auth_base_url: parse_base(auth_base_url)?,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ApiError> {
        Self::new(
            &cfg.api.base_url,
            cfg.api.auth_base_url(),
            Duration::from_secs(cfg.api.timeout_secs),
        )
    }

    pub fn endpoint(&self, host: Host, path: &str) -> Result<Url, ApiError> {
        let base = match host {
            Host::Api => &self.base_url,
            Host::Auth => &self.auth_base_url,
        };
        base.join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Url(e.to_string()))
    }

    /// Start a request. With a session the bearer token is attached, and a
    /// session without one fails here so nothing is sent.
    pub fn request(
        &self,
        method: Method,
        host: Host,
        path: &str,
        session: Option<&Session>,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(host, path)?;
        let mut builder = self
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string());
        if let Some(session) = session {
            builder = builder.bearer_auth(session.token()?);
        }
        Ok(builder)
    }

    /// Send and return the raw body of a 2xx response. Non-2xx bodies are
    /// mined for a backend `message`, else `fallback` is used.
    async fn send(&self, builder: RequestBuilder, fallback: &str) -> Result<String, ApiError> {
        let request = builder.build().map_err(ApiError::Network)?;
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, %request_id, "sending request");

        let res = self.http.execute(request).await.map_err(|err| {
            error!(%method, %url, %request_id, ?err, "request failed");
            ApiError::Network(err)
        })?;

        let status = res.status();
        let body = res.text().await.map_err(ApiError::Network)?;
        if !status.is_success() {
            let err = ApiError::from_status(status, &body, fallback);
            warn!(%method, %url, %request_id, %status, error = %err, "backend rejected request");
            return Err(err);
        }
        debug!(%method, %url, %request_id, %status, "request ok");
        Ok(body)
    }

    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let body = self.send(builder, fallback).await?;
        decode(&body)
    }

    /// For endpoints whose response body is not used.
    pub(crate) async fn execute_unit(
        &self,
        builder: RequestBuilder,
        fallback: &str,
    ) -> Result<(), ApiError> {
        self.send(builder, fallback).await.map(|_| ())
    }
}

fn parse_base(raw: &str) -> Result<Url, ApiError> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw).map_err(|e| ApiError::Url(e.to_string()))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|err| {
        error!(?err, "invalid backend response");
        ApiError::Decode(err)
    })
}
