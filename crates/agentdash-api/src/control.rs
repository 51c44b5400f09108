// REST control client
//
// Wraps `reqwest::Client` with URL construction and status checking for the
// two write endpoints the backend exposes. Neither endpoint defines a
// structured response body: any 2xx is success, anything else is a failure
// carrying the raw body.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{ControlRequest, SettingRequest};

const CONTROL_PATH: &str = "api/agents/control";
const SETTINGS_PATH: &str = "api/agents/settings";

/// HTTP client for the agent control and settings endpoints.
#[derive(Debug, Clone)]
pub struct ControlClient {
    http: reqwest::Client,
    base_url: Url,
    /// Request timeout the client was built with, reported on expiry.
    timeout: Duration,
}

impl ControlClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root (e.g. `http://localhost:8080`); the
    /// endpoint paths are appended to it.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`. `timeout` should
    /// match the one `http` was built with.
    pub fn with_client(http: reqwest::Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            http,
            base_url,
            timeout,
        }
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `POST /api/agents/control`
    pub async fn send_control(&self, request: &ControlRequest) -> Result<(), Error> {
        let url = self.endpoint_url(CONTROL_PATH)?;
        self.post(url, request).await
    }

    /// `POST /api/agents/settings`
    pub async fn send_setting(&self, request: &SettingRequest) -> Result<(), Error> {
        let url = self.endpoint_url(SETTINGS_PATH)?;
        self.post(url, request).await
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/{path}`, keeping any path prefix the base URL carries.
    pub(crate) fn endpoint_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path);
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a POST request with a JSON body and check the status.
    async fn post(&self, url: Url, body: &impl Serialize) -> Result<(), Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "control endpoint rejected request");
        Err(Error::Http {
            status: status.as_u16(),
            body,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }
}
