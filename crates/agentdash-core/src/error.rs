// ── Core error types ──
//
// User-facing errors from agentdash-core. Consumers never see reqwest or
// tungstenite errors directly; the `From<agentdash_api::Error>` impl
// translates transport-layer errors into dashboard-level variants whose
// Display text is short enough to land in an activity log line.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("cannot reach {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Backend responses ────────────────────────────────────────────
    #[error("backend rejected the request (HTTP {status})")]
    Rejected {
        status: u16,
        /// Raw response body; no structured error contract exists.
        body: String,
    },

    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<agentdash_api::Error> for CoreError {
    fn from(err: agentdash_api::Error) -> Self {
        use agentdash_api::Error as ApiError;

        match err {
            ApiError::Transport(ref e) => {
                // Timeouts arrive as `ApiError::Timeout` with the real limit.
                if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: "connection refused".into(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            ApiError::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            ApiError::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ApiError::Http { status, body } => CoreError::Rejected { status, body },
            ApiError::UnsupportedScheme(scheme) => CoreError::Config {
                message: format!("feed URL must use ws:// or wss://, got {scheme}://"),
            },
            ApiError::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket connection failed: {reason}"),
            },
            ApiError::WebSocketClosed { code, reason } => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket closed (code {code}): {reason}"),
            },
        }
    }
}
