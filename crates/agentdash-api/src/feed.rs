//! Live feed stream with auto-reconnect.
//!
//! Connects to the monitoring backend's WebSocket endpoint and streams
//! parsed [`FeedSnapshot`]s through a [`tokio::sync::broadcast`] channel.
//! Connection state is published on a [`tokio::sync::watch`] channel.
//! Reconnection uses exponential backoff + jitter.
//!
//! # Example
//!
//! ```rust,ignore
//! use agentdash_api::feed::{FeedEvent, FeedHandle, ReconnectConfig};
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! let cancel = CancellationToken::new();
//! let url = Url::parse("ws://localhost:8080/monitoring")?;
//!
//! let handle = FeedHandle::connect(url, ReconnectConfig::default(), cancel.clone())?;
//! let mut rx = handle.subscribe();
//!
//! while let Ok(FeedEvent::Snapshot(snap)) = rx.recv().await {
//!     println!("{} agents", snap.agents.as_ref().map_or(0, Vec::len));
//! }
//!
//! handle.shutdown();
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::{broadcast, watch};
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::types::FeedSnapshot;

// ── Broadcast channel capacity ───────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 256;

// ── FeedEvent / FeedState ────────────────────────────────────────────

/// One item delivered to feed subscribers.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// A successfully parsed snapshot.
    Snapshot(Arc<FeedSnapshot>),
    /// A text frame that could not be parsed. The connection stays open.
    Malformed { error: String },
}

/// Connection state of the feed, observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FeedState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting {
        attempt: u32,
    },
    /// Retry budget exhausted; the background task has exited.
    Failed,
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for feed reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── FeedHandle ───────────────────────────────────────────────────────

/// Handle to a running feed connection.
///
/// Call [`shutdown`](Self::shutdown) (or cancel the token passed to
/// [`connect`](Self::connect)) to tear down the background task.
pub struct FeedHandle {
    event_rx: broadcast::Receiver<FeedEvent>,
    state_rx: watch::Receiver<FeedState>,
    cancel: CancellationToken,
}

impl FeedHandle {
    /// Validate the URL and spawn the reconnection loop.
    ///
    /// Returns immediately once the background task is spawned. The first
    /// connection attempt happens asynchronously.
    pub fn connect(
        url: Url,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
    ) -> Result<Self, Error> {
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::UnsupportedScheme(url.scheme().to_owned()));
        }

        let (event_tx, event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(FeedState::Connecting);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            feed_loop(url, event_tx, state_tx, reconnect, task_cancel).await;
        });

        Ok(Self {
            event_rx,
            state_rx,
            cancel,
        })
    }

    /// Get a new broadcast receiver for the event stream.
    ///
    /// If a consumer falls behind, it receives
    /// [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.event_rx.resubscribe()
    }

    /// Watch the connection state.
    pub fn state(&self) -> watch::Receiver<FeedState> {
        self.state_rx.clone()
    }

    /// Signal the background task to shut down gracefully.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect → read → on disconnect, backoff → reconnect.
///
/// Every disconnect waits out the backoff, including a clean server close.
/// The attempt counter only resets once a connection has delivered a frame,
/// so a backend that accepts and immediately drops sockets is still paced.
async fn feed_loop(
    url: Url,
    event_tx: broadcast::Sender<FeedEvent>,
    state_tx: watch::Sender<FeedState>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        let mut frames: u64 = 0;
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&url, &event_tx, &state_tx, &cancel, &mut frames) => result,
        };

        // `Ok` only comes back when the token fired mid-read.
        let Err(e) = result else { break };

        if frames > 0 {
            attempt = 0;
        }

        if !e.is_transient() {
            tracing::error!(error = %e, "feed rejected permanently, giving up");
            let _ = state_tx.send(FeedState::Failed);
            return;
        }

        tracing::warn!(error = %e, attempt, frames, "feed disconnected");

        if let Some(max) = reconnect.max_retries {
            if attempt >= max {
                tracing::error!(
                    max_retries = max,
                    "feed reconnection limit reached, giving up"
                );
                let _ = state_tx.send(FeedState::Failed);
                return;
            }
        }

        let delay = calculate_backoff(attempt, &reconnect);
        tracing::info!(
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            attempt,
            "waiting before reconnect"
        );
        attempt += 1;
        let _ = state_tx.send(FeedState::Reconnecting { attempt });

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }
    }

    let _ = state_tx.send(FeedState::Disconnected);
    tracing::debug!("feed loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Close code reported when the stream ends without a close frame.
const ABNORMAL_CLOSURE: u16 = 1006;
/// Close code reported for a close frame without a payload.
const NO_STATUS_RECEIVED: u16 = 1005;

/// Establish a single WebSocket connection and read frames until it drops.
///
/// Returns `Ok(())` only on cancellation. Any other end of the session,
/// a clean close included, is an error so the caller backs off.
async fn connect_and_read(
    url: &Url,
    event_tx: &broadcast::Sender<FeedEvent>,
    state_tx: &watch::Sender<FeedState>,
    cancel: &CancellationToken,
    frames: &mut u64,
) -> Result<(), Error> {
    tracing::info!(url = %url, "connecting to feed");

    let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(handshake_error)?;

    tracing::info!("feed connected");
    let _ = state_tx.send(FeedState::Connected);

    let (_write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        *frames += 1;
                        parse_and_broadcast(&text, event_tx);
                    }
                    Some(Ok(tungstenite::Message::Ping(_))) => {
                        // tungstenite handles pong replies automatically
                        tracing::trace!("feed ping");
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        let (code, reason) = frame.map_or_else(
                            || (NO_STATUS_RECEIVED, String::new()),
                            |cf| (u16::from(cf.code), cf.reason.to_string()),
                        );
                        tracing::info!(code, %reason, "feed close frame received");
                        return Err(Error::WebSocketClosed { code, reason });
                    }
                    Some(Err(e)) => {
                        return Err(Error::WebSocketConnect(e.to_string()));
                    }
                    None => {
                        tracing::info!("feed stream ended");
                        return Err(Error::WebSocketClosed {
                            code: ABNORMAL_CLOSURE,
                            reason: "stream ended".into(),
                        });
                    }
                    _ => {
                        // Binary, Pong, Frame
                    }
                }
            }
        }
    }
}

/// An HTTP answer to the upgrade request keeps its status, so a 4xx
/// (auth, wrong path) stops the loop instead of retrying forever.
fn handshake_error(err: tungstenite::Error) -> Error {
    match err {
        tungstenite::Error::Http(response) => Error::Http {
            status: response.status().as_u16(),
            body: String::new(),
        },
        other => Error::WebSocketConnect(other.to_string()),
    }
}

// ── Message parsing ──────────────────────────────────────────────────

/// Parse a text frame and broadcast the result.
///
/// Parse failures are reported as [`FeedEvent::Malformed`] rather than
/// dropped, so the dashboard can surface them.
fn parse_and_broadcast(text: &str, event_tx: &broadcast::Sender<FeedEvent>) {
    let event = match serde_json::from_str::<FeedSnapshot>(text) {
        Ok(snapshot) => FeedEvent::Snapshot(Arc::new(snapshot)),
        Err(e) => {
            tracing::warn!(error = %e, len = text.len(), "failed to parse feed message");
            FeedEvent::Malformed {
                error: e.to_string(),
            }
        }
    };

    // Ignore send errors -- just means no active subscribers right now
    let _ = event_tx.send(event);
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) + jitter`
///
/// Jitter is +-25% so several dashboards do not reconnect in lockstep.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap,
    clippy::as_conversions
)]
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = attempt.min(31) as i32;
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic "jitter" seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────
