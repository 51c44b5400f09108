// ── Dashboard controller ──
//
// Owns the live feed connection, the REST control client and the refresh
// timer. Consumers subscribe to `DashboardEvent`s and apply them to a
// `Dashboard` on their own loop.

use std::sync::Arc;
use std::time::Duration;

use agentdash_api::{
    ControlClient, FeedEvent, FeedHandle, FeedState, TlsMode, TransportConfig,
};
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::ControlPanel;
use crate::config::{DashboardConfig, TlsVerification};
use crate::error::CoreError;

const EVENT_CHANNEL_SIZE: usize = 256;

/// Everything a consumer of the controller can receive.
#[derive(Debug, Clone)]
pub enum DashboardEvent {
    Feed(FeedEvent),
    /// The refresh interval elapsed.
    RefreshDue,
}

/// Cheaply cloneable via `Arc<ControllerInner>`.
#[derive(Clone)]
pub struct DashboardController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: DashboardConfig,
    panel: ControlPanel,
    connection_state: watch::Sender<FeedState>,
    event_tx: broadcast::Sender<DashboardEvent>,
    session: Mutex<Option<FeedSession>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

/// One `connect()`..`disconnect()` span. Each session gets a fresh token,
/// so the controller can be reconnected after a disconnect.
struct FeedSession {
    feed: FeedHandle,
    cancel: CancellationToken,
}

impl DashboardController {
    /// Build the REST client. Does NOT open the feed; call
    /// [`connect()`](Self::connect) for that.
    pub fn new(config: DashboardConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = ControlClient::new(config.api_url.clone(), &transport)?;
        let (connection_state, _) = watch::channel(FeedState::Disconnected);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                panel: ControlPanel::new(client),
                connection_state,
                event_tx,
                session: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Open the live feed and start the background tasks.
    ///
    /// Returns once the tasks are spawned; the first connection attempt
    /// happens asynchronously and is reported through
    /// [`connection_state()`](Self::connection_state). Calling this on an
    /// already connected controller is a no-op.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let mut session = self.inner.session.lock().await;
        if session.is_some() {
            debug!("feed already open");
            return Ok(());
        }

        let config = &self.inner.config;
        let cancel = CancellationToken::new();
        let feed = FeedHandle::connect(
            config.feed_url.clone(),
            config.reconnect.clone(),
            cancel.clone(),
        )?;

        let mut handles = self.inner.task_handles.lock().await;

        handles.push(tokio::spawn(forward_events(
            feed.subscribe(),
            self.inner.event_tx.clone(),
            cancel.clone(),
        )));
        handles.push(tokio::spawn(forward_state(
            feed.state(),
            self.inner.connection_state.clone(),
            cancel.clone(),
        )));

        let interval_secs = config.refresh_interval_secs;
        if interval_secs > 0 {
            handles.push(tokio::spawn(refresh_task(
                self.inner.event_tx.clone(),
                interval_secs,
                cancel.clone(),
            )));
        }

        *session = Some(FeedSession { feed, cancel });
        info!(url = %config.feed_url, "live feed started");
        Ok(())
    }

    /// Stop the feed and every background task. A later
    /// [`connect()`](Self::connect) starts a new session.
    pub async fn disconnect(&self) {
        if let Some(session) = self.inner.session.lock().await.take() {
            session.cancel.cancel();
            session.feed.shutdown();
        }

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        let _ = self.inner.connection_state.send(FeedState::Disconnected);
        debug!("disconnected");
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.inner.event_tx.subscribe()
    }

    pub fn connection_state(&self) -> watch::Receiver<FeedState> {
        self.inner.connection_state.subscribe()
    }

    pub fn control_panel(&self) -> ControlPanel {
        self.inner.panel.clone()
    }
}

fn build_transport(config: &DashboardConfig) -> TransportConfig {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    TransportConfig {
        tls,
        timeout: config.timeout,
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Re-broadcast feed events as dashboard events.
async fn forward_events(
    mut rx: broadcast::Receiver<FeedEvent>,
    tx: broadcast::Sender<DashboardEvent>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = rx.recv() => match result {
                Ok(event) => {
                    let _ = tx.send(DashboardEvent::Feed(event));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "feed consumer lagged, messages dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

/// Mirror the feed's connection state onto the controller's watch channel.
async fn forward_state(
    mut rx: watch::Receiver<FeedState>,
    tx: watch::Sender<FeedState>,
    cancel: CancellationToken,
) {
    loop {
        let state = rx.borrow_and_update().clone();
        let _ = tx.send(state);

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    // Feed task exited; its last state was already sent
                    // unless it changed right before the sender dropped.
                    let last = rx.borrow().clone();
                    let _ = tx.send(last);
                    break;
                }
            }
        }
    }
}

/// Emit [`DashboardEvent::RefreshDue`] every `interval_secs`.
async fn refresh_task(
    tx: broadcast::Sender<DashboardEvent>,
    interval_secs: u64,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let _ = tx.send(DashboardEvent::RefreshDue);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use url::Url;

    fn config(feed_url: &str) -> DashboardConfig {
        DashboardConfig {
            feed_url: Url::parse(feed_url).unwrap(),
            refresh_interval_secs: 1,
            ..DashboardConfig::default()
        }
    }

    #[tokio::test]
    async fn http_feed_url_is_rejected_on_connect() {
        let ctrl = DashboardController::new(config("http://localhost:8080/monitoring")).unwrap();
        let err = ctrl.connect().await.unwrap_err();
        assert!(matches!(err, CoreError::Config { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_timer_emits_ticks() {
        let (tx, mut rx) = broadcast::channel(8);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(refresh_task(tx, 30, cancel.clone()));

        tokio::time::advance(Duration::from_secs(31)).await;
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, DashboardEvent::RefreshDue));

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn disconnect_resets_state() {
        // Nothing listens on port 9; the feed keeps retrying until cancelled.
        let ctrl = DashboardController::new(config("ws://127.0.0.1:9/monitoring")).unwrap();
        ctrl.connect().await.unwrap();
        ctrl.connect().await.unwrap();

        ctrl.disconnect().await;
        assert_eq!(*ctrl.connection_state().borrow(), FeedState::Disconnected);
        assert!(ctrl.inner.session.lock().await.is_none());
    }

    #[tokio::test]
    async fn reconnect_after_disconnect_starts_live_session() {
        let ctrl = DashboardController::new(config("ws://127.0.0.1:9/monitoring")).unwrap();
        ctrl.connect().await.unwrap();
        ctrl.disconnect().await;

        ctrl.connect().await.unwrap();
        let mut state = ctrl.connection_state();

        // Reconnecting only shows up once the feed loop has dialled the port.
        let retrying = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if matches!(*state.borrow_and_update(), FeedState::Reconnecting { .. }) {
                    return true;
                }
                if state.changed().await.is_err() {
                    return false;
                }
            }
        })
        .await;
        assert_eq!(retrying.ok(), Some(true));

        let session = ctrl.inner.session.lock().await;
        assert!(!session.as_ref().unwrap().cancel.is_cancelled());
        drop(session);
        ctrl.disconnect().await;
    }
}
