//! Data bridge: connects [`DashboardController`] streams to TUI actions.
//!
//! Runs as a background task, forwarding every feed event and connection
//! state transition as an [`Action`] through the TUI's action channel.

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use agentdash_core::DashboardController;

use crate::action::Action;

/// Open the feed and forward its events until `cancel` fires.
pub async fn spawn_data_bridge(
    controller: DashboardController,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    // Subscribe first so nothing sent right after connect is missed.
    let mut events = controller.subscribe();
    let mut conn_state = controller.connection_state();

    if let Err(e) = controller.connect().await {
        warn!(error = %e, "failed to start live feed");
        let _ = action_tx.send(Action::SystemError(format!("Live feed unavailable: {e}")));
        return;
    }

    let initial = conn_state.borrow_and_update().clone();
    let _ = action_tx.send(Action::FeedStateChanged(initial));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            result = events.recv() => match result {
                Ok(event) => {
                    let _ = action_tx.send(Action::Feed(event));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "data bridge lagged behind the feed");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },

            Ok(()) = conn_state.changed() => {
                let state = conn_state.borrow_and_update().clone();
                debug!(?state, "feed state changed");
                let _ = action_tx.send(Action::FeedStateChanged(state));
            }
        }
    }

    controller.disconnect().await;
    debug!("data bridge shut down");
}
