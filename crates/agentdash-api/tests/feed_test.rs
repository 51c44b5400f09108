// Integration tests for `FeedHandle` against a local WebSocket server.
#![allow(clippy::unwrap_used)]

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use url::Url;

use agentdash_api::{FeedEvent, FeedHandle, FeedState, ReconnectConfig};

// ── Helpers ─────────────────────────────────────────────────────────

/// Start a WebSocket server on an ephemeral port. Every accepted
/// connection is counted and handed to `handler`.
async fn serve<F, Fut>(handler: F) -> (Url, Arc<AtomicUsize>)
where
    F: Fn(WebSocketStream<TcpStream>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&connections);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Ok(ws) = tokio_tungstenite::accept_async(stream).await {
                tokio::spawn(handler(ws));
            }
        }
    });

    let url = Url::parse(&format!("ws://{addr}/monitoring")).unwrap();
    (url, connections)
}

async fn wait_for_state(handle: &FeedHandle, wanted: &FeedState) -> bool {
    let mut state = handle.state();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if *state.borrow_and_update() == *wanted {
                return true;
            }
            if state.changed().await.is_err() {
                return *state.borrow() == *wanted;
            }
        }
    })
    .await
    .unwrap_or(false)
}

// ── Frames ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_bad_frame_does_not_drop_connection() {
    let (url, connections) = serve(|mut ws| async move {
        ws.send(Message::Text("not json at all".into())).await.unwrap();
        let snapshot = r#"{"agents":[{"name":"Developer","status":"active","metrics":{}}]}"#;
        ws.send(Message::Text(snapshot.into())).await.unwrap();
        // Hold the connection open until the client goes away.
        while ws.next().await.is_some() {}
    })
    .await;

    let handle =
        FeedHandle::connect(url, ReconnectConfig::default(), CancellationToken::new()).unwrap();
    let mut rx = handle.subscribe();

    let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(first, FeedEvent::Malformed { .. }), "{first:?}");

    let second = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    let FeedEvent::Snapshot(snapshot) = second else {
        panic!("expected snapshot, got {second:?}");
    };
    assert_eq!(snapshot.agents.as_ref().unwrap()[0].name, "Developer");

    assert_eq!(*handle.state().borrow(), FeedState::Connected);
    assert_eq!(connections.load(Ordering::SeqCst), 1);
    handle.shutdown();
}

// ── Reconnect pacing ────────────────────────────────────────────────

#[tokio::test]
async fn test_clean_close_waits_for_backoff() {
    let (url, connections) = serve(|mut ws| async move {
        let _ = ws.close(None).await;
    })
    .await;

    let reconnect = ReconnectConfig {
        initial_delay: Duration::from_millis(100),
        max_delay: Duration::from_millis(400),
        max_retries: None,
    };
    let handle = FeedHandle::connect(url, reconnect, CancellationToken::new()).unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;
    handle.shutdown();

    // Delays of roughly 100, 240 and 490 ms fit at most four dials into
    // one second.
    let dials = connections.load(Ordering::SeqCst);
    assert!((2..=6).contains(&dials), "dialled {dials} times in 1s");
}

#[tokio::test]
async fn test_silent_sessions_keep_growing_the_backoff() {
    let (url, _connections) = serve(|mut ws| async move {
        let _ = ws.close(None).await;
    })
    .await;

    let reconnect = ReconnectConfig {
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        max_retries: Some(3),
    };
    let handle = FeedHandle::connect(url, reconnect, CancellationToken::new()).unwrap();

    // Sessions that never deliver a frame do not reset the attempt
    // counter, so the retry budget runs out.
    assert!(wait_for_state(&handle, &FeedState::Failed).await);
}

#[tokio::test]
async fn test_rejected_upgrade_gives_up() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&connections);
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = [0_u8; 4096];
            let _ = stream.read(&mut buf).await;
            let _ = stream
                .write_all(b"HTTP/1.1 401 Unauthorized\r\nContent-Length: 0\r\n\r\n")
                .await;
            let _ = stream.shutdown().await;
        }
    });

    let url = Url::parse(&format!("ws://{addr}/monitoring")).unwrap();
    let handle = FeedHandle::connect(url, ReconnectConfig::default(), CancellationToken::new())
        .unwrap();

    assert!(wait_for_state(&handle, &FeedState::Failed).await);
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}
