//! End-to-end tests against a local WebSocket server.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use hmr_client::{Client, ConnectionState, Envelope, EventBus, PageLocation};
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Helpers
// ============================================================================

const WAIT: Duration = Duration::from_secs(5);
const RETRY: Duration = Duration::from_millis(100);
const PATH: &str = "/_next/webpack-hmr";

async fn bind() -> (TcpListener, PageLocation) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    (listener, PageLocation::new("http", "127.0.0.1", Some(port)))
}

async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = timeout(WAIT, listener.accept())
        .await
        .expect("client connects in time")
        .expect("accept");

    tokio_tungstenite::accept_async(stream)
        .await
        .expect("websocket handshake")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn spawn(page: PageLocation) -> (Client, mpsc::UnboundedReceiver<Envelope>) {
    init_tracing();

    let (tx, rx) = mpsc::unbounded_channel();
    let bus = Arc::new(EventBus::new());
    bus.register(move |envelope| {
        let _ = tx.send(envelope.clone());
    });

    let client = Client::builder()
        .path(PATH)
        .timeout(RETRY)
        .page(page)
        .event_bus(bus)
        .spawn()
        .expect("client spawns");

    (client, rx)
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Envelope>) -> Envelope {
    timeout(WAIT, rx.recv())
        .await
        .expect("envelope in time")
        .expect("envelope")
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_connect_receive_and_send() {
    let (listener, page) = bind().await;
    let port = page.port().expect("port");
    let (client, mut envelopes) = spawn(page);

    assert_eq!(client.url(), format!("ws://127.0.0.1:{port}{PATH}"));

    let mut server = accept(&listener).await;
    assert_eq!(next(&mut envelopes).await, Envelope::Connected);
    assert_eq!(client.state(), ConnectionState::Open);

    server
        .send(Message::text(r#"{"action":"built","hash":"abc"}"#))
        .await
        .expect("server send");
    assert_eq!(
        next(&mut envelopes).await,
        Envelope::Message {
            data: json!({ "action": "built", "hash": "abc" })
        }
    );

    client.send(r#"{"event":"ping"}"#);
    let frame = timeout(WAIT, server.next())
        .await
        .expect("frame in time")
        .expect("frame")
        .expect("valid frame");
    assert_eq!(frame.into_text().expect("text frame").as_str(), r#"{"event":"ping"}"#);

    client.shutdown().await;
}

#[tokio::test]
async fn test_malformed_frame_is_skipped() {
    let (listener, page) = bind().await;
    let (client, mut envelopes) = spawn(page);

    let mut server = accept(&listener).await;
    assert_eq!(next(&mut envelopes).await, Envelope::Connected);

    server
        .send(Message::text("this is not json"))
        .await
        .expect("server send");
    server
        .send(Message::text(r#"{"action":"sync"}"#))
        .await
        .expect("server send");

    assert_eq!(
        next(&mut envelopes).await,
        Envelope::Message {
            data: json!({ "action": "sync" })
        }
    );
    assert_eq!(client.state(), ConnectionState::Open);
}

#[tokio::test]
async fn test_reconnects_after_server_drops_connection() {
    let (listener, page) = bind().await;
    let (client, mut envelopes) = spawn(page);

    let server = accept(&listener).await;
    assert_eq!(next(&mut envelopes).await, Envelope::Connected);

    // Abrupt drop, no closing handshake
    drop(server);

    let _server = accept(&listener).await;
    assert_eq!(next(&mut envelopes).await, Envelope::Connected);
    assert_eq!(client.state(), ConnectionState::Open);
}

#[tokio::test]
async fn test_retries_until_server_appears() {
    // Reserve a port, then release it so the first attempts are refused
    let (listener, page) = bind().await;
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let (client, mut envelopes) = spawn(page);

    tokio::time::sleep(RETRY * 3).await;
    assert_ne!(client.state(), ConnectionState::Open);

    let listener = TcpListener::bind(addr).await.expect("rebind");
    let _server = accept(&listener).await;

    assert_eq!(next(&mut envelopes).await, Envelope::Connected);
}

#[tokio::test]
async fn test_close_and_restart() {
    let (listener, page) = bind().await;
    let (client, mut envelopes) = spawn(page);

    let mut server = accept(&listener).await;
    assert_eq!(next(&mut envelopes).await, Envelope::Connected);

    client.close();

    // Server observes the closing handshake
    let closed = timeout(WAIT, async {
        while let Some(frame) = server.next().await {
            if matches!(frame, Ok(Message::Close(_)) | Err(_)) {
                break;
            }
        }
    })
    .await;
    assert!(closed.is_ok());
    assert_eq!(client.state(), ConnectionState::Idle);

    client.restart();
    let _server = accept(&listener).await;
    assert_eq!(next(&mut envelopes).await, Envelope::Connected);
}
