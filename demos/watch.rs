//! Watch a dev server's hot reload channel and log every notification.
//!
//! Usage: cargo run --example watch -- [page-url] [path] [asset-prefix]
//!
//! Defaults: `http://localhost:3000`, `/_next/webpack-hmr`, empty prefix.
//! Set `RUST_LOG=hmr_client=debug` to see reconnect attempts.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use hmr_client::{Client, Envelope, EventBus, PageLocation};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = env::args().skip(1);
    let page = args
        .next()
        .unwrap_or_else(|| "http://localhost:3000".to_string());
    let path = args
        .next()
        .unwrap_or_else(|| "/_next/webpack-hmr".to_string());
    let asset_prefix = args.next().unwrap_or_default();

    // Registered before spawn so the first `Connected` is not missed
    let (connected_tx, mut connected_rx) = mpsc::unbounded_channel();
    let bus = Arc::new(EventBus::new());
    bus.register(move |envelope| match envelope {
        Envelope::Connected => {
            let _ = connected_tx.send(());
        }
        Envelope::Message { data } => {
            let action = data.get("action").and_then(|a| a.as_str()).unwrap_or("?");
            info!(action, %data, "Notification");
        }
    });

    let client = Client::builder()
        .path(path)
        .asset_prefix(asset_prefix)
        .timeout(Duration::from_secs(2))
        .log(true)
        .page(PageLocation::parse(&page)?)
        .event_bus(bus)
        .spawn()?;

    info!(url = client.url(), "Watching");

    loop {
        tokio::select! {
            Some(()) = connected_rx.recv() => {
                client.send(r#"{"event":"ping","page":"/"}"#);
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
        }
    }

    client.shutdown().await;

    Ok(())
}
