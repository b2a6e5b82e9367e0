//! HMR client - resilient hot reload channel for development servers.
//!
//! This library keeps a WebSocket connection to a local dev server open,
//! reconnects with a fixed delay whenever the transport fails, and fans out
//! every notification to any number of subscribers.
//!
//! # Architecture
//!
//! ```text
//! PageLocation + Options
//!         │
//!         ▼
//! ProtocolResolver ──► ConnectionManager ──► Connector ──► dev server
//!                            │   ▲
//!                 envelopes  │   │ signals (open / message / error / closed)
//!                            ▼   │
//!                        EventBus ──► subscribers
//!
//!                  MessageSender ──► current socket (only while open)
//! ```
//!
//! Key design principles:
//!
//! - One event loop task per [`Client`] serializes every state transition
//!   and every dispatch
//! - Exactly one current connection; a new attempt closes the previous one
//! - Signals are tagged with a connection generation so late signals from a
//!   closed socket are ignored
//! - Transport errors are retried forever with a fixed delay
//!
//! # Quick Start
//!
//! Register subscribers on the [`EventBus`] before spawning so none of them
//! misses the first `Connected` envelope.
//!
//! ```no_run
//! use std::sync::Arc;
//! use hmr_client::{Client, Envelope, EventBus, PageLocation};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = Arc::new(EventBus::new());
//!     bus.register(|envelope| match envelope {
//!         Envelope::Connected => println!("connected"),
//!         Envelope::Message { data } => println!("update: {data}"),
//!     });
//!
//!     let client = Client::builder()
//!         .path("/_next/webpack-hmr")
//!         .page(PageLocation::parse("http://localhost:3000")?)
//!         .log(true)
//!         .event_bus(bus)
//!         .spawn()?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     client.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bus`] | Ordered subscriber fan-out |
//! | [`client`] | [`Client`], builder, options, connection manager |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`location`] | Hosting page location |
//! | [`protocol`] | [`Scheme`] resolution and [`Envelope`] |
//! | [`transport`] | Connector seam and WebSocket implementation |

// ============================================================================
// Modules
// ============================================================================

/// Ordered subscriber fan-out.
pub mod bus;

/// Client runtime, configuration and connection management.
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Hosting page location.
pub mod location;

/// Scheme resolution and notification envelopes.
pub mod protocol;

/// Transport seam and WebSocket implementation.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{
    Client, ClientBuilder, ConnectionHandle, ConnectionState, DEFAULT_TIMEOUT, MessageSender,
    Options, build_url,
};

// Event types
pub use bus::{EventBus, Subscriber};
pub use protocol::{Envelope, Scheme, resolve};

// Error types
pub use error::{Error, Result};

// Location
pub use location::PageLocation;

// Transport types
pub use transport::{
    Connector, ReadyState, Signal, SignalKind, SignalSink, Socket, WebSocketConnector,
};
