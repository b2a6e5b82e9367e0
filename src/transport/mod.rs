//! Transport layer.
//!
//! A [`Connector`] plays the role of a WebSocket constructor: it returns a
//! [`Socket`] immediately and reports lifecycle changes later through a
//! [`SignalSink`]. The client never awaits the transport directly.
//!
//! # Signal Flow
//!
//! ```text
//! ┌──────────────────┐   open(url, sink)   ┌─────────────────────┐
//! │ ConnectionManager│────────────────────►│ Connector           │
//! │                  │◄──── Arc<Socket> ───│                     │
//! │                  │                     │  socket event loop  │
//! │  handle_signal   │◄── Signal{gen,..} ──│  (tokio task)       │
//! └──────────────────┘                     └─────────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `signal` | Lifecycle signals tagged with a connection generation |
//! | `websocket` | tokio-tungstenite implementation |

// ============================================================================
// Submodules
// ============================================================================

/// Lifecycle signals emitted by sockets.
pub mod signal;

/// WebSocket connector backed by tokio-tungstenite.
pub mod websocket;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

// ============================================================================
// Re-exports
// ============================================================================

pub use signal::{Signal, SignalKind, SignalSink};
pub use websocket::WebSocketConnector;

// ============================================================================
// ReadyState
// ============================================================================

/// Lifecycle state of a single socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadyState {
    /// Handshake in progress.
    Connecting,
    /// Frames can be sent and received.
    Open,
    /// Close requested, not finished yet.
    Closing,
    /// No further frames will flow.
    Closed,
}

// ============================================================================
// Traits
// ============================================================================

/// A single duplex connection.
pub trait Socket: Send + Sync {
    /// Returns the current ready state.
    fn ready_state(&self) -> ReadyState;

    /// Sends a text frame verbatim.
    ///
    /// Implementations may drop the frame if the socket is not open.
    fn send(&self, data: String);

    /// Closes the socket. Idempotent.
    fn close(&self);
}

/// Opens sockets.
pub trait Connector: Send + Sync + 'static {
    /// Starts connecting to `url` and returns the socket immediately.
    ///
    /// Every lifecycle change of the returned socket must be reported
    /// through `sink`.
    fn open(&self, url: &str, sink: SignalSink) -> Arc<dyn Socket>;
}
