//! WebSocket connector and socket event loop.
//!
//! Each [`WebSocketConnector::open`] call spawns a tokio task that owns the
//! stream for the lifetime of one connection.
//!
//! # Event Loop
//!
//! The task handles:
//!
//! - The client handshake (aborted silently if the socket is closed first)
//! - Incoming text frames, forwarded as [`SignalKind::Message`](super::SignalKind)
//! - Outgoing text frames from [`Socket::send`]
//! - Close requests from [`Socket::close`]

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace, warn};

use crate::error::Error;

use super::{Connector, ReadyState, SignalSink, Socket};

// ============================================================================
// SocketCommand
// ============================================================================

/// Internal commands for the event loop.
enum SocketCommand {
    /// Send a text frame.
    Send(String),
    /// Close the connection.
    Close,
}

// ============================================================================
// WebSocketConnector
// ============================================================================

/// [`Connector`] backed by `tokio_tungstenite::connect_async`.
///
/// `wss://` URLs need the `rustls` crate feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    /// Creates a new connector.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Connector for WebSocketConnector {
    fn open(&self, url: &str, sink: SignalSink) -> Arc<dyn Socket> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(ReadyState::Connecting));

        tokio::spawn(run_event_loop(
            url.to_string(),
            Arc::clone(&state),
            command_rx,
            sink,
        ));

        Arc::new(WebSocketSocket { state, command_tx })
    }
}

// ============================================================================
// WebSocketSocket
// ============================================================================

/// Handle to one WebSocket connection.
///
/// Dropping the handle does not close the connection; call
/// [`Socket::close`].
struct WebSocketSocket {
    /// Ready state (shared with event loop).
    state: Arc<Mutex<ReadyState>>,
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<SocketCommand>,
}

impl Socket for WebSocketSocket {
    fn ready_state(&self) -> ReadyState {
        *self.state.lock()
    }

    fn send(&self, data: String) {
        let _ = self.command_tx.send(SocketCommand::Send(data));
    }

    fn close(&self) {
        {
            let mut state = self.state.lock();
            if matches!(*state, ReadyState::Closing | ReadyState::Closed) {
                return;
            }
            *state = ReadyState::Closing;
        }

        let _ = self.command_tx.send(SocketCommand::Close);
    }
}

// ============================================================================
// Event Loop
// ============================================================================

/// Event loop that handles WebSocket I/O for one connection.
async fn run_event_loop(
    url: String,
    state: Arc<Mutex<ReadyState>>,
    mut command_rx: mpsc::UnboundedReceiver<SocketCommand>,
    sink: SignalSink,
) {
    let generation = sink.generation();
    let connect = connect_async(url.as_str());
    tokio::pin!(connect);

    // Handshake, unless the socket is closed first
    let ws_stream = loop {
        tokio::select! {
            result = &mut connect => match result {
                Ok((ws_stream, _)) => break ws_stream,
                Err(e) => {
                    *state.lock() = ReadyState::Closed;
                    debug!(generation, %url, error = %e, "WebSocket connect failed");
                    sink.error(e);
                    return;
                }
            },

            command = command_rx.recv() => match command {
                Some(SocketCommand::Send(_)) => {
                    trace!(generation, "Dropping frame sent before open");
                }
                Some(SocketCommand::Close) | None => {
                    *state.lock() = ReadyState::Closed;
                    debug!(generation, "Connect aborted by close");
                    return;
                }
            },
        }
    };

    {
        let mut guard = state.lock();
        if *guard != ReadyState::Connecting {
            // Closed while the handshake was completing
            *guard = ReadyState::Closed;
            return;
        }
        *guard = ReadyState::Open;
    }

    debug!(generation, %url, "WebSocket connection established");
    sink.open();

    let (mut ws_write, mut ws_read) = ws_stream.split();

    loop {
        tokio::select! {
            // Incoming frames from the dev server
            message = ws_read.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        sink.message(text.as_str());
                    }

                    Some(Ok(Message::Close(frame))) => {
                        debug!(generation, ?frame, "WebSocket closed by remote");
                        *state.lock() = ReadyState::Closed;
                        sink.closed();
                        break;
                    }

                    Some(Err(e)) => {
                        *state.lock() = ReadyState::Closed;
                        sink.error(e);
                        break;
                    }

                    None => {
                        *state.lock() = ReadyState::Closed;
                        sink.error(Error::ConnectionClosed);
                        break;
                    }

                    // Ignore Binary, Ping, Pong
                    _ => {}
                }
            }

            // Commands from the client
            command = command_rx.recv() => {
                match command {
                    Some(SocketCommand::Send(data)) => {
                        if let Err(e) = ws_write.send(Message::Text(data.into())).await {
                            warn!(generation, error = %e, "Failed to send frame");
                        }
                    }

                    Some(SocketCommand::Close) | None => {
                        trace!(generation, "Close requested");
                        let _ = ws_write.close().await;
                        *state.lock() = ReadyState::Closed;
                        break;
                    }
                }
            }
        }
    }

    debug!(generation, "Socket event loop terminated");
}

// ============================================================================
// Tests
// ============================================================================
