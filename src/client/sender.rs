//! Guarded outbound sends.

// ============================================================================
// Imports
// ============================================================================

use tracing::trace;

use crate::transport::ReadyState;

use super::manager::ConnectionHandle;

// ============================================================================
// MessageSender
// ============================================================================

/// Sends text frames over the current connection, if it is open.
///
/// Frames are forwarded verbatim. Nothing is queued: a send while the
/// connection is connecting, reconnecting or closed is dropped silently.
/// Callers that need delivery confirmation must track
/// [`Client::state`](crate::Client::state) themselves.
#[derive(Debug, Clone)]
pub struct MessageSender {
    connection: ConnectionHandle,
}

impl MessageSender {
    /// Creates a sender observing `connection`.
    #[inline]
    #[must_use]
    pub const fn new(connection: ConnectionHandle) -> Self {
        Self { connection }
    }

    /// Sends `data` if the current socket is open.
    pub fn send(&self, data: impl Into<String>) {
        match self.connection.socket() {
            Some(socket) if socket.ready_state() == ReadyState::Open => socket.send(data.into()),
            _ => trace!("Dropping frame, connection not open"),
        }
    }

    /// Returns `true` if a send would currently be forwarded.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.connection
            .socket()
            .is_some_and(|socket| socket.ready_state() == ReadyState::Open)
    }
}

// ============================================================================
// Tests
// ============================================================================
