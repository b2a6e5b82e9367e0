//! Lifecycle signals.
//!
//! Each socket reports to the client through a [`SignalSink`] bound to the
//! generation of the connection it belongs to. Signals from a superseded
//! generation are ignored by the manager.

// ============================================================================
// Imports
// ============================================================================

use tokio::sync::mpsc;
use tracing::trace;

use crate::error::Error;

// ============================================================================
// Signal
// ============================================================================

/// What happened on a socket.
#[derive(Debug)]
pub enum SignalKind {
    /// Handshake finished; the socket is open.
    Open,
    /// Text frame received.
    Message(String),
    /// Transport failure. Always triggers a reconnect.
    Error(Error),
    /// Remote end completed a clean close.
    Closed,
}

/// A [`SignalKind`] tagged with the generation of its connection.
#[derive(Debug)]
pub struct Signal {
    /// Generation of the connection that produced the signal.
    pub generation: u64,
    /// The signal itself.
    pub kind: SignalKind,
}

impl Signal {
    /// Creates a new signal.
    #[inline]
    #[must_use]
    pub const fn new(generation: u64, kind: SignalKind) -> Self {
        Self { generation, kind }
    }
}

// ============================================================================
// SignalSink
// ============================================================================

/// Sending half handed to a [`Connector`](super::Connector) for one socket.
#[derive(Debug, Clone)]
pub struct SignalSink {
    generation: u64,
    tx: mpsc::UnboundedSender<Signal>,
}

impl SignalSink {
    /// Creates a sink for connection `generation`.
    #[inline]
    #[must_use]
    pub const fn new(generation: u64, tx: mpsc::UnboundedSender<Signal>) -> Self {
        Self { generation, tx }
    }

    /// Returns the generation this sink is bound to.
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Reports that the socket opened.
    pub fn open(&self) {
        self.emit(SignalKind::Open);
    }

    /// Reports an inbound text frame.
    pub fn message(&self, text: impl Into<String>) {
        self.emit(SignalKind::Message(text.into()));
    }

    /// Reports a transport failure.
    pub fn error(&self, error: impl Into<Error>) {
        self.emit(SignalKind::Error(error.into()));
    }

    /// Reports a clean close.
    pub fn closed(&self) {
        self.emit(SignalKind::Closed);
    }

    fn emit(&self, kind: SignalKind) {
        if self.tx.send(Signal::new(self.generation, kind)).is_err() {
            trace!(generation = self.generation, "Signal dropped, client is gone");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_tags_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = SignalSink::new(7, tx);

        sink.open();
        sink.message("{}");
        sink.error(Error::connection("reset"));
        sink.closed();

        let kinds: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(kinds.len(), 4);
        assert!(kinds.iter().all(|signal| signal.generation == 7));
        assert!(matches!(kinds[0].kind, SignalKind::Open));
        assert!(matches!(&kinds[1].kind, SignalKind::Message(text) if text == "{}"));
        assert!(matches!(&kinds[2].kind, SignalKind::Error(err) if err.is_connection_error()));
        assert!(matches!(kinds[3].kind, SignalKind::Closed));
    }

    #[test]
    fn test_sink_after_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        SignalSink::new(1, tx).open();
    }
}
