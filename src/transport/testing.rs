//! In-memory transport for unit tests.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::{Connector, ReadyState, SignalSink, Socket};

/// Observable transport operation, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TransportOp {
    Opened(u64, String),
    Closed(u64),
    Sent(u64, String),
}

/// A socket opened through [`FakeConnector`].
pub(crate) struct Opened {
    pub url: String,
    pub socket: Arc<FakeSocket>,
    pub sink: SignalSink,
}

pub(crate) struct FakeSocket {
    generation: u64,
    state: Mutex<ReadyState>,
    ops: Arc<Mutex<Vec<TransportOp>>>,
}

impl FakeSocket {
    /// Simulates the transport finishing its handshake.
    pub fn set_open(&self) {
        *self.state.lock() = ReadyState::Open;
    }

    pub fn is_closed(&self) -> bool {
        *self.state.lock() == ReadyState::Closed
    }
}

impl Socket for FakeSocket {
    fn ready_state(&self) -> ReadyState {
        *self.state.lock()
    }

    fn send(&self, data: String) {
        self.ops.lock().push(TransportOp::Sent(self.generation, data));
    }

    fn close(&self) {
        let mut state = self.state.lock();
        if *state != ReadyState::Closed {
            *state = ReadyState::Closed;
            self.ops.lock().push(TransportOp::Closed(self.generation));
        }
    }
}

pub(crate) struct FakeConnector {
    ops: Arc<Mutex<Vec<TransportOp>>>,
    opened_tx: mpsc::UnboundedSender<Opened>,
}

impl FakeConnector {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Opened>) {
        let (opened_tx, opened_rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            ops: Arc::new(Mutex::new(Vec::new())),
            opened_tx,
        });
        (connector, opened_rx)
    }

    pub fn ops(&self) -> Vec<TransportOp> {
        self.ops.lock().clone()
    }
}

impl Connector for FakeConnector {
    fn open(&self, url: &str, sink: SignalSink) -> Arc<dyn Socket> {
        let generation = sink.generation();
        let socket = Arc::new(FakeSocket {
            generation,
            state: Mutex::new(ReadyState::Connecting),
            ops: Arc::clone(&self.ops),
        });

        self.ops
            .lock()
            .push(TransportOp::Opened(generation, url.to_string()));

        let _ = self.opened_tx.send(Opened {
            url: url.to_string(),
            socket: Arc::clone(&socket),
            sink,
        });

        socket
    }
}
