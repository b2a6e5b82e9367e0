//! Connection state machine.
//!
//! The [`ConnectionManager`] owns the single current connection. It builds
//! the target URL, opens sockets through a [`Connector`], turns transport
//! signals into envelopes for the [`EventBus`], and schedules a reconnect
//! after every transport error.
//!
//! # States
//!
//! ```text
//!            start()                 open signal
//!   Idle ─────────────► Connecting ─────────────► Open
//!    ▲                   │    ▲                    │
//!    │ close() /         │    │ timer: start()     │ error signal
//!    │ clean close       │    │                    │
//!    │            error  ▼    │                    │
//!    └─────────────── Reconnecting ◄───────────────┘
//! ```
//!
//! There is no terminal state; transport errors are retried forever with a
//! fixed delay.
//!
//! # Stale Signals
//!
//! Closing a socket does not stop it from reporting. Every connection gets a
//! generation number and signals or reconnect timers carrying an older
//! generation are ignored.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::bus::EventBus;
use crate::error::Result;
use crate::location::PageLocation;
use crate::protocol::{Envelope, resolve};
use crate::transport::{Connector, Signal, SignalKind, SignalSink, Socket};

use super::options::Options;

// ============================================================================
// Constants
// ============================================================================

/// Asset prefixes starting with one of these replace the page host.
const HTTP_SCHEME_MARKERS: [&str; 2] = ["http://", "https://"];

// ============================================================================
// ConnectionState
// ============================================================================

/// Manager state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// No connection and no reconnect pending.
    #[default]
    Idle,
    /// Socket opened, waiting for the transport's open signal.
    Connecting,
    /// Connection is up.
    Open,
    /// Connection failed; a reconnect is scheduled.
    Reconnecting,
}

// ============================================================================
// Command
// ============================================================================

/// Requests processed by the client event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    /// Open a new connection, closing the current one.
    Start,
    /// Reconnect timer fired for the given failed generation.
    Reconnect { generation: u64 },
    /// Close the current connection and stay idle.
    Close,
    /// Close and stop the event loop.
    Shutdown,
}

// ============================================================================
// ConnectionHandle
// ============================================================================

/// The socket currently owned by the manager.
struct Current {
    generation: u64,
    socket: Arc<dyn Socket>,
}

#[derive(Default)]
struct Live {
    current: Option<Current>,
    state: ConnectionState,
    last_activity: Option<Instant>,
}

/// Read access to the manager's current connection.
///
/// Only the [`ConnectionManager`] replaces the connection; everyone else
/// observes it through this handle.
#[derive(Clone, Default)]
pub struct ConnectionHandle {
    inner: Arc<RwLock<Live>>,
}

impl ConnectionHandle {
    /// Returns the manager state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.read().state
    }

    /// Returns the generation of the current connection, if any.
    #[must_use]
    pub fn generation(&self) -> Option<u64> {
        self.inner.read().current.as_ref().map(|c| c.generation)
    }

    /// Returns when the connection last opened or received a frame.
    #[inline]
    #[must_use]
    pub fn last_activity(&self) -> Option<Instant> {
        self.inner.read().last_activity
    }

    /// Returns the current socket, if any.
    pub(crate) fn socket(&self) -> Option<Arc<dyn Socket>> {
        self.inner
            .read()
            .current
            .as_ref()
            .map(|c| Arc::clone(&c.socket))
    }

    fn set_state(&self, state: ConnectionState) {
        self.inner.write().state = state;
    }

    fn touch(&self) {
        self.inner.write().last_activity = Some(Instant::now());
    }

    fn take(&self) -> Option<Current> {
        self.inner.write().current.take()
    }

    fn install(&self, current: Current, state: ConnectionState) {
        let mut live = self.inner.write();
        live.current = Some(current);
        live.state = state;
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("state", &self.state())
            .field("generation", &self.generation())
            .finish()
    }
}

// ============================================================================
// URL Construction
// ============================================================================

/// Builds the connection URL.
///
/// Leading slashes are stripped from the asset prefix. A prefix starting with
/// `http://` or `https://` supplies everything after the scheme separator and
/// the page host is ignored; otherwise the page host and port are used, with
/// a non-empty prefix joined by `/`. `path` is appended verbatim.
///
/// # Example
///
/// ```
/// use hmr_client::{Options, PageLocation, build_url};
///
/// let page = PageLocation::localhost(3000);
/// let url = build_url(&Options::new("/hmr", ""), &page);
/// assert_eq!(url, "ws://localhost:3000/hmr");
/// ```
#[must_use]
pub fn build_url(options: &Options, page: &PageLocation) -> String {
    let scheme = resolve(Some(options.asset_prefix()), page);
    let prefix = options.asset_prefix().trim_start_matches('/');

    let remote = HTTP_SCHEME_MARKERS
        .iter()
        .find_map(|marker| prefix.strip_prefix(marker));

    let base = match remote {
        Some(rest) => format!("{scheme}://{rest}"),
        None if prefix.is_empty() => format!("{scheme}://{}", page.authority()),
        None => format!("{scheme}://{}/{prefix}", page.authority()),
    };

    format!("{base}{}", options.path())
}

// ============================================================================
// ConnectionManager
// ============================================================================

/// Owns the current connection and drives the reconnect loop.
///
/// All methods run on the client event loop; nothing here is called
/// concurrently.
pub(crate) struct ConnectionManager {
    options: Options,
    page: PageLocation,
    connector: Arc<dyn Connector>,
    bus: Arc<EventBus>,
    handle: ConnectionHandle,
    generation: u64,
    /// Sending half of the event loop's signal channel, cloned into sinks.
    signals: mpsc::UnboundedSender<Signal>,
    /// Sending half of the event loop's command channel, used by timers.
    commands: mpsc::UnboundedSender<Command>,
}

impl ConnectionManager {
    pub(crate) fn new(
        options: Options,
        page: PageLocation,
        connector: Arc<dyn Connector>,
        bus: Arc<EventBus>,
        signals: mpsc::UnboundedSender<Signal>,
        commands: mpsc::UnboundedSender<Command>,
    ) -> Self {
        Self {
            options,
            page,
            connector,
            bus,
            handle: ConnectionHandle::default(),
            generation: 0,
            signals,
            commands,
        }
    }

    /// Returns a handle observing the current connection.
    pub(crate) fn handle(&self) -> ConnectionHandle {
        self.handle.clone()
    }

    /// Returns the connection URL.
    pub(crate) fn url(&self) -> String {
        build_url(&self.options, &self.page)
    }

    /// Closes the current connection, if any, and opens a new one.
    pub(crate) fn start(&mut self) {
        self.close_current();

        self.generation += 1;
        let generation = self.generation;
        let url = self.url();

        debug!(generation, %url, "Opening connection");

        let sink = SignalSink::new(generation, self.signals.clone());
        let socket = self.connector.open(&url, sink);

        self.handle
            .install(Current { generation, socket }, ConnectionState::Connecting);
    }

    /// Handles a reconnect timer.
    ///
    /// Only reconnects if `generation` is still the failed current
    /// connection; a restart or close in the meantime wins.
    pub(crate) fn reconnect(&mut self, generation: u64) {
        if generation == self.generation && self.handle.state() == ConnectionState::Reconnecting {
            debug!(generation, "Reconnecting");
            self.start();
        } else {
            debug!(
                generation,
                current = self.generation,
                "Skipping stale reconnect"
            );
        }
    }

    /// Closes the current connection and cancels any pending reconnect.
    pub(crate) fn close(&mut self) {
        self.close_current();
        // Invalidates signals and timers of the closed connection
        self.generation += 1;
        self.handle.set_state(ConnectionState::Idle);
    }

    /// Applies a transport signal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if an inbound frame is not
    /// valid JSON. No subscriber sees that frame.
    pub(crate) fn handle_signal(&mut self, signal: Signal) -> Result<()> {
        let Signal { generation, kind } = signal;

        if generation != self.generation {
            trace!(
                generation,
                current = self.generation,
                "Ignoring signal from superseded connection"
            );
            return Ok(());
        }

        let state = self.handle.state();

        match kind {
            SignalKind::Open => {
                if state != ConnectionState::Connecting {
                    return Ok(());
                }

                self.handle.set_state(ConnectionState::Open);
                self.handle.touch();

                if self.options.log {
                    info!(url = %self.url(), "[HMR] connected");
                } else {
                    debug!(generation, "Connection open");
                }

                self.bus.dispatch(&Envelope::Connected);
            }

            SignalKind::Message(text) => {
                if state != ConnectionState::Open {
                    return Ok(());
                }

                self.handle.touch();
                self.bus.dispatch_frame(&text)?;
            }

            SignalKind::Error(error) => {
                if !matches!(state, ConnectionState::Connecting | ConnectionState::Open) {
                    return Ok(());
                }

                warn!(
                    generation,
                    error = %error,
                    retry_in_ms = self.options.reconnect_delay().as_millis() as u64,
                    "Connection failed, reconnecting"
                );

                self.close_current();
                self.handle.set_state(ConnectionState::Reconnecting);
                self.schedule_reconnect();
            }

            SignalKind::Closed => {
                if matches!(state, ConnectionState::Connecting | ConnectionState::Open) {
                    debug!(generation, "Connection closed by server");
                    self.handle.take();
                    self.handle.set_state(ConnectionState::Idle);
                }
            }
        }

        Ok(())
    }

    /// Closes and forgets the current socket.
    fn close_current(&mut self) {
        if let Some(previous) = self.handle.take() {
            trace!(generation = previous.generation, "Closing connection");
            previous.socket.close();
        }
    }

    /// Schedules a [`Command::Reconnect`] after the configured delay.
    fn schedule_reconnect(&self) {
        let delay = self.options.reconnect_delay();
        let generation = self.generation;
        let commands = self.commands.clone();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = commands.send(Command::Reconnect { generation });
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
