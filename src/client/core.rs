//! Client runtime.
//!
//! A [`Client`] owns one tokio task, the event loop, that drains commands
//! from the public API and signals from the transport. Every state transition
//! and every subscriber dispatch happens on that task, one at a time.

// ============================================================================
// Imports
// ============================================================================

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::bus::EventBus;
use crate::error::{Error, Result};
use crate::location::PageLocation;
use crate::protocol::Envelope;
use crate::transport::{Connector, Signal};

use super::builder::ClientBuilder;
use super::manager::{Command, ConnectionHandle, ConnectionManager, ConnectionState};
use super::options::Options;
use super::sender::MessageSender;

// ============================================================================
// Client
// ============================================================================

/// Hot reload channel client.
///
/// Connects on spawn and keeps reconnecting until shut down. Dropping the
/// client stops the event loop and closes the connection.
///
/// # Example
///
/// Subscribers that must see the first [`Envelope::Connected`] go on an
/// [`EventBus`] passed to [`ClientBuilder::event_bus`] before spawning.
///
/// ```no_run
/// use std::sync::Arc;
/// use hmr_client::{Client, Envelope, EventBus, PageLocation, Result};
///
/// # async fn example() -> Result<()> {
/// let bus = Arc::new(EventBus::new());
/// bus.register(|envelope| {
///     if let Envelope::Message { data } = envelope {
///         println!("dev server says: {data}");
///     }
/// });
///
/// let client = Client::builder()
///     .path("/_next/webpack-hmr")
///     .page(PageLocation::localhost(3000))
///     .event_bus(bus)
///     .spawn()?;
///
/// client.send(r#"{"event":"ping"}"#);
/// # Ok(())
/// # }
/// ```
pub struct Client {
    /// Channel for sending commands to the event loop.
    commands: mpsc::UnboundedSender<Command>,
    /// Subscribers (shared with the event loop).
    bus: Arc<EventBus>,
    /// Current connection (written by the event loop only).
    connection: ConnectionHandle,
    /// Connection URL.
    url: String,
    /// Event loop task.
    task: Option<JoinHandle<()>>,
}

impl Client {
    /// Creates a new client builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Spawns the event loop and starts the first connection.
    pub(crate) fn spawn(
        options: Options,
        page: PageLocation,
        connector: Arc<dyn Connector>,
        bus: Arc<EventBus>,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| {
            Error::config("Client must be spawned from within a tokio runtime")
        })?;

        let (commands, command_rx) = mpsc::unbounded_channel();
        let (signals, signal_rx) = mpsc::unbounded_channel();

        let manager = ConnectionManager::new(
            options,
            page,
            connector,
            Arc::clone(&bus),
            signals,
            commands.clone(),
        );
        let connection = manager.handle();
        let url = manager.url();

        let task = runtime.spawn(run_event_loop(manager, command_rx, signal_rx));

        Ok(Self {
            commands,
            bus,
            connection,
            url,
            task: Some(task),
        })
    }

    /// Registers a subscriber.
    ///
    /// Subscribers run on the client's event loop, in registration order.
    /// The first connection attempt starts at spawn, so a subscriber added
    /// here can miss the first [`Envelope::Connected`]; register it on the
    /// builder's [`EventBus`] instead when that matters.
    pub fn register<F>(&self, subscriber: F)
    where
        F: Fn(&Envelope) + Send + Sync + 'static,
    {
        self.bus.register(subscriber);
    }

    /// Sends a text frame if the connection is open; drops it otherwise.
    pub fn send(&self, data: impl Into<String>) {
        self.sender().send(data);
    }

    /// Returns a cloneable sender bound to this client's connection.
    #[inline]
    #[must_use]
    pub fn sender(&self) -> MessageSender {
        MessageSender::new(self.connection.clone())
    }

    /// Returns the event bus.
    #[inline]
    #[must_use]
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Closes the current connection and opens a new one.
    pub fn restart(&self) {
        let _ = self.commands.send(Command::Start);
    }

    /// Closes the connection and cancels pending reconnects.
    ///
    /// Use [`restart`](Self::restart) to connect again.
    pub fn close(&self) {
        let _ = self.commands.send(Command::Close);
    }

    /// Returns the connection state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Returns when the connection last opened or received a frame.
    #[inline]
    #[must_use]
    pub fn last_activity(&self) -> Option<Instant> {
        self.connection.last_activity()
    }

    /// Returns the connection URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Stops the event loop and waits for it to finish.
    pub async fn shutdown(mut self) {
        let _ = self.commands.send(Command::Shutdown);

        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(error = %e, "Client event loop panicked");
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.url)
            .field("connection", &self.connection)
            .field("bus", &self.bus)
            .finish()
    }
}

// ============================================================================
// Event Loop
// ============================================================================

/// Serializes commands and transport signals onto one task.
///
/// A panicking subscriber aborts the rest of that event's fan-out but not the
/// loop; the connection and its reconnect schedule are unaffected.
async fn run_event_loop(
    mut manager: ConnectionManager,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    mut signal_rx: mpsc::UnboundedReceiver<Signal>,
) {
    manager.start();

    loop {
        tokio::select! {
            command = command_rx.recv() => {
                match command {
                    Some(Command::Start) => manager.start(),
                    Some(Command::Reconnect { generation }) => manager.reconnect(generation),
                    Some(Command::Close) => manager.close(),
                    Some(Command::Shutdown) | None => {
                        manager.close();
                        break;
                    }
                }
            }

            Some(signal) = signal_rx.recv() => {
                match catch_unwind(AssertUnwindSafe(|| manager.handle_signal(signal))) {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(error = %e, "Dropping inbound frame"),
                    Err(payload) => {
                        error!(panic = panic_message(&*payload), "Subscriber panicked");
                    }
                }
            }
        }
    }

    debug!("Client event loop terminated");
}

/// Extracts the message of a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic>")
}

// ============================================================================
// Tests
// ============================================================================
