//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and spawning [`Client`] instances.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use hmr_client::{Client, PageLocation};
//!
//! # async fn example() -> hmr_client::Result<()> {
//! let client = Client::builder()
//!     .path("/_next/webpack-hmr")
//!     .asset_prefix("/docs")
//!     .timeout(Duration::from_secs(2))
//!     .log(true)
//!     .page(PageLocation::parse("http://localhost:3000")?)
//!     .spawn()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use crate::bus::EventBus;
use crate::error::{Error, Result};
use crate::location::PageLocation;
use crate::transport::{Connector, WebSocketConnector};

use super::core::Client;
use super::options::Options;

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`Client`] instance.
///
/// Use [`Client::builder()`] to create a new builder.
#[derive(Default)]
pub struct ClientBuilder {
    /// Connection options.
    options: Options,
    /// Hosting page location.
    page: Option<PageLocation>,
    /// Transport; defaults to [`WebSocketConnector`].
    connector: Option<Arc<dyn Connector>>,
    /// Subscriber list; a fresh bus is created when unset.
    bus: Option<Arc<EventBus>>,
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a new builder with default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all options at once.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Sets the endpoint path appended to the URL.
    #[inline]
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.options.path = path.into();
        self
    }

    /// Sets the asset prefix.
    #[inline]
    #[must_use]
    pub fn asset_prefix(mut self, asset_prefix: impl Into<String>) -> Self {
        self.options.asset_prefix = asset_prefix.into();
        self
    }

    /// Sets the reconnect delay.
    #[inline]
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Enables or disables the connect trace.
    #[inline]
    #[must_use]
    pub fn log(mut self, log: bool) -> Self {
        self.options.log = log;
        self
    }

    /// Sets the hosting page location.
    #[inline]
    #[must_use]
    pub fn page(mut self, page: PageLocation) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets the transport.
    #[inline]
    #[must_use]
    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Shares an existing event bus with the client.
    #[inline]
    #[must_use]
    pub fn event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Validates the configuration and spawns the client.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the path is empty
    /// - [`Error::Config`] if no page location was set
    /// - [`Error::Config`] if no tokio runtime is running
    pub fn spawn(self) -> Result<Client> {
        self.options.validate()?;

        let page = self.page.ok_or_else(|| {
            Error::config(
                "Hosting page location is required. Use .page() to set it.\n\
                 Example: Client::builder().page(PageLocation::localhost(3000))",
            )
        })?;

        let connector: Arc<dyn Connector> = match self.connector {
            Some(connector) => connector,
            None => Arc::new(WebSocketConnector::new()),
        };
        let bus = self.bus.unwrap_or_default();

        Client::spawn(self.options, page, connector, bus)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::protocol::Envelope;
    use crate::transport::testing::FakeConnector;

    #[test]
    fn test_builder_sets_options() {
        let builder = ClientBuilder::new()
            .path("/hmr")
            .asset_prefix("/docs")
            .timeout(Duration::from_millis(250))
            .log(true);

        assert_eq!(builder.options.path(), "/hmr");
        assert_eq!(builder.options.asset_prefix(), "/docs");
        assert_eq!(builder.options.reconnect_delay(), Duration::from_millis(250));
        assert!(builder.options.log);
    }

    #[test]
    fn test_options_replaces_all() {
        let builder = ClientBuilder::new()
            .log(true)
            .options(Options::new("/hmr", "cdn"));

        assert_eq!(builder.options, Options::new("/hmr", "cdn"));
    }

    #[test]
    fn test_spawn_requires_path() {
        let err = ClientBuilder::new()
            .page(PageLocation::localhost(3000))
            .spawn()
            .unwrap_err();

        assert!(err.to_string().contains("path is required"));
    }

    #[test]
    fn test_spawn_requires_page() {
        let err = ClientBuilder::new().path("/hmr").spawn().unwrap_err();
        assert!(err.to_string().contains("page location is required"));
    }

    #[tokio::test]
    async fn test_spawn_with_shared_bus() {
        let (connector, mut opened) = FakeConnector::new();
        let bus = Arc::new(EventBus::new());
        bus.register(|_: &Envelope| {});

        let client = ClientBuilder::new()
            .path("/hmr")
            .page(PageLocation::localhost(3000))
            .connector(connector)
            .event_bus(Arc::clone(&bus))
            .spawn()
            .expect("client spawns");

        client.register(|_| {});
        assert_eq!(bus.len(), 2);

        let first = opened.recv().await.expect("socket opened");
        assert_eq!(first.url, "ws://localhost:3000/hmr");
    }
}
