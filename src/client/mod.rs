//! Hot reload client.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Client`] | Runtime owning the event loop |
//! | [`ClientBuilder`] | Fluent configuration builder |
//! | [`Options`] | Path, asset prefix, reconnect delay, logging |
//! | [`ConnectionHandle`] | Read view of the current connection |
//! | [`MessageSender`] | Outbound sends, guarded on the open state |
//!
//! # Example
//!
//! ```no_run
//! use hmr_client::{Client, PageLocation, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = Client::builder()
//!     .path("/_next/webpack-hmr")
//!     .page(PageLocation::localhost(3000))
//!     .log(true)
//!     .spawn()?;
//!
//! client.register(|envelope| println!("{envelope:?}"));
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for client configuration.
pub mod builder;

/// Client runtime and event loop.
pub mod core;

/// Connection state machine and URL construction.
pub mod manager;

/// Connection options.
pub mod options;

/// Guarded outbound sends.
pub mod sender;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use self::core::Client;
pub use manager::{ConnectionHandle, ConnectionState, build_url};
pub use options::{DEFAULT_TIMEOUT, Options};
pub use sender::MessageSender;
