//! Wire-level types for the hot reload channel.
//!
//! # Protocol Overview
//!
//! | Type | Direction | Purpose |
//! |------|-----------|---------|
//! | [`Scheme`] | n/a | `ws` or `wss`, resolved from the asset prefix or page |
//! | [`Envelope`] | Server → Subscribers | Connection-established or data-bearing notification |
//!
//! Outbound data is forwarded verbatim as text frames and has no type here.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `envelope` | Tagged notification wrapper |
//! | `scheme` | Transport scheme resolution |

// ============================================================================
// Submodules
// ============================================================================

/// Notification envelopes delivered to subscribers.
pub mod envelope;

/// Transport scheme resolution.
pub mod scheme;

// ============================================================================
// Re-exports
// ============================================================================

pub use envelope::Envelope;
pub use scheme::{Scheme, resolve};
